//! Type matchups: which label beats which, and how two typed combatants clash.

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;
use std::fmt;
use std::str::FromStr;

/// The fixed set of type labels. The classic three are a subset of the five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum TypeLabel {
    Rock,
    Paper,
    Scissors,
    Lizard,
    Spock,
}

impl TypeLabel {
    pub fn all() -> [TypeLabel; 5] {
        [
            TypeLabel::Rock,
            TypeLabel::Paper,
            TypeLabel::Scissors,
            TypeLabel::Lizard,
            TypeLabel::Spock,
        ]
    }

    /// The two labels this one defeats.
    pub fn beats(self) -> [TypeLabel; 2] {
        match self {
            TypeLabel::Rock => [TypeLabel::Scissors, TypeLabel::Lizard],
            TypeLabel::Paper => [TypeLabel::Rock, TypeLabel::Spock],
            TypeLabel::Scissors => [TypeLabel::Paper, TypeLabel::Lizard],
            TypeLabel::Lizard => [TypeLabel::Paper, TypeLabel::Spock],
            TypeLabel::Spock => [TypeLabel::Rock, TypeLabel::Scissors],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeLabel::Rock => "rock",
            TypeLabel::Paper => "paper",
            TypeLabel::Scissors => "scissors",
            TypeLabel::Lizard => "lizard",
            TypeLabel::Spock => "spock",
        }
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeLabel {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        TypeLabel::all()
            .into_iter()
            .find(|label| label.as_str() == normalized)
            .ok_or_else(|| format!("Unknown type label '{}'", s.trim()))
    }
}

/// Outcome of a matchup from the attacker's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Outcome {
    pub fn reversed(self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Tie => Outcome::Tie,
        }
    }
}

/// Anything that fights with a primary and a secondary type.
pub trait Typed {
    fn primary_type(&self) -> TypeLabel;
    fn secondary_type(&self) -> TypeLabel;
}

pub fn compare_types(attacker: TypeLabel, defender: TypeLabel) -> Outcome {
    if attacker == defender {
        Outcome::Tie
    } else if attacker.beats().contains(&defender) {
        Outcome::Win
    } else {
        Outcome::Loss
    }
}

/// Primary types decide; a primary tie falls back to the secondary types, whose result is final.
pub fn resolve_clash<P: Typed + ?Sized, C: Typed + ?Sized>(player: &P, cpu: &C) -> Outcome {
    match compare_types(player.primary_type(), cpu.primary_type()) {
        Outcome::Tie => compare_types(player.secondary_type(), cpu.secondary_type()),
        decided => decided,
    }
}
