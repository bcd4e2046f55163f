use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

use crate::catalog::OpponentDef;
use crate::matchup::{TypeLabel, Typed};

/// A move the player owns. Exhausted items stay in the list but cannot be picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub primary_type: TypeLabel,
    pub secondary_type: TypeLabel,
    pub uses_left: u32,
}

impl Item {
    /// Starting item of a single type.
    pub fn base(label: TypeLabel, uses: u32) -> Self {
        let mut name = label.as_str().to_string();
        if let Some(first) = name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        Item {
            id: format!("base-{}", label),
            name,
            primary_type: label,
            secondary_type: label,
            uses_left: uses,
        }
    }

    /// Reward copied from an opponent offered at `level`.
    /// `slot` is the opponent's position in that level's pool.
    pub fn loot(level: u32, slot: usize, source: &OpponentDef, uses: u32) -> Self {
        Item {
            id: format!("loot-{}-{}", level, slot + 1),
            name: source.name.clone(),
            primary_type: source.primary_type,
            secondary_type: source.secondary_type,
            uses_left: uses,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.uses_left > 0
    }

    pub fn consume(&mut self) {
        self.uses_left = self.uses_left.saturating_sub(1);
    }
}

impl Typed for Item {
    fn primary_type(&self) -> TypeLabel {
        self.primary_type
    }
    fn secondary_type(&self) -> TypeLabel {
        self.secondary_type
    }
}
