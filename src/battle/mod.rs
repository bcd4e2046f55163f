//! Battle progression: turn resolution, damage, loot and level transitions.
//!
//! Every transition is a pure function from the current state to a new one.
//! Randomness is supplied by the caller so a seeded generator replays a run exactly.

use rand::seq::SliceRandom;
use rand::Rng;
use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;

pub mod item;

pub use item::Item;

use crate::catalog::{OpponentCatalog, OpponentDef};
use crate::config::Rules;
use crate::error::{GameError, GameResult};
use crate::matchup::{resolve_clash, Outcome};

/// Result shown for the most recent turn; empty before the first resolved turn of a level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum LastResult {
    #[default]
    #[serde(rename = "")]
    None,
    Win,
    Loss,
    Tie,
}

impl From<Outcome> for LastResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => LastResult::Win,
            Outcome::Loss => LastResult::Loss,
            Outcome::Tie => LastResult::Tie,
        }
    }
}

/// Where a session stands in the battle lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress { awaiting_player: bool },
    Defeated,
    Victorious,
}

/// One session's battle. Field names are part of the client contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct GameState {
    pub level: u32,
    pub player_hp: u32,
    pub player_hp_max: u32,
    pub cpu_hp: u32,
    pub cpu_hp_max: u32,
    pub cpu_choices: Vec<OpponentDef>,
    pub player_items: Vec<Item>,
    pub last_cpu_choice: Option<OpponentDef>,
    pub last_player_item: Option<Item>,
    pub last_result: LastResult,
    pub game_over: bool,
    pub game_won: bool,
    pub level_up: bool,
    pub awaiting_player: bool,
}

impl GameState {
    /// Level 1 with full hp and the starting items.
    pub fn new_game<R: Rng + ?Sized>(
        rules: &Rules,
        opponents: &[OpponentDef],
        rng: &mut R,
    ) -> GameState {
        let items = rules
            .base_item_types
            .iter()
            .map(|label| Item::base(*label, rules.base_item_uses))
            .collect();
        GameState::start_level(
            1,
            rules.player_hp_max,
            rules.player_hp_max,
            items,
            rules,
            opponents,
            rng,
        )
    }

    fn start_level<R: Rng + ?Sized>(
        level: u32,
        player_hp: u32,
        player_hp_max: u32,
        player_items: Vec<Item>,
        rules: &Rules,
        opponents: &[OpponentDef],
        rng: &mut R,
    ) -> GameState {
        let cpu_hp_max = rules.cpu_hp_max(level);
        GameState {
            level,
            player_hp,
            player_hp_max,
            cpu_hp: cpu_hp_max,
            cpu_hp_max,
            cpu_choices: draw_pool(opponents, rules.pool_size, rng),
            player_items,
            last_cpu_choice: None,
            last_player_item: None,
            last_result: LastResult::None,
            game_over: false,
            game_won: false,
            level_up: false,
            awaiting_player: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.game_won {
            Phase::Victorious
        } else if self.game_over {
            Phase::Defeated
        } else {
            Phase::InProgress {
                awaiting_player: self.awaiting_player,
            }
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.player_items.iter().find(|item| item.id == item_id)
    }

    /// False once every item is used up. The run then cannot progress and a
    /// client should offer a new game.
    pub fn has_legal_move(&self) -> bool {
        self.player_items.iter().any(Item::is_usable)
    }
}

/// Distinct opponents for one level, in random order. Small catalogs are used whole.
pub fn draw_pool<R: Rng + ?Sized>(
    opponents: &[OpponentDef],
    pool_size: usize,
    rng: &mut R,
) -> Vec<OpponentDef> {
    let mut pool = opponents.to_vec();
    let amount = pool_size.min(pool.len());
    let (picked, _) = pool.partial_shuffle(rng, amount);
    picked.to_vec()
}

/// Pre-select the CPU's move for the coming turn.
///
/// No-op once the game is over or while a selected move is still unanswered,
/// so the CPU cannot re-roll mid-turn.
pub fn cpu_select<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> GameState {
    if state.game_over || (state.awaiting_player && state.last_cpu_choice.is_some()) {
        return state.clone();
    }
    let Some(choice) = state.cpu_choices.choose(rng) else {
        return state.clone();
    };
    let mut next = state.clone();
    next.last_cpu_choice = Some(choice.clone());
    next.awaiting_player = true;
    next.last_result = LastResult::None;
    next.last_player_item = None;
    next
}

/// Hp lost by (player, cpu) for a clash outcome.
fn damage(outcome: Outcome, rules: &Rules) -> (u32, u32) {
    match outcome {
        Outcome::Tie => (rules.tie_damage, rules.tie_damage),
        Outcome::Win => (0, rules.hit_damage),
        Outcome::Loss => (rules.hit_damage, 0),
    }
}

/// Answer the CPU's pre-selected move with one of the player's items.
///
/// Defeat is checked before the level clear, so a tie that empties both pools loses.
/// Clearing a level below the last one reloads the catalog and returns a fresh
/// level state; if that load fails nothing is committed.
pub fn take_turn<R: Rng + ?Sized>(
    state: &GameState,
    item_id: &str,
    catalog: &dyn OpponentCatalog,
    rules: &Rules,
    rng: &mut R,
) -> GameResult<GameState> {
    if state.game_over {
        return Ok(state.clone());
    }
    let cpu_choice = match (&state.last_cpu_choice, state.awaiting_player) {
        (Some(choice), true) => choice.clone(),
        _ => return Err(GameError::CpuNotReady),
    };
    let item_idx = state
        .player_items
        .iter()
        .position(|item| item.id == item_id)
        .ok_or_else(|| GameError::ItemNotFound(item_id.to_string()))?;
    if !state.player_items[item_idx].is_usable() {
        return Err(GameError::ItemExhausted(item_id.to_string()));
    }

    let mut next = state.clone();
    let outcome = resolve_clash(&next.player_items[item_idx], &cpu_choice);
    let (player_loss, cpu_loss) = damage(outcome, rules);
    next.player_hp = next.player_hp.saturating_sub(player_loss);
    next.cpu_hp = next.cpu_hp.saturating_sub(cpu_loss);
    next.player_items[item_idx].consume();
    next.last_player_item = Some(next.player_items[item_idx].clone());
    next.last_result = outcome.into();
    next.level_up = false;
    next.awaiting_player = false;
    log::debug!(
        "Level {}: {} vs {} -> {:?} (player {} / cpu {})",
        next.level,
        item_id,
        cpu_choice.name,
        outcome,
        next.player_hp,
        next.cpu_hp
    );

    if next.player_hp == 0 {
        next.game_over = true;
        log::info!("Player defeated at level {}", next.level);
        return Ok(next);
    }

    if next.cpu_hp > 0 {
        return Ok(next);
    }

    let level = next.level;
    let loot: Vec<Item> = next
        .cpu_choices
        .iter()
        .enumerate()
        .map(|(slot, opponent)| Item::loot(level, slot, opponent, rules.loot_uses))
        .collect();
    next.player_items.extend(loot);

    if level >= rules.max_level {
        next.game_over = true;
        next.game_won = true;
        log::info!("Player cleared the final level {}", level);
        return Ok(next);
    }

    let opponents = catalog.load_opponents()?;
    let mut advanced = GameState::start_level(
        level + 1,
        next.player_hp,
        next.player_hp_max,
        next.player_items,
        rules,
        &opponents,
        rng,
    );
    advanced.level_up = true;
    advanced.last_cpu_choice = next.last_cpu_choice;
    advanced.last_player_item = next.last_player_item;
    advanced.last_result = next.last_result;
    log::info!("Level {} cleared, advancing to {}", level, advanced.level);
    Ok(advanced)
}
