//! Session lifecycle: keyed storage of running battles and the service the HTTP
//! layer drives.
//!
//! Each session sits behind its own async mutex. A mutation holds that lock
//! from read to write-back, so two requests against one session cannot lose
//! each other's update, while separate sessions never contend.

pub mod endpoints;

use rand_pcg::Lcg64Xsh32;
use rocket::futures::lock::Mutex;
use rocket::tokio::task;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::battle::{self, GameState};
use crate::catalog::{OpponentCatalog, OpponentDef};
use crate::config::Rules;
use crate::error::{GameError, GameResult};
use crate::rng::{random_seed, seeded_rng};

/// One player's game plus the generator that drives its CPU.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: GameState,
    pub seed: u64,
    pub rng: Lcg64Xsh32,
}

pub type SessionHandle = Arc<Mutex<Session>>;

pub trait SessionStore: Send + Sync {
    fn get(&self, id: &str) -> Option<SessionHandle>;
    /// Insert or replace the session stored under `id`.
    fn put(&self, id: String, session: Session);
    fn contains(&self, id: &str) -> bool;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-lifetime store. Sessions are never evicted.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, id: &str) -> Option<SessionHandle> {
        let sessions = match self.sessions.read() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        sessions.get(id).cloned()
    }

    fn put(&self, id: String, session: Session) {
        let mut sessions = match self.sessions.write() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        sessions.insert(id, Arc::new(Mutex::new(session)));
    }

    fn contains(&self, id: &str) -> bool {
        let sessions = match self.sessions.read() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        sessions.contains_key(id)
    }

    fn len(&self) -> usize {
        let sessions = match self.sessions.read() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        sessions.len()
    }
}

/// Ties the store, the catalog and the ruleset together.
pub struct GameService {
    store: Arc<dyn SessionStore>,
    catalog: Arc<dyn OpponentCatalog>,
    rules: Rules,
}

impl GameService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        catalog: Arc<dyn OpponentCatalog>,
        rules: Rules,
    ) -> Self {
        GameService {
            store,
            catalog,
            rules,
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn opponents(&self) -> GameResult<Vec<OpponentDef>> {
        self.catalog.load_opponents()
    }

    /// Start a new game. Without a seed one is drawn from OS entropy.
    ///
    /// Returns the new session id, the seed in use and the opening state.
    pub fn create_session(&self, seed: Option<u64>) -> GameResult<(String, u64, GameState)> {
        let opponents = self.catalog.load_opponents().inspect_err(|e| {
            log::warn!("Cannot start a game: {}", e);
        })?;
        let seed = seed.unwrap_or_else(random_seed);
        let mut rng = seeded_rng(seed);
        let state = GameState::new_game(&self.rules, &opponents, &mut rng);
        let id = uuid::Uuid::new_v4().to_string();
        self.store.put(
            id.clone(),
            Session {
                state: state.clone(),
                seed,
                rng,
            },
        );
        log::info!(
            "Session {} started with seed {} ({} live sessions)",
            id,
            seed,
            self.store.len()
        );
        Ok((id, seed, state))
    }

    fn handle(&self, id: &str) -> GameResult<SessionHandle> {
        self.store
            .get(id)
            .ok_or_else(|| GameError::SessionNotFound(id.to_string()))
    }

    pub async fn state(&self, id: &str) -> GameResult<GameState> {
        let handle = self.handle(id)?;
        let session = handle.lock().await;
        Ok(session.state.clone())
    }

    pub async fn cpu_select(&self, id: &str) -> GameResult<GameState> {
        let handle = self.handle(id)?;
        let mut session = handle.lock().await;
        let Session { state, rng, .. } = &mut *session;
        let next = battle::cpu_select(state, rng);
        *state = next.clone();
        Ok(next)
    }

    /// The generator only advances when the turn commits.
    ///
    /// The turn runs on the blocking pool because clearing a level re-reads the
    /// catalog from disk.
    pub async fn take_turn(&self, id: &str, item_id: &str) -> GameResult<GameState> {
        if item_id.trim().is_empty() {
            return Err(GameError::InvalidMove("item_id must not be empty".to_string()));
        }
        let handle = self.handle(id)?;
        let mut session = handle.lock().await;
        let state = session.state.clone();
        let mut rng = session.rng.clone();
        let catalog = Arc::clone(&self.catalog);
        let rules = self.rules.clone();
        let item_id = item_id.to_string();
        let (next, rng) = task::spawn_blocking(move || {
            battle::take_turn(&state, &item_id, catalog.as_ref(), &rules, &mut rng)
                .map(|next| (next, rng))
        })
        .await
        .map_err(|e| GameError::Catalog(format!("turn task failed: {}", e)))?
        .inspect_err(|e| log::debug!("Session {} turn rejected: {}", id, e))?;
        session.state = next.clone();
        session.rng = rng;
        if !next.game_over && !next.has_legal_move() {
            log::info!("Session {} has no usable items left", id);
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FileCatalog, StaticCatalog};
    use crate::matchup::TypeLabel;
    use rand::RngCore;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn shears() -> OpponentDef {
        OpponentDef::new("Shears", TypeLabel::Scissors, TypeLabel::Scissors)
    }

    /// Serves a lone Shears until switched off.
    #[derive(Default)]
    struct FlakyCatalog {
        down: AtomicBool,
    }

    impl OpponentCatalog for FlakyCatalog {
        fn load_opponents(&self) -> GameResult<Vec<OpponentDef>> {
            if self.down.load(Ordering::SeqCst) {
                return Err(GameError::Catalog("source gone".to_string()));
            }
            Ok(vec![shears()])
        }
    }

    fn service() -> GameService {
        GameService::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(StaticCatalog::new(vec![
                OpponentDef::new("Boulder", TypeLabel::Rock, TypeLabel::Rock),
                OpponentDef::new("Scroll", TypeLabel::Paper, TypeLabel::Paper),
                OpponentDef::new("Shears", TypeLabel::Scissors, TypeLabel::Scissors),
            ])),
            Rules::default(),
        )
    }

    #[test]
    fn store_put_get_contains() {
        let store = InMemorySessionStore::new();
        assert!(store.is_empty());
        let state = GameState::new_game(
            &Rules::default(),
            &[OpponentDef::new("Boulder", TypeLabel::Rock, TypeLabel::Rock)],
            &mut seeded_rng(1),
        );
        store.put(
            "abc".to_string(),
            Session {
                state,
                seed: 1,
                rng: seeded_rng(1),
            },
        );
        assert!(store.contains("abc"));
        assert!(!store.contains("xyz"));
        assert!(store.get("abc").is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn empty_catalog_creates_no_session() {
        let store = Arc::new(InMemorySessionStore::new());
        let service = GameService::new(
            store.clone(),
            Arc::new(StaticCatalog::default()),
            Rules::default(),
        );
        let err = service.create_session(None).unwrap_err();
        assert_eq!(err.code(), "CATALOG_ERROR");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn same_seed_replays_same_cpu_moves() {
        let service = service();
        let (a, _, state_a) = service.create_session(Some(99)).expect("session");
        let (b, _, state_b) = service.create_session(Some(99)).expect("session");
        assert_ne!(a, b);
        assert_eq!(state_a, state_b);
        for _ in 0..5 {
            let sa = service.cpu_select(&a).await.expect("select");
            let sb = service.cpu_select(&b).await.expect("select");
            assert_eq!(sa.last_cpu_choice, sb.last_cpu_choice);
            let ta = service.take_turn(&a, "base-rock").await;
            let tb = service.take_turn(&b, "base-rock").await;
            assert_eq!(ta, tb);
        }
    }

    #[tokio::test]
    async fn unknown_session_is_reported() {
        let service = service();
        let err = service.cpu_select("missing").await.unwrap_err();
        assert_eq!(err.code(), "SESSION_NOT_FOUND");
        let err = service.take_turn("missing", "base-rock").await.unwrap_err();
        assert_eq!(err.code(), "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn blank_item_is_invalid_move() {
        let service = service();
        let (id, _, _) = service.create_session(Some(1)).expect("session");
        service.cpu_select(&id).await.expect("select");
        let err = service.take_turn(&id, "  ").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_MOVE");
    }

    #[tokio::test]
    async fn rejected_turn_leaves_session_untouched() {
        let service = service();
        let (id, _, _) = service.create_session(Some(4)).expect("session");
        let err = service.take_turn(&id, "base-rock").await.unwrap_err();
        assert_eq!(err, GameError::CpuNotReady);
        let selected = service.cpu_select(&id).await.expect("select");
        service.take_turn(&id, "base-nothing").await.unwrap_err();
        assert_eq!(service.state(&id).await.expect("state"), selected);
    }

    #[tokio::test]
    async fn level_transition_rereads_catalog_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("objects.csv");
        std::fs::write(&path, "name,primary,secondary\nShears,scissors,scissors\n").expect("write");
        let service = GameService::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(FileCatalog::new(&path)),
            Rules::default(),
        );
        let (id, _, state) = service.create_session(Some(2)).expect("session");
        assert_eq!(state.cpu_choices, vec![shears()]);

        service.cpu_select(&id).await.expect("select");
        service.take_turn(&id, "base-rock").await.expect("first hit");
        std::fs::write(
            &path,
            "name,primary,secondary\nScroll,paper,paper\nLeaf,paper,spock\n",
        )
        .expect("write");
        service.cpu_select(&id).await.expect("select");
        let next = service.take_turn(&id, "base-rock").await.expect("level clear");

        assert_eq!(next.level, 2);
        let mut names: Vec<&str> = next.cpu_choices.iter().map(|o| o.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Leaf", "Scroll"]);
    }

    async fn first_hit_then_select(service: &GameService, id: &str) {
        service.cpu_select(id).await.expect("select");
        service.take_turn(id, "base-rock").await.expect("first hit");
        service.cpu_select(id).await.expect("select");
    }

    #[tokio::test]
    async fn catalog_failure_on_level_clear_keeps_session() {
        let flaky = Arc::new(FlakyCatalog::default());
        let service = GameService::new(
            Arc::new(InMemorySessionStore::new()),
            flaky.clone(),
            Rules::default(),
        );
        let steady = GameService::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(FlakyCatalog::default()),
            Rules::default(),
        );
        let (id, _, _) = service.create_session(Some(8)).expect("session");
        let (control, _, _) = steady.create_session(Some(8)).expect("session");
        first_hit_then_select(&service, &id).await;
        first_hit_then_select(&steady, &control).await;
        let selected = service.state(&id).await.expect("state");
        let mut rng_before = service.handle(&id).expect("handle").lock().await.rng.clone();

        flaky.down.store(true, Ordering::SeqCst);
        let err = service.take_turn(&id, "base-rock").await.unwrap_err();
        assert_eq!(err.code(), "CATALOG_ERROR");
        assert_eq!(service.state(&id).await.expect("state"), selected);
        let mut rng_after = service.handle(&id).expect("handle").lock().await.rng.clone();
        assert_eq!(rng_after.next_u64(), rng_before.next_u64());

        // An untouched generator replays exactly what a clean run produces.
        flaky.down.store(false, Ordering::SeqCst);
        let retried = service.take_turn(&id, "base-rock").await.expect("retry");
        let clean = steady.take_turn(&control, "base-rock").await.expect("clean run");
        assert_eq!(retried.level, 2);
        assert!(retried.level_up);
        assert_eq!(retried, clean);
    }
}
