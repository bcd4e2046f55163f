//! # Type Clash Arena
//!
//! A turn-based battle game served over HTTP.
//!
//! ## Overview
//!
//! The player fights a run of CPU opponents using a rock-paper-scissors style
//! type matchup (rock, paper, scissors, lizard, spock). Every level offers a
//! small pool of opponents drawn from a catalog file; the CPU commits to one of
//! them, the player answers with an item, and damage is dealt according to the
//! clash. Clearing a level turns every opponent of that pool into a single-use
//! item. Clearing level 10 wins the game.
//!
//! ## Architecture
//!
//! The API is built using the Rocket web framework with OpenAPI documentation
//! support. Battle transitions in [`battle`] are pure functions; sessions live
//! in an in-memory store where each one is guarded by its own async mutex.

// Rocket makes this a bit tricky to support
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::fs::FileServer;
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{make_swagger_ui, SwaggerUIConfig};

pub mod battle;
pub mod catalog;
pub mod config;
pub mod cors;
pub mod error;
pub mod matchup;
pub mod rng;
pub mod session;
pub mod status_messages;

use crate::catalog::{FileCatalog, OpponentCatalog};
use crate::config::{ConfigError, GameConfig};
use crate::session::{GameService, InMemorySessionStore};

/// Initializes and configures the Rocket web server with all routes and OpenAPI documentation.
///
/// Configuration is read from Rocket's figment; opponents come from the
/// catalog file named by `OBJECTS_FILE` (default `data/objects.csv`).
///
/// # Errors
///
/// A malformed `[game]` section or an unplayable ruleset.
///
/// # Example
///
/// ```no_run
/// use type_clash_arena::rocket_initialize;
///
/// #[rocket::main]
/// async fn main() {
///     let rocket = rocket_initialize().expect("valid game config");
///     rocket.launch().await.expect("Failed to launch rocket");
/// }
/// ```
pub fn rocket_initialize() -> Result<rocket::Rocket<rocket::Build>, ConfigError> {
    #[allow(clippy::no_effect_underscore_binding)]
    let _ = env_logger::try_init();

    let config = GameConfig::from_figment(&rocket::Config::figment())?;
    log::info!("Loading opponents from {}", config.objects_file.display());
    let catalog = Arc::new(FileCatalog::new(config.objects_file.clone()));
    Ok(rocket_with(config, catalog))
}

/// Build the server around an explicit config and catalog.
pub fn rocket_with(
    config: GameConfig,
    catalog: Arc<dyn OpponentCatalog>,
) -> rocket::Rocket<rocket::Build> {
    use crate::session::endpoints::{cpu_select, get_game, list_opponents, start_game, take_turn};
    use crate::session::endpoints::{
        okapi_add_operation_for_cpu_select_, okapi_add_operation_for_get_game_,
        okapi_add_operation_for_list_opponents_, okapi_add_operation_for_start_game_,
        okapi_add_operation_for_take_turn_,
    };

    let service = GameService::new(
        Arc::new(InMemorySessionStore::new()),
        catalog,
        config.rules.clone(),
    );

    let mut rocket = rocket::build()
        .mount(
            "/",
            openapi_get_routes![start_game, get_game, cpu_select, take_turn, list_opponents],
        )
        .mount("/swagger", make_swagger_ui(&get_docs()))
        .mount("/", rocket::routes![cors::preflight])
        .manage(service)
        .attach(cors::fairing());

    if let Some(dir) = config.static_dir.as_ref().filter(|dir| dir.is_dir()) {
        log::info!("Serving front-end from {}", dir.display());
        rocket = rocket.mount("/", FileServer::from(dir));
    }

    rocket
}

fn get_docs() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/openapi.json".to_string(),
        ..Default::default()
    }
}
