use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::State;
use rocket_okapi::{openapi, JsonSchema};

use super::GameService;
use crate::battle::GameState;
use crate::catalog::OpponentDef;
use crate::status_messages::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct StartResponse {
    pub session_id: String,
    /// Seed driving the CPU; pass it back to `start` to replay the same run.
    pub seed: u64,
    pub state: GameState,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct StateResponse {
    pub session_id: String,
    pub state: GameState,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct SessionRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct TurnRequest {
    pub session_id: String,
    pub item_id: String,
}

/// Start a new game at level 1. An optional `seed` makes the CPU deterministic.
#[openapi]
#[post("/api/game/start?<seed>")]
pub async fn start_game(
    seed: Option<u64>,
    service: &State<GameService>,
) -> Result<Created<Json<StartResponse>>, ApiError> {
    let (session_id, seed, state) = service.create_session(seed)?;
    let location = format!("/api/game/{}", session_id);
    Ok(Created::new(location).body(Json(StartResponse {
        session_id,
        seed,
        state,
    })))
}

/// Current state of a session.
#[openapi]
#[get("/api/game/<session_id>")]
pub async fn get_game(
    session_id: &str,
    service: &State<GameService>,
) -> Result<Json<StateResponse>, ApiError> {
    let state = service.state(session_id).await?;
    Ok(Json(StateResponse {
        session_id: session_id.to_string(),
        state,
    }))
}

/// Let the CPU commit to its move for the coming turn.
#[openapi]
#[post("/api/game/cpu", format = "json", data = "<request>")]
pub async fn cpu_select(
    request: Json<SessionRequest>,
    service: &State<GameService>,
) -> Result<Json<StateResponse>, ApiError> {
    let SessionRequest { session_id } = request.0;
    let state = service.cpu_select(&session_id).await?;
    Ok(Json(StateResponse { session_id, state }))
}

/// Answer the CPU's move with one of the player's items.
#[openapi]
#[post("/api/game/turn", format = "json", data = "<request>")]
pub async fn take_turn(
    request: Json<TurnRequest>,
    service: &State<GameService>,
) -> Result<Json<StateResponse>, ApiError> {
    let TurnRequest {
        session_id,
        item_id,
    } = request.0;
    let state = service.take_turn(&session_id, &item_id).await?;
    Ok(Json(StateResponse { session_id, state }))
}

/// Every opponent the catalog currently offers.
#[openapi]
#[get("/api/opponents")]
pub async fn list_opponents(
    service: &State<GameService>,
) -> Result<Json<Vec<OpponentDef>>, ApiError> {
    Ok(Json(service.opponents()?))
}
