use okapi::openapi3::Responses;
use rocket::http::Status as HttpStatus;
use rocket::response::status::Custom;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::Request;
use rocket_okapi::gen::OpenApiGenerator;
use rocket_okapi::response::OpenApiResponderInner;
use rocket_okapi::JsonSchema;

use crate::error::GameError;

/// Error body returned by every endpoint.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Status {
    pub code: String,
    pub message: String,
}

pub fn new_status(code: &str, message: String) -> Json<Status> {
    Json(Status {
        code: code.to_string(),
        message,
    })
}

/// A [`GameError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub GameError);

impl ApiError {
    pub fn http_status(&self) -> HttpStatus {
        match self.0 {
            GameError::SessionNotFound(_) => HttpStatus::NotFound,
            GameError::InvalidMove(_)
            | GameError::ItemNotFound(_)
            | GameError::ItemExhausted(_)
            | GameError::CpuNotReady => HttpStatus::BadRequest,
            GameError::Catalog(_) => HttpStatus::InternalServerError,
        }
    }
}

impl From<GameError> for ApiError {
    fn from(e: GameError) -> Self {
        ApiError(e)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.http_status();
        Custom(status, new_status(self.0.code(), self.0.to_string())).respond_to(request)
    }
}

impl OpenApiResponderInner for ApiError {
    fn responses(gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        let mut responses = Responses::default();
        let schema = gen.json_schema::<Status>();
        for code in [400, 404, 500] {
            rocket_okapi::util::add_schema_response(
                &mut responses,
                code,
                "application/json",
                schema.clone(),
            )?;
        }
        Ok(responses)
    }
}
