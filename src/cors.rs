//! Permissive CORS so a browser front-end on another origin can call the API.

use rocket::fairing::AdHoc;
use rocket::http::{Header, Status};

pub fn fairing() -> AdHoc {
    AdHoc::on_response("CORS", |_request, response| {
        Box::pin(async move {
            response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
            let methods = Header::new("Access-Control-Allow-Methods", "GET, POST, OPTIONS");
            response.set_header(methods);
            response.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
        })
    })
}

/// Preflight answer for any path.
#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::NoContent
}
