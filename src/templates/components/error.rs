use crate::errors::ServerError;
use crate::templates::layouts::desktop::desktop_layout;
use astra::{Body, Response, ResponseBuilder};
use maud::{html, Markup};
use tracing::{error, warn};

/// Convert a ServerError into an HTML error page.
pub fn html_error_response(err: ServerError) -> Response {
    let status = err.status();
    if status >= 500 {
        error!(status, error = %err, "request failed");
    } else {
        warn!(status, error = %err, "request rejected");
    }

    let message = match &err {
        ServerError::NotFound => "Not Found".to_string(),
        ServerError::BadRequest(msg) | ServerError::Unauthorized(msg) => msg.clone(),
        ServerError::Json(e) => format!("Malformed JSON: {e}"),
        ServerError::DbError(msg) => format!("Database Error: {msg}"),
        ServerError::Fetch(msg) => format!("Upstream Error: {msg}"),
        ServerError::InternalError => "Internal Server Error".to_string(),
    };

    let page = desktop_layout(
        &format!("Error {status}"),
        html! {
            main class="error-page" {
                h1 { "Error " (status) }
                p { (message) }
                p { a href="/" { "← Back to the map" } }
            }
        },
    );

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(page.into_string()))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}

/// Blocking overlay shown instead of the map when it cannot start.
pub fn fatal_page(message: &str) -> Markup {
    html! {
        div class="fatal" role="alert"
            style="position: fixed; inset: 0; display: flex; align-items: center; justify-content: center; background: #fff; z-index: 1000;" {
            div {
                h2 { "The map could not be loaded" }
                p { (message) }
            }
        }
    }
}
