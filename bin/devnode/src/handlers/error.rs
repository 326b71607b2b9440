use tracing::{error, warn};

/// Bad request with the message logged
pub fn handle_error<E: std::fmt::Display>(msg: &str, e: E) -> actix_web::Error {
    error!("{}: {}", msg, e);
    actix_web::error::ErrorBadRequest(format!("{}: {}", msg, e))
}

/// Log a failure that is reported inside a JSON envelope rather than as an
/// HTTP status
pub fn log_rejected(route: &str, what: &str, message: &str) {
    warn!(route, what, "Rejected: {}", message);
}
