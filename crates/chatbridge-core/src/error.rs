use http::StatusCode;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Each feature crate implements this for its error enum; the response
/// body shape stays with the implementor while the server layer only
/// relies on the status.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error code (e.g. `INVALID_PROVIDER`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}
