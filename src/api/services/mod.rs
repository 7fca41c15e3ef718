pub mod diagnostics;
pub mod secrets;

pub use diagnostics::{AppStartTime, DiagnosticsService, diagnostics_routes};
pub use secrets::{LinkUrlBase, SecretService, error_response, secret_routes};
