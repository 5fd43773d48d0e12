pub mod config;
pub mod error;
pub mod logging;
pub mod recon;
pub mod validation;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use recon::*;
pub use validation::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.reconciliation.key_pattern, DEFAULT_KEY_PATTERN);
        assert!(config.reconciliation.tracked_fields.is_none());
    }

    #[test]
    fn test_error_codes() {
        let error = BomlineError::sheet_read("missing sheet");
        assert_eq!(error.error_code(), "SHEET_READ_ERROR");
        assert_eq!(error.http_status_code(), 422);

        let error = BomlineError::reference_load("no source");
        assert_eq!(error.http_status_code(), 503);
    }
}
