use std::io::Write;

use uno_duel::config::{Config, Timing, BACK_COMPAT, DEFAULT_PORT, VERSION};
use uno_duel::error::ConfigError;

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.net.version, VERSION);
        assert_eq!(config.net.back_compat, BACK_COMPAT);
        assert_eq!(config.net.port, DEFAULT_PORT);
        assert_eq!(config.max_power_diff, 10);
        assert!(config.resume);
        assert!(config.validate().is_ok());
        assert!(config.net.is_compatible(300));
        assert!(!config.net.is_compatible(299));
        assert_eq!(Timing::default().tick().as_millis(), 5);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "name": "Ada", "net": {{ "port": 4000 }}, "timing": {{ "move_ms": 0 }} }}"#
        )
        .unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.name, "Ada");
        assert_eq!(config.net.port, 4000);
        assert_eq!(config.net.version, VERSION);
        assert_eq!(config.timing.move_ms, 0);
        assert_eq!(config.timing.flip_ms, Timing::default().flip_ms);
    }

    #[test]
    fn test_rejects_bad_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "net": {{ "back_compat": 400 }} }}"#).unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));

        assert!(matches!(
            Config::load(std::path::Path::new("/no/such/uno.json")),
            Err(ConfigError::Read(_))
        ));
    }
}
