use crate::error::ConfigError;
use std::collections::HashSet;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalyticsParams, Config, Logging, MultipleTier, PenaltyTier, PeriodSource, ValuationParams,
};

/// Prefix for environment overrides, e.g. `RESIDUALS__LOGGING__LEVEL=debug`.
pub const ENV_PREFIX: &str = "RESIDUALS";

/// Loads the application configuration from the given TOML file.
///
/// Environment variables prefixed with `RESIDUALS__` override file values.
/// The result is validated before it is returned.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    tracing::debug!(path = %path.display(), periods = config.periods.len(), "Configuration loaded.");
    Ok(config)
}

/// Checks the invariants the loaders and engines rely on.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.periods.is_empty() {
        return Err(ConfigError::ValidationError(
            "at least one [[periods]] entry is required".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for period in &config.periods {
        let key = period.name.trim().to_ascii_lowercase();
        if key.is_empty() {
            return Err(ConfigError::ValidationError("period names must not be blank".to_string()));
        }
        if !names.insert(key) {
            return Err(ConfigError::ValidationError(format!(
                "period '{}' is listed more than once",
                period.name
            )));
        }
    }

    let analytics = &config.analytics;
    if analytics.top_merchants == 0 || analytics.top_agents == 0 || analytics.opportunity_top == 0 {
        return Err(ConfigError::ValidationError(
            "analytics list sizes must be greater than 0".to_string(),
        ));
    }
    if analytics.agent_mid_tier > analytics.agent_top_tier {
        return Err(ConfigError::ValidationError(
            "agent_mid_tier must not exceed agent_top_tier".to_string(),
        ));
    }
    if analytics.change_threshold_pct.is_sign_negative() {
        return Err(ConfigError::ValidationError(
            "change_threshold_pct must not be negative".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;

    fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("residuals.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let (_dir, path) = write_config(
            r#"
            [[periods]]
            name = "October"
            path = "data/october.csv"

            [[periods]]
            name = "November"
            path = "data/november.csv"
            "#,
        );

        let config = load_config(&path).unwrap();

        assert_eq!(config.periods.len(), 2);
        assert_eq!(config.periods[1].name, "November");
        assert_eq!(config.valuation, ValuationParams::default());
        assert_eq!(config.analytics.change_threshold_pct, dec!(30));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let (_dir, path) = write_config(
            r#"
            [[periods]]
            name = "November"
            path = "november.csv"

            [valuation]
            multiple_floor = 12

            [analytics]
            top_agents = 5
            "#,
        );

        let config = load_config(&path).unwrap();

        assert_eq!(config.valuation.multiple_floor, 12);
        assert_eq!(config.valuation.default_multiple, 15);
        assert_eq!(config.analytics.top_agents, 5);
        assert_eq!(config.analytics.top_merchants, 10);
    }

    #[test]
    fn a_config_without_periods_is_rejected() {
        let (_dir, path) = write_config("[logging]\nlevel = \"debug\"\n");
        assert!(matches!(load_config(&path), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn duplicate_period_names_are_rejected() {
        let mut config = Config::default();
        for name in ["May", "may"] {
            config.periods.push(PeriodSource {
                name: name.to_string(),
                path: "x.csv".into(),
            });
        }
        assert!(matches!(validate(&config), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_config("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }
}
