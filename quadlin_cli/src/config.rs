// quadlin_cli/src/config.rs

//! Layered application configuration.
//!
//! Precedence, lowest first: built-in defaults, the `--config` TOML file,
//! then `QUADLIN_`-prefixed environment variables (`QUADLIN_VEHICLE__MASS=0.03`).

use crate::error::{AppError, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use quadlin_core::estimation::EstimatorSettings;
use quadlin_core::models::parameters::PhysicalParameters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)] // Use defaults if the [vehicle] section is missing
    pub vehicle: PhysicalParameters,

    #[serde(default)]
    pub estimator: EstimatorSettings,
}

impl AppConfig {
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("QUADLIN_").split("__"))
    }

    /// Loads the layered configuration. A `--config` path that does not
    /// exist is an error rather than silently falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(AppError::MissingFile(path.to_path_buf()));
            }
            info!("Loading configuration from {}", path.display());
        }
        let config: AppConfig = Self::figment(path).extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config, AppConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_overrides_defaults_and_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "quadlin.toml",
                r#"
                [vehicle]
                mass = 0.030

                [estimator]
                rotor_count = 6
                "#,
            )?;
            jail.set_env("QUADLIN_VEHICLE__GRAVITY", "9.80665");

            let config =
                AppConfig::load(Some(Path::new("quadlin.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.vehicle.mass, 0.030);
            assert_eq!(config.vehicle.gravity, 9.80665);
            assert_eq!(config.vehicle.ixx, PhysicalParameters::default().ixx);
            assert_eq!(config.estimator.rotor_count, 6);
            assert_eq!(config.estimator.command_bits, 16);
            Ok(())
        });
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("quadlin.toml", "[vehicle]\nmas = 0.030\n")?;
            assert!(AppConfig::load(Some(Path::new("quadlin.toml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        Jail::expect_with(|_jail| {
            let err = AppConfig::load(Some(Path::new("absent.toml"))).unwrap_err();
            assert!(matches!(err, AppError::MissingFile(_)));
            Ok(())
        });
    }
}
