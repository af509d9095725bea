//! Verifier Configuration
//!
//! Decimal precision and formatting bounds used when hashing liabilities.
//! The defaults match how published audits were generated; override them
//! only for audits produced with different settings.

use thiserror::Error;

use crate::core::decimal::{Decimal, DecimalContext};

/// Env var overriding the decimal precision.
pub const ENV_DECIMAL_PRECISION: &str = "SB_POL_DECIMAL_PRECISION";

/// Env var overriding the lower exponent bound.
pub const ENV_DECIMAL_MIN_EXPONENT: &str = "SB_POL_DECIMAL_MIN_EXPONENT";

/// Env var overriding the upper exponent bound.
pub const ENV_DECIMAL_MAX_EXPONENT: &str = "SB_POL_DECIMAL_MAX_EXPONENT";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable could not be parsed.
    #[error("invalid value {value:?} for {name}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
    /// Precision must allow at least one digit.
    #[error("decimal precision must be positive")]
    ZeroPrecision,
    /// Exponent bounds are inverted.
    #[error("min exponent {min} must be below max exponent {max}")]
    InvalidExponentBounds {
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },
}

/// Verifier configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Decimal context for sums and canonical strings.
    pub decimal: DecimalContext,
}

impl VerifierConfig {
    /// Create config from environment variables, defaulting unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DecimalContext::default();
        let decimal = DecimalContext {
            precision: parse_var(&lookup, ENV_DECIMAL_PRECISION)?.unwrap_or(defaults.precision),
            min_exponent: parse_var(&lookup, ENV_DECIMAL_MIN_EXPONENT)?
                .unwrap_or(defaults.min_exponent),
            max_exponent: parse_var(&lookup, ENV_DECIMAL_MAX_EXPONENT)?
                .unwrap_or(defaults.max_exponent),
        };

        let config = Self { decimal };
        config.validate()?;
        Ok(config)
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decimal.precision == 0 {
            return Err(ConfigError::ZeroPrecision);
        }
        if self.decimal.min_exponent >= self.decimal.max_exponent {
            return Err(ConfigError::InvalidExponentBounds {
                min: self.decimal.min_exponent,
                max: self.decimal.max_exponent,
            });
        }
        Ok(())
    }

    /// Render an amount the way this configuration hashes it.
    pub fn format_amount(&self, amount: &Decimal) -> String {
        self.decimal.to_canonical_string(amount)
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = VerifierConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, VerifierConfig::default());
        assert_eq!(config.decimal.precision, 1000);
        assert_eq!(config.decimal.min_exponent, -1000);
        assert_eq!(config.decimal.max_exponent, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = VerifierConfig::from_lookup(lookup(&[
            (ENV_DECIMAL_PRECISION, "50"),
            (ENV_DECIMAL_MIN_EXPONENT, "-7"),
            (ENV_DECIMAL_MAX_EXPONENT, " 21 "),
        ]))
        .unwrap();
        assert_eq!(config.decimal.precision, 50);
        assert_eq!(config.decimal.min_exponent, -7);
        assert_eq!(config.decimal.max_exponent, 21);
    }

    #[test]
    fn test_format_amount_follows_configured_bounds() {
        let amount: Decimal = "1.5e22".parse().unwrap();
        let narrow = VerifierConfig::from_lookup(lookup(&[
            (ENV_DECIMAL_MIN_EXPONENT, "-7"),
            (ENV_DECIMAL_MAX_EXPONENT, "21"),
        ]))
        .unwrap();
        assert_eq!(narrow.format_amount(&amount), "1.5e+22");
        assert_eq!(
            VerifierConfig::default().format_amount(&amount),
            "15000000000000000000000"
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            VerifierConfig::from_lookup(lookup(&[(ENV_DECIMAL_PRECISION, "lots")])),
            Err(ConfigError::InvalidValue { name: ENV_DECIMAL_PRECISION, .. })
        ));
        assert_eq!(
            VerifierConfig::from_lookup(lookup(&[(ENV_DECIMAL_PRECISION, "0")])),
            Err(ConfigError::ZeroPrecision)
        );
        assert_eq!(
            VerifierConfig::from_lookup(lookup(&[
                (ENV_DECIMAL_MIN_EXPONENT, "10"),
                (ENV_DECIMAL_MAX_EXPONENT, "10"),
            ])),
            Err(ConfigError::InvalidExponentBounds { min: 10, max: 10 })
        );
    }
}
