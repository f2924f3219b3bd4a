//! Panel configuration: browser URLs opened by panel actions, local storage key prefix, and the
//! display currency.

use serde::Deserialize;
use thiserror::Error;

use crate::model::DEFAULT_CURRENCY;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML text could not be parsed into a [`PanelConfig`].
    #[error("failed to parse panel config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field parsed but carries an unusable value.
    #[error("invalid panel config field `{field}`: {reason}")]
    Invalid {
        /// Offending field name.
        field: &'static str,
        /// Human-readable reason.
        reason: &'static str,
    },
}

/// Host-provided panel settings. Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Rewards settings page opened by the "settings" action.
    pub rewards_settings_url: String,
    /// Page opened to start wallet verification.
    pub verify_wallet_url: String,
    /// Page opened by the "back up wallet" notification action.
    pub manage_wallet_url: String,
    /// Prefix applied to every locally stored UI flag key.
    pub storage_key_prefix: String,
    /// Currency reported in exchange info.
    pub currency: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            rewards_settings_url: "chrome://rewards".to_string(),
            verify_wallet_url: "chrome://rewards#verify".to_string(),
            manage_wallet_url: "chrome://rewards#manage-wallet".to_string(),
            storage_key_prefix: "rewards-panel-".to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl PanelConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and [`ConfigError::Invalid`] when the
    /// currency is blank.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "currency",
                reason: "must not be blank",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(
            PanelConfig::from_toml_str("").expect("parse"),
            PanelConfig::default()
        );
    }

    #[test]
    fn partial_document_overrides_named_fields_only() {
        let config = PanelConfig::from_toml_str(
            r#"
            rewards_settings_url = "brave://rewards"
            currency = "EUR"
            "#,
        )
        .expect("parse");

        assert_eq!(config.rewards_settings_url, "brave://rewards");
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.storage_key_prefix, "rewards-panel-");
    }

    #[test]
    fn malformed_and_blank_values_are_rejected() {
        assert!(matches!(
            PanelConfig::from_toml_str("currency = 5"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            PanelConfig::from_toml_str("currency = \"  \""),
            Err(ConfigError::Invalid {
                field: "currency",
                ..
            })
        ));
    }
}
