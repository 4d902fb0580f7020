//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the global (user) scope and the repo scope;
//! [`super::Config`] merges them key by key, repo winning.
//!
//! # Validation
//!
//! Values are validated after parsing: extra maintainer-check branches must
//! be canonical release branches (`16.0`), forge identifiers must be
//! non-empty.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::version::series_from_branch;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// maintainer_check_series = ["15.0", "16.0"]
/// adopt_an_addon_mention = "Hi {pr_opener}, would you like to adopt this addon?"
///
/// [forge]
/// owner = "OCA"
/// repo = "server-tools"
/// token_env = "GITHUB_TOKEN"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Extra release branches whose maintainer declarations are honoured
    /// on top of the pull request's target branch.
    pub maintainer_check_series: Option<Vec<String>>,

    /// Comment posted when a modified addon has no maintainer at all.
    pub adopt_an_addon_mention: Option<String>,

    /// Hosting platform settings
    pub forge: Option<ForgeConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(series) = &self.maintainer_check_series {
            for branch in series {
                series_from_branch(branch).map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "maintainer_check_series entry '{}' is not a release branch like '16.0'",
                        branch
                    ))
                })?;
            }
        }

        if let Some(forge) = &self.forge {
            forge.validate()?;
        }

        Ok(())
    }
}

/// Hosting platform configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    /// Repository owner/organization
    pub owner: Option<String>,

    /// Repository name
    pub repo: Option<String>,

    /// API base URL (GitHub Enterprise)
    pub api_base: Option<String>,

    /// Environment variable holding the API token
    pub token_env: Option<String>,
}

impl ForgeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("owner", &self.owner),
            ("repo", &self.repo),
            ("api_base", &self.api_base),
            ("token_env", &self.token_env),
        ] {
            if matches!(value.as_deref(), Some("")) {
                return Err(ConfigError::InvalidValue(format!(
                    "forge.{} cannot be empty",
                    key
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_valid() {
        assert!(ConfigFile::default().validate().is_ok());
    }

    #[test]
    fn parses_full_file() {
        let file: ConfigFile = toml::from_str(
            r#"
            maintainer_check_series = ["15.0", "16.0"]
            adopt_an_addon_mention = "Hi {pr_opener}"

            [forge]
            owner = "OCA"
            repo = "server-tools"
            "#,
        )
        .unwrap();

        assert_eq!(
            file.maintainer_check_series,
            Some(vec!["15.0".to_string(), "16.0".to_string()])
        );
        assert_eq!(file.forge.as_ref().unwrap().owner.as_deref(), Some("OCA"));
        assert!(file.validate().is_ok());
    }

    #[test]
    fn non_release_branch_rejected() {
        let file = ConfigFile {
            maintainer_check_series: Some(vec!["16.0-fix".to_string()]),
            ..Default::default()
        };
        assert!(matches!(
            file.validate(),
            Err(ConfigError::InvalidValue(msg)) if msg.contains("16.0-fix")
        ));
    }

    #[test]
    fn empty_forge_value_rejected() {
        let file = ConfigFile {
            forge: Some(ForgeConfig {
                owner: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(file.validate().is_err());
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<ConfigFile, _> = toml::from_str("trunk = \"main\"");
        assert!(result.is_err());
    }
}
