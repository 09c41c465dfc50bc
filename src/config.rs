use std::path::PathBuf;

use strum::{Display, EnumString};
use thiserror::Error;

pub const PROMPT_VAR: &str = "PIPESH_PROMPT";
pub const SYNTAX_ERRORS_VAR: &str = "PIPESH_SYNTAX_ERRORS";
pub const LOG_DIR_VAR: &str = "PIPESH_LOG_DIR";

pub const DEFAULT_PROMPT: &str = ">> ";
pub const LOG_FILE: &str = "pipesh.log";

/// What a malformed line does to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SyntaxErrorPolicy {
    /// Report the error, drop the line and keep reading.
    #[default]
    Recover,
    /// Report the error and terminate with a failure status.
    Fatal,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var} value {value:?} (expected \"recover\" or \"fatal\")")]
    InvalidPolicy { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub syntax_errors: SyntaxErrorPolicy,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.into(),
            syntax_errors: SyntaxErrorPolicy::default(),
            log_dir: std::env::temp_dir(),
        }
    }
}

impl Config {
    /// Reads the process environment. Variables that are not valid unicode
    /// are skipped.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            match key.as_ref() {
                PROMPT_VAR => config.prompt = value.into(),
                SYNTAX_ERRORS_VAR => {
                    let value = value.into();
                    config.syntax_errors = value.trim().parse().map_err(|_| {
                        ConfigError::InvalidPolicy {
                            var: SYNTAX_ERRORS_VAR,
                            value,
                        }
                    })?;
                }
                LOG_DIR_VAR => config.log_dir = PathBuf::from(value.into()),
                _ => {}
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_variables() {
        let config = Config::from_vars(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.prompt, ">> ");
        assert_eq!(config.syntax_errors, SyntaxErrorPolicy::Recover);
    }

    #[test]
    fn reads_known_variables() {
        let config = Config::from_vars([
            ("PIPESH_PROMPT", "$ "),
            ("PIPESH_SYNTAX_ERRORS", " Fatal "),
            ("PIPESH_LOG_DIR", "/var/log/pipesh"),
            ("UNRELATED", "ignored"),
        ])
        .unwrap();

        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.syntax_errors, SyntaxErrorPolicy::Fatal);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/pipesh"));
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = Config::from_vars([("PIPESH_SYNTAX_ERRORS", "explode")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPolicy { ref value, .. } if value == "explode"
        ));
    }

    #[test]
    fn policy_round_trips_through_its_name() {
        assert_eq!(SyntaxErrorPolicy::Recover.to_string(), "recover");
        assert_eq!(
            "fatal".parse::<SyntaxErrorPolicy>().unwrap(),
            SyntaxErrorPolicy::Fatal
        );
    }
}
