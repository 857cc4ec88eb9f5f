use std::collections::BTreeMap;

use modeflag_lib::{FlagError, Mode, ModeFlag, Policy, Severity};
use serde::Deserialize;

/// Top-level modeflag.toml configuration
#[derive(Debug, Deserialize, Default)]
pub struct ModeflagConfig {
    #[serde(default)]
    pub mode: ModeConfig,
    /// Extra policy rows: mode tag -> severities that are forwarded.
    #[serde(default)]
    pub policy: BTreeMap<String, Vec<SeverityName>>,
}

/// A severity written by name in the config file, e.g. `"warn"`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct SeverityName(pub Severity);

impl TryFrom<String> for SeverityName {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse::<Severity>()
            .map(SeverityName)
            .map_err(|_| format!("unknown severity: {name}"))
    }
}

#[derive(Debug, Deserialize)]
pub struct ModeConfig {
    #[serde(default = "default_mode")]
    pub default: String,
    #[serde(default = "default_allowed")]
    pub allowed: Vec<String>,
}

// ── Default value functions ──────────────────────────

fn default_mode() -> String {
    "dev".to_string()
}

fn default_allowed() -> Vec<String> {
    vec!["dev".to_string(), "prod".to_string(), "debug".to_string()]
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            default: default_mode(),
            allowed: default_allowed(),
        }
    }
}

impl ModeflagConfig {
    /// Load configuration from a TOML file, falling back to defaults if the file
    /// doesn't exist or cannot be parsed.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("failed to parse {}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!("{} not found, using defaults", path);
                Self::default()
            }
        }
    }

    pub fn mode_flag(&self) -> Result<ModeFlag, FlagError> {
        let allowed: Vec<Mode> = self.mode.allowed.iter().map(|m| Mode::new(m.as_str())).collect();
        ModeFlag::new(&Mode::new(self.mode.default.as_str()), &allowed)
    }

    /// The standard table with every `[policy]` row replacing the row for
    /// its mode.
    pub fn policy(&self) -> Policy {
        let mut builder = Policy::standard().extend();
        for (mode, enabled) in &self.policy {
            let excluded: Vec<Severity> = Severity::ALL
                .into_iter()
                .filter(|s| !enabled.contains(&SeverityName(*s)))
                .collect();
            builder = builder.allow_all_except(Mode::new(mode.as_str()), &excluded);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_standard_mode_flag() {
        let config = ModeflagConfig::default();
        assert_eq!(config.mode_flag().unwrap(), ModeFlag::standard());
        assert_eq!(config.policy(), Policy::standard());
    }

    #[test]
    fn test_parse_full_config() {
        let config: ModeflagConfig = toml::from_str(
            r#"
[mode]
default = "prod"
allowed = ["dev", "prod", "debug", "migrate"]

[policy]
migrate = ["info", "error", "critical"]
prod = ["error", "critical"]
"#,
        )
        .unwrap();

        let mut flag = config.mode_flag().unwrap();
        assert!(flag.is_prod());
        flag.set("migrate").unwrap();
        assert!(flag.is_migrate());

        let policy = config.policy();
        assert!(policy.should_log(&Mode::MIGRATE, Severity::Info));
        assert!(!policy.should_log(&Mode::MIGRATE, Severity::Warning));
        assert!(!policy.should_log(&Mode::PROD, Severity::Info));
        assert!(policy.should_log(&Mode::PROD, Severity::Critical));
        assert!(policy.should_log(&Mode::DEBUG, Severity::Debug));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ModeflagConfig = toml::from_str("[mode]\ndefault = \"debug\"\n").unwrap();
        assert_eq!(config.mode.allowed, default_allowed());
        assert!(config.mode_flag().unwrap().is_debug());
    }

    #[test]
    fn test_invalid_default_rejected() {
        let config: ModeflagConfig =
            toml::from_str("[mode]\ndefault = \"staging\"\n").unwrap();
        assert!(matches!(
            config.mode_flag(),
            Err(FlagError::DefaultNotAllowed { .. })
        ));
    }

    #[test]
    fn test_unknown_severity_in_policy() {
        let err = toml::from_str::<ModeflagConfig>("[policy]\nsetup = [\"info\", \"verbose\"]\n")
            .unwrap_err();
        assert!(err.to_string().contains("unknown severity: verbose"));
    }

    #[test]
    fn test_policy_severity_aliases() {
        let config: ModeflagConfig =
            toml::from_str("[policy]\nsetup = [\"WARN\", \"Critical\"]\n").unwrap();
        assert_eq!(
            config.policy["setup"],
            vec![
                SeverityName(Severity::Warning),
                SeverityName(Severity::Critical)
            ]
        );
        let policy = config.policy();
        assert!(policy.should_log(&Mode::SETUP, Severity::Warning));
        assert!(!policy.should_log(&Mode::SETUP, Severity::Info));
    }

    #[test]
    fn test_load_missing_file() {
        let config = ModeflagConfig::load("does-not-exist/modeflag.toml");
        assert_eq!(config.mode.default, "dev");
        assert!(config.policy.is_empty());
    }
}
