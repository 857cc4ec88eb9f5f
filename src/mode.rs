use core::fmt;
use std::borrow::Cow;

use crate::error::{FlagError, ValidationError};
use crate::flag::{EnumFlag, SettableEnum};

/// Short name of the mode flag.
pub const FLAG_NAME: &str = "m";

/// Long name of the mode flag.
pub const FLAG_LONG_NAME: &str = "mode";

/// Renders the mode flag usage line for the given allowed set and default.
pub fn usage<S: AsRef<str>>(allowed: &[S], default_value: &str) -> String {
    let allowed: Vec<&str> = allowed.iter().map(|s| s.as_ref()).collect();
    format!(
        "Specify mode. Allowed values are: {}. Default is the {} mode.",
        allowed.join(", "),
        default_value
    )
}

/// An operating profile tag such as `dev` or `prod`.
///
/// The set of tags is open: the well-known ones are provided as constants,
/// anything else can be made with [`Mode::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mode(Cow<'static, str>);

impl Mode {
    pub const DEV: Mode = Mode(Cow::Borrowed("dev"));
    pub const PROD: Mode = Mode(Cow::Borrowed("prod"));
    pub const DEBUG: Mode = Mode(Cow::Borrowed("debug"));
    pub const MIGRATE: Mode = Mode(Cow::Borrowed("migrate"));
    pub const SETUP: Mode = Mode(Cow::Borrowed("setup"));

    pub fn new(tag: impl Into<String>) -> Self {
        Mode(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Mode {
    fn from(tag: &str) -> Self {
        Mode::new(tag)
    }
}

/// The environment mode flag: an [`EnumFlag`] over mode tags with
/// convenience predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeFlag {
    flag: EnumFlag,
}

impl ModeFlag {
    pub fn new(default_value: &Mode, allowed: &[Mode]) -> Result<Self, FlagError> {
        let tags: Vec<&str> = allowed.iter().map(Mode::as_str).collect();
        let flag = EnumFlag::new(default_value.as_str(), tags.as_slice())?
            .with_name(FLAG_NAME)
            .with_usage(&usage(tags.as_slice(), default_value.as_str()));
        Ok(Self { flag })
    }

    /// `dev` by default, allowing `dev`, `prod` and `debug`.
    pub fn standard() -> Self {
        Self::new(&Mode::DEV, &[Mode::DEV, Mode::PROD, Mode::DEBUG])
            .expect("standard mode set contains its default")
    }

    /// Renames the flag, e.g. to [`FLAG_LONG_NAME`].
    pub fn with_name(mut self, name: &str) -> Self {
        self.flag = self.flag.with_name(name);
        self
    }

    pub fn set(&mut self, candidate: &str) -> Result<(), ValidationError> {
        self.flag.set(candidate)
    }

    pub fn value(&self) -> &str {
        self.flag.value()
    }

    /// The active mode, taken straight from the stored value.
    pub fn mode(&self) -> Mode {
        Mode::new(self.flag.value())
    }

    pub fn is(&self, mode: &Mode) -> bool {
        self.flag.value() == mode.as_str()
    }

    pub fn is_dev(&self) -> bool {
        self.is(&Mode::DEV)
    }

    pub fn is_prod(&self) -> bool {
        self.is(&Mode::PROD)
    }

    pub fn is_debug(&self) -> bool {
        self.is(&Mode::DEBUG)
    }

    pub fn is_migrate(&self) -> bool {
        self.is(&Mode::MIGRATE)
    }

    pub fn is_setup(&self) -> bool {
        self.is(&Mode::SETUP)
    }

    pub fn as_flag(&self) -> &EnumFlag {
        &self.flag
    }
}

impl Default for ModeFlag {
    fn default() -> Self {
        Self::standard()
    }
}

impl SettableEnum for ModeFlag {
    fn set(&mut self, candidate: &str) -> Result<(), ValidationError> {
        self.flag.set(candidate)
    }

    fn value(&self) -> &str {
        self.flag.value()
    }

    fn default_value(&self) -> &str {
        self.flag.default_value()
    }

    fn allowed(&self) -> &[String] {
        self.flag.allowed()
    }

    fn name(&self) -> &str {
        self.flag.name()
    }

    fn usage(&self) -> &str {
        self.flag.usage()
    }
}

impl fmt::Display for ModeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_text() {
        assert_eq!(
            usage(&["dev", "prod", "debug"], "dev"),
            "Specify mode. Allowed values are: dev, prod, debug. Default is the dev mode."
        );
    }

    #[test]
    fn test_standard_flag() {
        let flag = ModeFlag::standard();
        assert_eq!(flag.value(), "dev");
        assert!(flag.is_dev());
        assert_eq!(SettableEnum::name(&flag), FLAG_NAME);
        assert_eq!(
            SettableEnum::usage(&flag),
            "Specify mode. Allowed values are: dev, prod, debug. Default is the dev mode."
        );
    }

    #[test]
    fn test_predicates_exclusive() {
        let mut flag = ModeFlag::standard();
        for candidate in ["dev", "prod", "debug"] {
            flag.set(candidate).unwrap();
            let hits = [flag.is_dev(), flag.is_prod(), flag.is_debug()]
                .iter()
                .filter(|b| **b)
                .count();
            assert_eq!(hits, 1, "mode {candidate}");
        }
    }

    #[test]
    fn test_mode_follows_value() {
        let mut flag = ModeFlag::standard();
        assert_eq!(flag.mode(), Mode::DEV);
        flag.set("debug").unwrap();
        assert_eq!(flag.mode(), Mode::DEBUG);
        assert!(flag.set("migrate").is_err());
        assert_eq!(flag.mode(), Mode::DEBUG);
    }

    #[test]
    fn test_custom_mode_set() {
        let allowed = [
            Mode::DEV,
            Mode::PROD,
            Mode::DEBUG,
            Mode::MIGRATE,
            Mode::SETUP,
        ];
        let mut flag = ModeFlag::new(&Mode::PROD, &allowed).unwrap();
        assert!(flag.is_prod());
        flag.set("setup").unwrap();
        assert!(flag.is_setup());
        flag.set("migrate").unwrap();
        assert!(flag.is_migrate());
        assert_eq!(flag.mode(), Mode::MIGRATE);
    }

    #[test]
    fn test_open_mode_tags() {
        let staging = Mode::new("staging");
        let mut flag = ModeFlag::new(&staging, &[staging.clone(), Mode::PROD]).unwrap();
        assert!(flag.is(&staging));
        assert!(!flag.is_dev());
        flag.set("prod").unwrap();
        assert_eq!(flag.mode().as_str(), "prod");
    }

    #[test]
    fn test_new_rejects_default_outside_set() {
        let err = ModeFlag::new(&Mode::DEBUG, &[Mode::DEV, Mode::PROD]).unwrap_err();
        assert!(matches!(err, FlagError::DefaultNotAllowed { .. }));
    }

    #[test]
    fn test_mode_constants_equal_owned() {
        assert_eq!(Mode::new("dev"), Mode::DEV);
        assert_eq!(Mode::from("prod"), Mode::PROD);
        assert_eq!(Mode::SETUP.to_string(), "setup");
    }
}
