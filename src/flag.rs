use std::fmt;

use crate::error::{FlagError, ValidationError};

/// A command-line value that can be set from a raw string and read back.
///
/// `EnumFlag` implements this directly; wrappers such as
/// [`ModeFlag`](crate::mode::ModeFlag) implement it by delegating to the
/// flag they hold. [`FlagSet`](crate::args::FlagSet) only sees this trait.
pub trait SettableEnum {
    fn set(&mut self, candidate: &str) -> Result<(), ValidationError>;
    fn value(&self) -> &str;
    fn default_value(&self) -> &str;
    fn allowed(&self) -> &[String];
    fn name(&self) -> &str;
    fn usage(&self) -> &str;
}

/// A string flag restricted to a fixed set of allowed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumFlag {
    default_value: String,
    value: Option<String>,
    allowed: Vec<String>,
    name: String,
    usage: String,
}

impl EnumFlag {
    /// Creates a flag with no current value. `allowed` must be non-empty and
    /// contain `default_value`.
    pub fn new<S: AsRef<str>>(default_value: &str, allowed: &[S]) -> Result<Self, FlagError> {
        let allowed: Vec<String> = allowed.iter().map(|s| s.as_ref().to_string()).collect();
        if allowed.is_empty() {
            return Err(FlagError::EmptyAllowed);
        }
        if !allowed.iter().any(|v| v == default_value) {
            return Err(FlagError::DefaultNotAllowed {
                default: default_value.to_string(),
                allowed,
            });
        }
        Ok(Self {
            default_value: default_value.to_string(),
            value: None,
            allowed,
            name: String::new(),
            usage: String::new(),
        })
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Stores `candidate` if it is one of the allowed values. Matching is
    /// exact and case-sensitive; a failed call leaves the previous value.
    pub fn set(&mut self, candidate: &str) -> Result<(), ValidationError> {
        match self.allowed.iter().find(|v| v.as_str() == candidate) {
            Some(v) => {
                tracing::debug!(flag = %self.name, value = %v, "flag set");
                self.value = Some(v.clone());
                Ok(())
            }
            None => Err(ValidationError::new(candidate, &self.allowed)),
        }
    }

    /// Current value, or the default when never set.
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.default_value)
    }

    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }
}

impl SettableEnum for EnumFlag {
    fn set(&mut self, candidate: &str) -> Result<(), ValidationError> {
        EnumFlag::set(self, candidate)
    }

    fn value(&self) -> &str {
        EnumFlag::value(self)
    }

    fn default_value(&self) -> &str {
        EnumFlag::default_value(self)
    }

    fn allowed(&self) -> &[String] {
        EnumFlag::allowed(self)
    }

    fn name(&self) -> &str {
        EnumFlag::name(self)
    }

    fn usage(&self) -> &str {
        EnumFlag::usage(self)
    }
}

impl fmt::Display for EnumFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Zero-value accessors for a flag that may not exist.
///
/// Call sites holding an `Option<&T>` read `""` or an empty slice instead of
/// branching on presence everywhere.
pub trait OptionalFlag {
    fn value_or_empty(&self) -> &str;
    fn default_or_empty(&self) -> &str;
    fn allowed_or_empty(&self) -> &[String];
}

impl<T: SettableEnum> OptionalFlag for Option<&T> {
    fn value_or_empty(&self) -> &str {
        self.map(|f| f.value()).unwrap_or("")
    }

    fn default_or_empty(&self) -> &str {
        self.map(|f| f.default_value()).unwrap_or("")
    }

    fn allowed_or_empty(&self) -> &[String] {
        self.map(|f| f.allowed()).unwrap_or(&[])
    }
}

/// Sets a flag that may not exist; an absent flag is an error.
pub fn try_set<T: SettableEnum>(flag: Option<&mut T>, candidate: &str) -> Result<(), FlagError> {
    match flag {
        Some(f) => Ok(f.set(candidate)?),
        None => Err(FlagError::Absent),
    }
}
