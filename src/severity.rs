use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Importance tag attached to every log message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    Info,
    Error,
    #[strum(to_string = "warning", serialize = "warn")]
    Warning,
    Debug,
    Critical,
}

/// Error returned when text names no [`Severity`].
pub type SeverityParseError = strum::ParseError;

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Error,
        Severity::Warning,
        Severity::Debug,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}
