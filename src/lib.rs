//! Enum-restricted command-line flags and a mode-keyed logging gate.
//!
//! ```
//! use modeflag_lib::{ModeFlag, ModeGate, Policy, Severity, TracingLogger};
//!
//! let mut mode = ModeFlag::standard();
//! mode.set("prod").unwrap();
//!
//! let policy = Policy::standard();
//! let gate = ModeGate::new(&mode, &policy, TracingLogger);
//! assert!(gate.should_log(Severity::Critical));
//! assert!(!gate.should_log(Severity::Debug));
//! ```

pub mod args;
pub mod error;
pub mod flag;
pub mod gate;
pub mod mode;
pub mod policy;
pub mod severity;

pub use args::FlagSet;
pub use error::{FlagError, ValidationError};
pub use flag::{try_set, EnumFlag, OptionalFlag, SettableEnum};
pub use gate::{LogMessage, Logger, ModeGate, TracingLogger};
pub use mode::{Mode, ModeFlag};
pub use policy::{Policy, PolicyBuilder};
pub use severity::{Severity, SeverityParseError};
