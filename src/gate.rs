use crate::mode::ModeFlag;
use crate::policy::Policy;
use crate::severity::Severity;

/// A severity-tagged message handed to a [`Logger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub severity: Severity,
    pub header: String,
    pub subheader: Option<String>,
    pub details: Vec<String>,
}

impl LogMessage {
    pub fn new(severity: Severity, header: &str) -> Self {
        Self {
            severity,
            header: header.to_string(),
            subheader: None,
            details: Vec::new(),
        }
    }

    pub fn with_subheader(mut self, subheader: &str) -> Self {
        self.subheader = Some(subheader.to_string());
        self
    }

    pub fn with_details<S: AsRef<str>>(mut self, details: &[S]) -> Self {
        self.details = details.iter().map(|d| d.as_ref().to_string()).collect();
        self
    }
}

/// Sink for log messages. Transport and formatting are up to the
/// implementation.
pub trait Logger {
    fn log(&self, message: &LogMessage);
}

impl<L: Logger + ?Sized> Logger for &L {
    fn log(&self, message: &LogMessage) {
        (**self).log(message)
    }
}

impl<L: Logger + ?Sized> Logger for Box<L> {
    fn log(&self, message: &LogMessage) {
        (**self).log(message)
    }
}

/// Forwards messages to `tracing`. Critical messages go out at error level
/// with `critical = true`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &LogMessage) {
        let subheader = message.subheader.as_deref().unwrap_or("");
        let details = message.details.join(", ");
        let header = message.header.as_str();
        match message.severity {
            Severity::Info => tracing::info!(subheader, details = %details, "{header}"),
            Severity::Warning => tracing::warn!(subheader, details = %details, "{header}"),
            Severity::Debug => tracing::debug!(subheader, details = %details, "{header}"),
            Severity::Error => tracing::error!(subheader, details = %details, "{header}"),
            Severity::Critical => {
                tracing::error!(critical = true, subheader, details = %details, "{header}")
            }
        }
    }
}

/// Decides per call whether a message reaches the logger, based on the
/// current mode and the policy table.
pub struct ModeGate<'a, L: Logger> {
    mode: &'a ModeFlag,
    policy: &'a Policy,
    logger: L,
}

impl<'a, L: Logger> ModeGate<'a, L> {
    pub fn new(mode: &'a ModeFlag, policy: &'a Policy, logger: L) -> Self {
        Self {
            mode,
            policy,
            logger,
        }
    }

    pub fn should_log(&self, severity: Severity) -> bool {
        let mode = self.mode.mode();
        let decision = self.policy.should_log(&mode, severity);
        tracing::trace!(%mode, %severity, decision, "mode gate");
        decision
    }

    /// Runs `action` only when `severity` is enabled for the current mode.
    pub fn run_if_should_log<F: FnOnce()>(&self, severity: Severity, action: F) {
        if self.should_log(severity) {
            action();
        }
    }

    /// Forwards a pre-built message, gated on its own severity. `None` is
    /// ignored.
    pub fn log(&self, message: Option<&LogMessage>) {
        if let Some(message) = message {
            self.run_if_should_log(message.severity, || self.logger.log(message));
        }
    }

    pub fn info<S: AsRef<str>>(&self, header: &str, details: &[S]) {
        self.emit(Severity::Info, header, details);
    }

    pub fn error<S: AsRef<str>>(&self, header: &str, details: &[S]) {
        self.emit(Severity::Error, header, details);
    }

    pub fn warning<S: AsRef<str>>(&self, header: &str, details: &[S]) {
        self.emit(Severity::Warning, header, details);
    }

    pub fn debug<S: AsRef<str>>(&self, header: &str, details: &[S]) {
        self.emit(Severity::Debug, header, details);
    }

    pub fn critical<S: AsRef<str>>(&self, header: &str, details: &[S]) {
        self.emit(Severity::Critical, header, details);
    }

    /// Reports the active mode as a debug message.
    pub fn mode_flag_set(&self) {
        self.debug("mode flag set", &[self.mode.value()]);
    }

    fn emit<S: AsRef<str>>(&self, severity: Severity, header: &str, details: &[S]) {
        // message is only built when it will be forwarded
        self.run_if_should_log(severity, || {
            let message = LogMessage::new(severity, header).with_details(details);
            self.logger.log(&message);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::mode::Mode;

    #[derive(Default)]
    struct RecordingLogger {
        messages: RefCell<Vec<LogMessage>>,
    }

    impl Logger for RecordingLogger {
        fn log(&self, message: &LogMessage) {
            self.messages.borrow_mut().push(message.clone());
        }
    }

    fn mode_flag(value: &str) -> ModeFlag {
        let mut flag = ModeFlag::standard();
        flag.set(value).unwrap();
        flag
    }

    #[test]
    fn test_should_log_by_mode() {
        let policy = Policy::standard();
        let debug = mode_flag("debug");
        let dev = mode_flag("dev");
        let prod = mode_flag("prod");
        assert!(ModeGate::new(&debug, &policy, TracingLogger).should_log(Severity::Debug));
        assert!(!ModeGate::new(&dev, &policy, TracingLogger).should_log(Severity::Debug));
        assert!(ModeGate::new(&prod, &policy, TracingLogger).should_log(Severity::Critical));
    }

    #[test]
    fn test_run_if_should_log_counts() {
        let policy = Policy::standard();
        let dev = mode_flag("dev");
        let gate = ModeGate::new(&dev, &policy, TracingLogger);

        let calls = Cell::new(0);
        gate.run_if_should_log(Severity::Debug, || calls.set(calls.get() + 1));
        assert_eq!(calls.get(), 0);
        gate.run_if_should_log(Severity::Info, || calls.set(calls.get() + 1));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_severity_methods_forward() {
        let policy = Policy::standard();
        let prod = mode_flag("prod");
        let logger = RecordingLogger::default();
        let gate = ModeGate::new(&prod, &policy, &logger);

        gate.info("started", &["port 8080"]);
        gate.debug("noisy", &["skipped"]);
        gate.warning("slow", &["1200ms"]);
        gate.error("failed", &["db"]);
        gate.critical("down", &["all"]);

        let messages = logger.messages.borrow();
        let headers: Vec<&str> = messages.iter().map(|m| m.header.as_str()).collect();
        assert_eq!(headers, vec!["started", "slow", "failed", "down"]);
        assert_eq!(messages[0].details, vec!["port 8080".to_string()]);
        assert_eq!(messages[3].severity, Severity::Critical);
    }

    #[test]
    fn test_log_ignores_none() {
        let policy = Policy::standard();
        let debug = mode_flag("debug");
        let logger = RecordingLogger::default();
        let gate = ModeGate::new(&debug, &policy, &logger);

        gate.log(None);
        assert!(logger.messages.borrow().is_empty());

        let msg = LogMessage::new(Severity::Debug, "trace")
            .with_subheader("cache")
            .with_details(&["miss"]);
        gate.log(Some(&msg));
        assert_eq!(logger.messages.borrow().as_slice(), &[msg]);
    }

    #[test]
    fn test_log_gated_on_message_severity() {
        let policy = Policy::standard();
        let dev = mode_flag("dev");
        let logger = RecordingLogger::default();
        let gate = ModeGate::new(&dev, &policy, &logger);

        gate.log(Some(&LogMessage::new(Severity::Debug, "hidden")));
        gate.log(Some(&LogMessage::new(Severity::Warning, "shown")));
        let messages = logger.messages.borrow();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].header, "shown");
    }

    #[test]
    fn test_mode_flag_set_only_in_debug() {
        let policy = Policy::standard();
        let logger = RecordingLogger::default();

        let dev = mode_flag("dev");
        ModeGate::new(&dev, &policy, &logger).mode_flag_set();
        assert!(logger.messages.borrow().is_empty());

        let debug = mode_flag("debug");
        ModeGate::new(&debug, &policy, &logger).mode_flag_set();
        let messages = logger.messages.borrow();
        assert_eq!(messages[0].header, "mode flag set");
        assert_eq!(messages[0].details, vec!["debug".to_string()]);
    }

    #[test]
    fn test_unknown_mode_suppresses_all() {
        let policy = Policy::standard();
        let allowed = [Mode::DEV, Mode::MIGRATE];
        let mut flag = ModeFlag::new(&Mode::DEV, &allowed).unwrap();
        flag.set("migrate").unwrap();
        let gate = ModeGate::new(&flag, &policy, TracingLogger);
        for severity in Severity::ALL {
            assert!(!gate.should_log(severity));
        }
    }

    #[test]
    fn test_boxed_logger() {
        let policy = Policy::standard();
        let debug = mode_flag("debug");
        let logger: Box<dyn Logger> = Box::new(TracingLogger);
        let gate = ModeGate::new(&debug, &policy, logger);
        gate.critical("boxed", &["ok"]);
        assert!(gate.should_log(Severity::Debug));
    }
}
