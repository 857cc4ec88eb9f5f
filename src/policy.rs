use std::collections::HashMap;

use crate::mode::Mode;
use crate::severity::Severity;

/// Immutable (mode, severity) -> "should log" table.
///
/// Entries that were never allowed evaluate to `false`, so an unknown mode
/// suppresses everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    table: HashMap<(Mode, Severity), bool>,
}

impl Policy {
    /// `debug` forwards every severity; `dev` and `prod` forward everything
    /// except debug messages.
    pub fn standard() -> Self {
        Self::builder()
            .allow_all(Mode::DEBUG)
            .allow_all_except(Mode::DEV, &[Severity::Debug])
            .allow_all_except(Mode::PROD, &[Severity::Debug])
            .build()
    }

    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    /// Starts a builder seeded with this table's entries.
    pub fn extend(&self) -> PolicyBuilder {
        PolicyBuilder {
            table: self.table.clone(),
        }
    }

    pub fn should_log(&self, mode: &Mode, severity: Severity) -> bool {
        self.table
            .get(&(mode.clone(), severity))
            .copied()
            .unwrap_or(false)
    }

    /// Modes that have at least one entry, sorted by tag.
    pub fn modes(&self) -> Vec<Mode> {
        let mut modes: Vec<Mode> = self.table.keys().map(|(m, _)| m.clone()).collect();
        modes.sort();
        modes.dedup();
        modes
    }

    /// One row per known mode, with a decision for every severity in
    /// [`Severity::ALL`] order.
    pub fn rows(&self) -> Vec<(Mode, [bool; 5])> {
        self.modes()
            .into_iter()
            .map(|mode| {
                let row = Severity::ALL.map(|s| self.should_log(&mode, s));
                (mode, row)
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct PolicyBuilder {
    table: HashMap<(Mode, Severity), bool>,
}

impl PolicyBuilder {
    pub fn allow(mut self, mode: Mode, severity: Severity) -> Self {
        self.table.insert((mode, severity), true);
        self
    }

    pub fn deny(mut self, mode: Mode, severity: Severity) -> Self {
        self.table.insert((mode, severity), false);
        self
    }

    pub fn allow_all(self, mode: Mode) -> Self {
        self.allow_all_except(mode, &[])
    }

    pub fn allow_all_except(mut self, mode: Mode, excluded: &[Severity]) -> Self {
        for severity in Severity::ALL {
            let allowed = !excluded.contains(&severity);
            self.table.insert((mode.clone(), severity), allowed);
        }
        self
    }

    pub fn build(self) -> Policy {
        Policy { table: self.table }
    }
}
