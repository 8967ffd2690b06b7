use std::fmt;

use serde::{Deserialize, Serialize};

/// Which document family a run processes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    /// Pay slips and time cards; the employee signs alone over WhatsApp.
    #[default]
    Payroll,
    /// Vacation receipts; the director signs by e-mail, then the employee.
    Vacation,
}

impl FlowKind {
    /// Whether a share without a dated period directory is scanned at its root.
    pub fn scans_base_when_undated(self) -> bool {
        matches!(self, Self::Vacation)
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payroll => write!(f, "payroll"),
            Self::Vacation => write!(f, "vacation"),
        }
    }
}
