//! Outlet actions and batch outcomes.

use std::fmt;

use crate::protocol::ObjectPath;

/// Power transition for an outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutletAction {
    /// Clear the startup delay: the outlet switches on immediately.
    On,
    /// Clear the shutdown delay: the outlet switches off immediately.
    Off,
}

impl OutletAction {
    /// The delay object written for this action.
    pub fn delay_path(self, outlet: u32) -> ObjectPath {
        match self {
            Self::On => ObjectPath::outlet_startup_delay(outlet),
            Self::Off => ObjectPath::outlet_shutdown_delay(outlet),
        }
    }
}

impl fmt::Display for OutletAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

/// What happened to one outlet of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutletOutcome {
    /// The delay was written.
    Applied(u32),
    /// The index is outside `1..=outlet_count`; nothing was sent.
    NoSuchOutlet(u32),
}

impl OutletOutcome {
    /// The outlet index.
    pub fn outlet(self) -> u32 {
        match self {
            Self::Applied(n) | Self::NoSuchOutlet(n) => n,
        }
    }

    /// Check if the write was issued.
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

impl fmt::Display for OutletOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied(n) => write!(f, "Outlet {}", n),
            Self::NoSuchOutlet(n) => write!(f, "No such outlet: {}", n),
        }
    }
}
