//! Watchdog controller states.
//!
//! The controller is always in exactly one of these states. The numeric
//! encoding is stable and is what the state gauge publishes.

/// Current phase of the connectivity watchdog.
///
/// ```text
///             fail                     deadline
/// Operating ────────► Investigating ──────────► Resetting
///     ▲                     │                    │  ▲
///     │      success        │                    │  │ recover timeout
///     ├─────────────────────┘      reset elapsed │  │
///     │                                          ▼  │
///     └───────────────── success ─────────── Recovering
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum State {
    /// Connectivity is healthy; probing at the normal cadence.
    #[default]
    Operating = 0,
    /// A probe round failed; probing rapidly to confirm the outage.
    Investigating = 1,
    /// Modem power is cut.
    Resetting = 2,
    /// Power has been restored; waiting for connectivity to return.
    Recovering = 3,
}

impl State {
    /// Every state, in numeric order.
    pub const ALL: [Self; 4] = [
        Self::Operating,
        Self::Investigating,
        Self::Resetting,
        Self::Recovering,
    ];

    /// Convert from the raw gauge value.
    #[must_use]
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Operating),
            1 => Some(Self::Investigating),
            2 => Some(Self::Resetting),
            3 => Some(Self::Recovering),
            _ => None,
        }
    }

    /// Convert to the raw gauge value.
    #[must_use]
    pub fn to_raw(self) -> u32 {
        self as u32
    }

    /// Lower-case state name as published to observers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Operating => "operating",
            Self::Investigating => "investigating",
            Self::Resetting => "resetting",
            Self::Recovering => "recovering",
        }
    }
}

impl core::fmt::Display for State {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
