//! Completion poll bound

/// Default number of poll intervals waited before giving up
pub const DEFAULT_MAX_POLLS: u32 = 10_000;

/// How long the driver keeps polling a busy chip after a command
///
/// The delay between two polls comes from the chip descriptor; this only
/// bounds how many of those delays are waited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollLimit {
    /// Poll until the chip reports ready, however long that takes
    Unbounded,
    /// Give up with [`crate::DriverError::Timeout`] after this many delays
    Polls(u32),
}

impl PollLimit {
    /// Check if another delay is allowed after `waited` delays
    pub fn allows(self, waited: u32) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Polls(max) => waited < max,
        }
    }
}

impl Default for PollLimit {
    fn default() -> Self {
        Self::Polls(DEFAULT_MAX_POLLS)
    }
}
