use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of the progress counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub total: Option<u64>,
    pub current: u64,
}

impl Display for ProgressSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.total {
            Some(total) => write!(f, "{}/{}", self.current, total),
            None => write!(f, "{}", self.current),
        }
    }
}

/// Shared tally of processed objects.
///
/// One counter exists per run. The total is fixed at construction, so the
/// counting pass must have finished before the counter is created.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    total: Option<u64>,
    current: AtomicU64,
}

impl ProgressCounter {
    pub fn new(total: Option<u64>) -> Self {
        Self {
            total,
            current: AtomicU64::new(0),
        }
    }

    /// Advance by one and return the snapshot belonging to this increment.
    pub fn increment(&self) -> ProgressSnapshot {
        let current = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        ProgressSnapshot {
            total: self.total,
            current,
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total,
            current: self.current.load(Ordering::Acquire),
        }
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }
}
