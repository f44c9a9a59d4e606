use std::fmt;

/// Persistence state of one item, shown in the footer.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStatus {
    /// Edit waiting for its debounce timer.
    Pending,
    Saving,
    Saved,
    /// Write failed; retry number `attempt` is scheduled.
    Retrying { attempt: u32 },
    /// Retries exhausted. The patch is kept for a manual retry.
    Unsaved,
    /// The document disappeared before the write landed.
    Discarded,
}

impl SyncStatus {
    /// Whether local changes have not reached the store yet.
    ///
    pub fn has_local_changes(&self) -> bool {
        matches!(
            self,
            SyncStatus::Pending
                | SyncStatus::Saving
                | SyncStatus::Retrying { .. }
                | SyncStatus::Unsaved
        )
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Pending => write!(f, "editing"),
            SyncStatus::Saving => write!(f, "saving..."),
            SyncStatus::Saved => write!(f, "saved"),
            SyncStatus::Retrying { attempt } => write!(f, "retrying ({})", attempt),
            SyncStatus::Unsaved => write!(f, "unsaved changes (R to retry)"),
            SyncStatus::Discarded => write!(f, "item deleted, changes discarded"),
        }
    }
}

/// How soon a patch should reach the store.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersistMode {
    /// Coalesce with further edits and write after the debounce delay.
    Debounced,
    /// Write now, together with anything still waiting for its timer.
    Immediate,
}
