use crate::StatusSnapshot;

/// Aggregate job progress derived from one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn from_snapshot(snapshot: &StatusSnapshot) -> Self {
        let completed = snapshot
            .items
            .iter()
            .filter(|item| item.status.is_completed())
            .count();
        Self {
            completed,
            total: snapshot.items.len(),
        }
    }

    /// Percentage in `0.0..=100.0`; zero when there is nothing to count.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed as f64 / self.total as f64) * 100.0
    }
}
