use crate::model::Task;

/// Completion counts behind the progress donut. Always derived from the live
/// list; nothing here is stored alongside the tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self {
            completed: tasks.iter().filter(|task| task.completed).count(),
            total: tasks.len(),
        }
    }

    /// Tasks still open; the second slice of the donut.
    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }

    /// Share of completed tasks in `0.0..=100.0`. An empty list reports `0.0`.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    pub fn rounded_percentage(&self) -> u32 {
        self.percentage().round() as u32
    }
}
