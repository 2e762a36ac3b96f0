use crate::model::{Task, TaskId};
use crate::progress::Progress;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How `add` picks the id of a new task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Largest live id plus one (1 for an empty list). Removing the task with
    /// the largest id frees that id for the next `add`.
    #[default]
    #[serde(alias = "max", alias = "reuse", alias = "max-plus-one")]
    MaxPlusOne,
    /// One past every id seen this session, so removed ids stay retired.
    #[serde(alias = "monotonic", alias = "never-reuse")]
    NeverReuse,
}

impl IdPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|ch| match ch {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "max_plus_one" | "max" | "reuse" => Some(Self::MaxPlusOne),
            "never_reuse" | "monotonic" => Some(Self::NeverReuse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxPlusOne => "max_plus_one",
            Self::NeverReuse => "never_reuse",
        }
    }
}

/// Owns the task list and the two pending text inputs. A presentation layer
/// feeds user events in and renders from [`TaskListManager::tasks`] after
/// each call.
///
/// `add`, `toggle` and `remove` never fail. An invocation whose precondition
/// does not hold (blank title, unknown id) leaves the state untouched and
/// returns `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListManager {
    tasks: Vec<Task>,
    pending_title: String,
    pending_description: String,
    id_policy: IdPolicy,
    highest_seen_id: TaskId,
}

impl TaskListManager {
    pub fn new(id_policy: IdPolicy) -> Self {
        Self {
            id_policy,
            ..Self::default()
        }
    }

    /// Adopts `seed` as the initial list, newest (highest id) first.
    pub fn with_seed(mut seed: Vec<Task>, id_policy: IdPolicy) -> Self {
        seed.sort_by(|a, b| b.id.cmp(&a.id));
        let highest_seen_id = seed.first().map(|task| task.id).unwrap_or(0);
        debug!(count = seed.len(), policy = id_policy.as_str(), "adopted seed list");

        Self {
            tasks: seed,
            pending_title: String::new(),
            pending_description: String::new(),
            id_policy,
            highest_seen_id,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn id_policy(&self) -> IdPolicy {
        self.id_policy
    }

    pub fn pending_title(&self) -> &str {
        &self.pending_title
    }

    pub fn pending_description(&self) -> &str {
        &self.pending_description
    }

    pub fn set_pending_title(&mut self, text: impl Into<String>) {
        self.pending_title = text.into();
    }

    pub fn set_pending_description(&mut self, text: impl Into<String>) {
        self.pending_description = text.into();
    }

    pub fn progress(&self) -> Progress {
        Progress::from_tasks(&self.tasks)
    }

    /// Prepends a new task built from the trimmed inputs and clears the
    /// pending inputs. A blank title changes nothing, pending inputs included.
    pub fn add(&mut self, title: &str, description: Option<&str>) -> Option<Task> {
        let trimmed_title = title.trim();
        if trimmed_title.is_empty() {
            debug!("ignored add with blank title");
            return None;
        }

        let Some(id) = self.next_id() else {
            warn!("task id space exhausted; add ignored");
            return None;
        };

        let task = Task::new(id, trimmed_title, description.unwrap_or("").trim());
        self.tasks.insert(0, task.clone());
        self.highest_seen_id = self.highest_seen_id.max(id);
        self.pending_title.clear();
        self.pending_description.clear();
        debug!(id, total = self.tasks.len(), "added task");

        Some(task)
    }

    /// Adds a task from the pending title and description inputs.
    pub fn submit(&mut self) -> Option<Task> {
        let title = self.pending_title.clone();
        let description = self.pending_description.clone();
        self.add(&title, Some(&description))
    }

    pub fn toggle(&mut self, id: TaskId) -> Option<Task> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(id, "ignored toggle of unknown task");
            return None;
        };

        task.completed = !task.completed;
        debug!(id, completed = task.completed, "toggled task");
        Some(task.clone())
    }

    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!(id, "ignored remove of unknown task");
            return None;
        };

        let removed = self.tasks.remove(index);
        debug!(id, total = self.tasks.len(), "removed task");
        Some(removed)
    }

    fn next_id(&self) -> Option<TaskId> {
        let base = match self.id_policy {
            IdPolicy::MaxPlusOne => self.tasks.iter().map(|task| task.id).max().unwrap_or(0),
            IdPolicy::NeverReuse => self.highest_seen_id,
        };
        base.checked_add(1)
    }
}
