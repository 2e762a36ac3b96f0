use crate::error::AppError;
use crate::manager::{IdPolicy, TaskListManager};
use crate::model::Task;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

const SEED_ENV_VAR: &str = "TASKLY_SEED_PATH";

/// Seed file named by `TASKLY_SEED_PATH`, if set to a non-blank value.
pub fn seed_path_from_env() -> Option<PathBuf> {
    match std::env::var(SEED_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => None,
    }
}

/// Reads a JSON array of tasks. Titles and descriptions are trimmed; ids must
/// be unique and titles non-blank.
pub fn load_seed(path: &Path) -> Result<Vec<Task>, AppError> {
    let content = std::fs::read_to_string(path).map_err(|err| AppError::io_at(path, err))?;
    let tasks = parse_seed(&content).map_err(|err| err.at_path(path))?;
    debug!(path = %path.display(), count = tasks.len(), "loaded seed");
    Ok(tasks)
}

pub fn parse_seed(content: &str) -> Result<Vec<Task>, AppError> {
    let raw: Vec<Task> =
        serde_json::from_str(content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    let mut seen = HashSet::with_capacity(raw.len());
    let mut tasks = Vec::with_capacity(raw.len());
    for task in raw {
        if !seen.insert(task.id) {
            return Err(AppError::invalid_data(format!(
                "duplicate task id {}",
                task.id
            )));
        }

        let title = task.title.trim();
        if title.is_empty() {
            return Err(AppError::invalid_data(format!(
                "task {} has a blank title",
                task.id
            )));
        }

        tasks.push(Task {
            id: task.id,
            title: title.to_string(),
            description: task.description.trim().to_string(),
            completed: task.completed,
        });
    }

    Ok(tasks)
}

/// Builds the session's manager: the seed at `path` (or an empty list when
/// there is none), newest first.
pub fn initial_manager(
    path: Option<&Path>,
    id_policy: IdPolicy,
) -> Result<TaskListManager, AppError> {
    let seed = match path {
        Some(path) => load_seed(path)?,
        None => Vec::new(),
    };
    Ok(TaskListManager::with_seed(seed, id_policy))
}
