use crate::types::{AppError, Result, TaskId, TaskStatus, TaskView};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Handle returned to the submitter; the only way to address a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(TaskId);

impl TaskHandle {
    pub fn new(id: TaskId) -> Self {
        Self(id)
    }

    pub fn id(self) -> TaskId {
        self.0
    }
}

impl std::fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state. Facts only exist in `Done`, so a task can never expose
/// facts while processing or after a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskState {
    Processing,
    Done { facts: Vec<String> },
    /// `reason` is kept for logs and the CLI; pollers only see the status
    Error { reason: String },
}

impl TaskState {
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskState::Processing => TaskStatus::Processing,
            TaskState::Done { .. } => TaskStatus::Done,
            TaskState::Error { .. } => TaskStatus::Error,
        }
    }

    pub fn facts(&self) -> Option<&[String]> {
        match self {
            TaskState::Done { facts } => Some(facts),
            _ => None,
        }
    }
}

/// Final result reported by the background pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Done(Vec<String>),
    Error(String),
}

impl From<Result<Vec<String>>> for TaskOutcome {
    fn from(result: Result<Vec<String>>) -> Self {
        match result {
            Ok(facts) => TaskOutcome::Done(facts),
            Err(e) => TaskOutcome::Error(e.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub question: String,
    /// URLs exactly as submitted, before normalization
    pub document_urls: Vec<String>,
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        self.state.status()
    }

    pub fn view(&self) -> TaskView {
        TaskView {
            question: self.question.clone(),
            facts: self.state.facts().map(<[String]>::to_vec),
            status: self.status(),
        }
    }
}

#[derive(Default)]
struct StoreInner {
    next_id: TaskId,
    tasks: HashMap<TaskId, Task>,
}

/// In-memory task registry keyed by id.
///
/// Every submission gets its own entry, so concurrent submissions cannot
/// overwrite each other's results. All reads and writes go through one mutex;
/// no lock is held across an await point.
#[derive(Default)]
pub struct TaskStore {
    inner: Mutex<StoreInner>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new task in `Processing` and return its handle.
    pub fn create(&self, question: impl Into<String>, document_urls: Vec<String>) -> TaskHandle {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;

        inner.tasks.insert(
            id,
            Task {
                id,
                question: question.into(),
                document_urls,
                state: TaskState::Processing,
                created_at: Utc::now(),
                completed_at: None,
            },
        );

        TaskHandle(id)
    }

    /// Snapshot of a task for a polling client.
    pub fn get(&self, handle: TaskHandle) -> Result<TaskView> {
        self.with_task(handle, Task::view)
    }

    /// Full copy of the task record, including the internal failure reason.
    pub fn task(&self, handle: TaskHandle) -> Result<Task> {
        self.with_task(handle, Task::clone)
    }

    fn with_task<T>(&self, handle: TaskHandle, f: impl FnOnce(&Task) -> T) -> Result<T> {
        self.inner
            .lock()
            .tasks
            .get(&handle.0)
            .map(f)
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", handle)))
    }

    /// Move a task to its terminal state. Only the first completion wins.
    pub fn complete(&self, handle: TaskHandle, outcome: TaskOutcome) -> Result<TaskStatus> {
        let mut inner = self.inner.lock();
        let task = inner
            .tasks
            .get_mut(&handle.0)
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", handle)))?;

        if task.status().is_terminal() {
            return Err(AppError::Internal(format!(
                "Task {} already finished with status {}",
                handle,
                task.status()
            )));
        }

        task.state = match outcome {
            TaskOutcome::Done(facts) => TaskState::Done { facts },
            TaskOutcome::Error(reason) => TaskState::Error { reason },
        };
        task.completed_at = Some(Utc::now());

        Ok(task.status())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
