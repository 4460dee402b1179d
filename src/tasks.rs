use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Result, RosterError};
use crate::pipeline::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
}

/// Snapshot returned by the progress endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TaskProgress {
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub started_at: DateTime<Utc>,
    /// Percent complete, 0-100
    pub progress: f64,
    /// Seconds left at the current pace; None until some progress is made
    pub estimated_time: Option<f64>,
    pub output_file: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug)]
struct TaskEntry {
    progress: Arc<Progress>,
    started: Instant,
    started_at: DateTime<Utc>,
    status: TaskStatus,
    output: Option<PathBuf>,
    error: Option<String>,
}

/// `elapsed / progress * (100 - progress)`
pub fn estimate_remaining(elapsed_secs: f64, percent: f64) -> Option<f64> {
    if percent <= 0.0 {
        return None;
    }
    let percent = percent.min(100.0);
    Some(elapsed_secs / percent * (100.0 - percent))
}

/// In-memory registry of background conversion jobs
#[derive(Clone, Default)]
pub struct TaskManager {
    tasks: Arc<RwLock<HashMap<Uuid, TaskEntry>>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new running job; the returned handle is what the pipeline reports into.
    pub async fn start_task(&self) -> (Uuid, Arc<Progress>) {
        let id = Uuid::new_v4();
        let progress = Arc::new(Progress::new());
        self.tasks.write().await.insert(
            id,
            TaskEntry {
                progress: progress.clone(),
                started: Instant::now(),
                started_at: Utc::now(),
                status: TaskStatus::Running,
                output: None,
                error: None,
            },
        );
        info!(task_id = %id, "Task started");
        (id, progress)
    }

    pub async fn complete(&self, id: Uuid, output: PathBuf) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        let entry = tasks
            .get_mut(&id)
            .ok_or_else(|| RosterError::Task(format!("unknown task {}", id)))?;
        entry.status = TaskStatus::Completed;
        entry.output = Some(output);
        info!(task_id = %id, "Task completed");
        Ok(())
    }

    pub async fn fail(&self, id: Uuid, error: String) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        let entry = tasks
            .get_mut(&id)
            .ok_or_else(|| RosterError::Task(format!("unknown task {}", id)))?;
        warn!(task_id = %id, "Task failed: {}", error);
        entry.status = TaskStatus::Failed;
        entry.error = Some(error);
        Ok(())
    }

    pub async fn progress(&self, id: Uuid) -> Option<TaskProgress> {
        let tasks = self.tasks.read().await;
        let entry = tasks.get(&id)?;
        let percent = match entry.status {
            TaskStatus::Completed => 100.0,
            _ => entry.progress.percent(),
        };
        let estimated_time = match entry.status {
            TaskStatus::Running => estimate_remaining(entry.started.elapsed().as_secs_f64(), percent),
            TaskStatus::Completed => Some(0.0),
            TaskStatus::Failed => None,
        };
        Some(TaskProgress {
            task_id: id,
            status: entry.status,
            started_at: entry.started_at,
            progress: percent,
            estimated_time,
            output_file: entry.output.as_ref().map(|p| p.display().to_string()),
            error: entry.error.clone(),
        })
    }

    /// Output file of a completed job
    pub async fn output_path(&self, id: Uuid) -> Option<PathBuf> {
        let tasks = self.tasks.read().await;
        let entry = tasks.get(&id)?;
        match entry.status {
            TaskStatus::Completed => entry.output.clone(),
            _ => None,
        }
    }
}
