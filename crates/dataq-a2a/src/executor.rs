//! Task execution.
//!
//! Bridges A2A tasks to the dispatcher: `message/send` extracts the question
//! text, runs it through the pipeline, and records the outcome as a task in
//! the store. Failures become failed tasks carrying the pipeline stage, not
//! transport errors.

use crate::types::{Artifact, Message, Part, Task, TaskState, TaskStatus};
use dataq_agents::{Dispatcher, QueryRequest};
use dataq_core::Error;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Completed and failed tasks, retrievable via `tasks/get`.
#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<String, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, task: Task) {
        self.tasks.write().await.insert(task.id.clone(), task);
    }

    pub async fn get(&self, id: &str) -> Option<Task> {
        self.tasks.read().await.get(id).cloned()
    }
}

pub struct TaskExecutor {
    dispatcher: Arc<Dispatcher>,
    store: InMemoryTaskStore,
}

impl TaskExecutor {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            store: InMemoryTaskStore::new(),
        }
    }

    /// Handle `message/send`: run the question and return the finished task.
    pub async fn send_message(&self, message: &Message) -> Task {
        let task_id = Uuid::new_v4().to_string();
        let context_id = message
            .context_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut task = Task::new(task_id, context_id);

        let question = message.text();
        if question.trim().is_empty() {
            task.status = TaskStatus {
                state: TaskState::Failed,
                message: Some(Message::agent_text("No question text in message")),
            };
            self.store.insert(task.clone()).await;
            return task;
        }

        task.status.state = TaskState::Working;
        info!(task = %task.id, "Executing A2A task");

        match self.dispatcher.handle(QueryRequest::new(question)).await {
            Ok(response) => {
                task.artifacts.push(Artifact {
                    artifact_id: Uuid::new_v4().to_string(),
                    name: Some("query_result".to_string()),
                    parts: vec![Part::text(response.answer)],
                });
                task.status = TaskStatus {
                    state: TaskState::Completed,
                    message: None,
                };
            }
            Err(e) => {
                warn!(task = %task.id, stage = %e.stage(), error = %e, "A2A task failed");
                task.status = TaskStatus {
                    state: TaskState::Failed,
                    message: Some(Message::agent_text(describe_failure(&e))),
                };
            }
        }

        self.store.insert(task.clone()).await;
        task
    }

    /// Handle `tasks/get`.
    pub async fn get_task(&self, id: &str) -> Option<Task> {
        self.store.get(id).await
    }
}

fn describe_failure(error: &Error) -> String {
    format!("Request failed at stage {}: {}", error.stage(), error)
}
