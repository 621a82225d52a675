//! Task and subtask calls, including the trash (soft delete, restore,
//! permanent delete).
//!
//! Task bodies stay as JSON: the backend owns their shape. Every successful
//! mutation publishes on the [`TaskCoordinator`]; creation publishes
//! `task-created` then `tasks-refresh`, everything else only `tasks-refresh`.

use std::sync::Arc;

use serde_json::{json, Value};
use taskflow_core::{ClientError, Result};
use taskflow_events::{NotificationCoordinator, TaskCoordinator};
use tracing::{info, warn};
use urlencoding::encode;

use crate::client::ApiClient;

/// Which collection a trash operation targets. The two share semantics but
/// not route names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Task,
    Subtask,
}

impl ItemKind {
    pub fn noun(self) -> &'static str {
        match self {
            ItemKind::Task => "task",
            ItemKind::Subtask => "subtask",
        }
    }

    fn soft_delete_path(self, id: &str) -> String {
        let id = encode(id);
        match self {
            ItemKind::Task => format!("/api/tasks/{id}/delete"),
            ItemKind::Subtask => format!("/api/subtasks/{id}/delete"),
        }
    }

    fn deleted_list_path(self) -> &'static str {
        match self {
            ItemKind::Task => "/api/tasks/deleted",
            ItemKind::Subtask => "/api/subtasks/deleted-new",
        }
    }

    fn restore_path(self, id: &str) -> String {
        let id = encode(id);
        match self {
            ItemKind::Task => format!("/api/tasks/{id}/restore"),
            ItemKind::Subtask => format!("/api/subtasks/{id}/restore-new"),
        }
    }

    fn permanent_delete_path(self, id: &str) -> String {
        let id = encode(id);
        match self {
            ItemKind::Task => format!("/api/tasks/{id}"),
            ItemKind::Subtask => format!("/api/subtasks/{id}/permanent-new"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskApi {
    client: ApiClient,
    events: Arc<TaskCoordinator>,
    notifications: Option<Arc<NotificationCoordinator>>,
}

impl TaskApi {
    pub fn new(client: ApiClient, events: Arc<TaskCoordinator>) -> Self {
        Self { client, events, notifications: None }
    }

    /// Also ask notification views to reload after a task is created, since
    /// assignment may have produced notifications.
    pub fn with_notifications(mut self, notifications: Arc<NotificationCoordinator>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn events(&self) -> &Arc<TaskCoordinator> {
        &self.events
    }

    pub async fn create(&self, task: &Value) -> Result<Value> {
        let created = self.client.post("/api/tasks", task, "create task").await?;
        info!(task_id = ?created.get("id"), "Task created");
        self.events.trigger_task_created(&created);
        if let Some(notifications) = &self.notifications {
            if let Err(e) = notifications.trigger_refresh() {
                warn!(error = %e, "Notification refresh after task creation failed");
            }
        }
        Ok(created)
    }

    pub async fn get(&self, task_id: &str) -> Result<Value> {
        self.client.get(&format!("/api/tasks/{}", encode(task_id)), "fetch task").await
    }

    /// All tasks, or the ones visible to `user_id`.
    pub async fn list(&self, user_id: Option<&str>) -> Result<Value> {
        match user_id {
            Some(user_id) => {
                self.client
                    .get_with_query("/api/tasks", &[("userId", user_id)], "fetch tasks")
                    .await
            }
            None => self.client.get("/api/tasks", "fetch tasks").await,
        }
    }

    pub async fn list_by_project(&self, project_id: &str) -> Result<Value> {
        self.client
            .get(&format!("/api/projects/{}/tasks", encode(project_id)), "fetch project tasks")
            .await
    }

    pub async fn update(&self, task_id: &str, changes: &Value) -> Result<Value> {
        let updated = self
            .client
            .put(&format!("/api/tasks/{}", encode(task_id)), changes, "update task")
            .await?;
        self.events.trigger_tasks_refresh(&updated);
        Ok(updated)
    }

    pub fn trash(&self, kind: ItemKind) -> Trash<'_> {
        Trash { api: self, kind }
    }
}

/// Trash operations for one [`ItemKind`].
#[derive(Debug, Clone, Copy)]
pub struct Trash<'a> {
    api: &'a TaskApi,
    kind: ItemKind,
}

impl Trash<'_> {
    /// Move an item to the trash. The backend only lets its owner do this,
    /// so the acting user travels in the body.
    pub async fn soft_delete(&self, id: &str, acting_user_id: &str) -> Result<Value> {
        let noun = self.kind.noun();
        let body = self
            .api
            .client
            .put(
                &self.kind.soft_delete_path(id),
                &json!({ "userId": acting_user_id }),
                &format!("delete {noun}"),
            )
            .await?;
        info!(kind = noun, id, "Moved to trash");
        self.api.events.trigger_tasks_refresh(&body);
        Ok(body)
    }

    pub async fn deleted(&self, user_id: &str) -> Result<Vec<Value>> {
        let noun = self.kind.noun();
        let body = self
            .api
            .client
            .get_with_query(
                self.kind.deleted_list_path(),
                &[("userId", user_id)],
                &format!("fetch deleted {noun}s"),
            )
            .await?;
        match body {
            Value::Array(items) => Ok(items),
            Value::Object(mut map) => match map.remove(&format!("{noun}s")) {
                Some(Value::Array(items)) => Ok(items),
                _ => Ok(Vec::new()),
            },
            _ => Ok(Vec::new()),
        }
    }

    pub async fn restore(&self, id: &str) -> Result<Value> {
        let noun = self.kind.noun();
        let body = self
            .api
            .client
            .put_empty(&self.kind.restore_path(id), &format!("restore {noun}"))
            .await?;
        info!(kind = noun, id, "Restored from trash");
        self.api.events.trigger_tasks_refresh(&body);
        Ok(body)
    }

    /// Permanently delete an item that is already in `user_id`'s trash.
    /// Anything else is refused locally with `NotFound`.
    pub async fn purge(&self, id: &str, user_id: &str) -> Result<Value> {
        let noun = self.kind.noun();
        let in_trash = self
            .deleted(user_id)
            .await?
            .iter()
            .any(|item| item.get("id").and_then(Value::as_str) == Some(id));
        if !in_trash {
            return Err(ClientError::NotFound(format!("{noun} {id} is not in the trash")));
        }
        let body = self
            .api
            .client
            .delete(&self.kind.permanent_delete_path(id), &format!("permanently delete {noun}"))
            .await?;
        info!(kind = noun, id, "Permanently deleted");
        self.api.events.trigger_tasks_refresh(&body);
        Ok(body)
    }
}

#[derive(Debug, Clone)]
pub struct SubtaskApi {
    client: ApiClient,
    events: Arc<TaskCoordinator>,
}

impl SubtaskApi {
    pub fn new(client: ApiClient, events: Arc<TaskCoordinator>) -> Self {
        Self { client, events }
    }

    pub async fn create(&self, subtask: &Value) -> Result<Value> {
        let created = self.client.post("/api/subtasks", subtask, "create subtask").await?;
        self.events.trigger_tasks_refresh(&created);
        Ok(created)
    }

    pub async fn get(&self, subtask_id: &str) -> Result<Value> {
        self.client
            .get(&format!("/api/subtasks/{}", encode(subtask_id)), "fetch subtask")
            .await
    }

    pub async fn update(&self, subtask_id: &str, changes: &Value) -> Result<Value> {
        let updated = self
            .client
            .put(&format!("/api/subtasks/{}", encode(subtask_id)), changes, "update subtask")
            .await?;
        self.events.trigger_tasks_refresh(&updated);
        Ok(updated)
    }

    pub async fn list_for_task(&self, task_id: &str) -> Result<Value> {
        self.client
            .get(&format!("/api/tasks/{}/subtasks", encode(task_id)), "fetch subtasks")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::time::Duration;
    use taskflow_events::{NotificationEvent, TaskEvent};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(server.base_url(), Duration::from_secs(5)).unwrap()
    }

    fn api(server: &MockServer) -> TaskApi {
        TaskApi::new(client(server), Arc::new(TaskCoordinator::new()))
    }

    fn record(events: &TaskCoordinator, event: TaskEvent, log: &Arc<Mutex<Vec<String>>>) {
        let log = Arc::clone(log);
        events.on(event, move |_| {
            log.lock().unwrap().push(event.as_str().to_string());
            Ok(())
        });
    }

    #[tokio::test]
    async fn create_publishes_created_then_refresh() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/tasks")
                    .json_body(json!({"task_name": "Report", "start_date": "2025-01-06"}));
                then.status(201).json_body(json!({"id": "t-1", "task_name": "Report"}));
            })
            .await;

        let notifications = Arc::new(NotificationCoordinator::new());
        let refreshed = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&refreshed);
        notifications.on(NotificationEvent::Refresh, move |_| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });

        let api = api(&server).with_notifications(notifications);
        let log = Arc::new(Mutex::new(Vec::new()));
        record(api.events(), TaskEvent::TaskCreated, &log);
        record(api.events(), TaskEvent::TasksRefresh, &log);

        let task = api
            .create(&json!({"task_name": "Report", "start_date": "2025-01-06"}))
            .await
            .unwrap();
        assert_eq!(task["id"], "t-1");
        assert_eq!(*log.lock().unwrap(), vec!["task-created", "tasks-refresh"]);
        assert_eq!(*refreshed.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_create_publishes_nothing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/tasks");
                then.status(400).json_body(json!({"error": "Required field missing: task_name"}));
            })
            .await;

        let api = api(&server);
        let log = Arc::new(Mutex::new(Vec::new()));
        record(api.events(), TaskEvent::TaskCreated, &log);
        record(api.events(), TaskEvent::TasksRefresh, &log);

        let err = api.create(&json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "Required field missing: task_name");
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_survives_a_failing_task_subscriber() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/tasks");
                then.status(201).json_body(json!({"id": "t-2"}));
            })
            .await;

        let api = api(&server);
        api.events().on(TaskEvent::TaskCreated, |_| anyhow::bail!("stale view"));
        let log = Arc::new(Mutex::new(Vec::new()));
        record(api.events(), TaskEvent::TasksRefresh, &log);

        assert!(api.create(&json!({"task_name": "x", "start_date": "2025-01-06"})).await.is_ok());
        assert_eq!(*log.lock().unwrap(), vec!["tasks-refresh"]);
    }

    #[tokio::test]
    async fn list_filters_by_user() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tasks").query_param("userId", "u-1");
                then.status(200).json_body(json!([{"id": "t-1"}]));
            })
            .await;

        let tasks = api(&server).list(Some("u-1")).await.unwrap();
        mock.assert_async().await;
        assert_eq!(tasks, json!([{"id": "t-1"}]));
    }

    #[tokio::test]
    async fn update_publishes_refresh_only() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/tasks/t-1").json_body(json!({"task_status": "Completed"}));
                then.status(200).json_body(json!({"id": "t-1", "task_status": "Completed"}));
            })
            .await;

        let api = api(&server);
        let log = Arc::new(Mutex::new(Vec::new()));
        record(api.events(), TaskEvent::TaskCreated, &log);
        record(api.events(), TaskEvent::TasksRefresh, &log);

        api.update("t-1", &json!({"task_status": "Completed"})).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["tasks-refresh"]);
    }

    #[tokio::test]
    async fn soft_delete_sends_acting_user() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/tasks/t-1/delete").json_body(json!({"userId": "u-1"}));
                then.status(200).json_body(json!({"message": "Task moved to deleted items"}));
            })
            .await;

        api(&server).trash(ItemKind::Task).soft_delete("t-1", "u-1").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_owner_soft_delete_is_forbidden() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/subtasks/s-1/delete");
                then.status(403)
                    .json_body(json!({"error": "Only the subtask owner can delete this subtask"}));
            })
            .await;

        let err = api(&server)
            .trash(ItemKind::Subtask)
            .soft_delete("s-1", "u-2")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Authorization(_)));
    }

    #[tokio::test]
    async fn deleted_list_uses_kind_specific_route() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/subtasks/deleted-new").query_param("userId", "u-1");
                then.status(200).json_body(json!([{"id": "s-1", "is_deleted": true}]));
            })
            .await;

        let items = api(&server).trash(ItemKind::Subtask).deleted("u-1").await.unwrap();
        mock.assert_async().await;
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn purge_requires_item_in_trash() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tasks/deleted");
                then.status(200).json_body(json!({"tasks": [{"id": "t-9"}]}));
            })
            .await;
        let purge = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/tasks/t-1");
                then.status(200);
            })
            .await;

        let err = api(&server).trash(ItemKind::Task).purge("t-1", "u-1").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
        purge.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn task_purge_hard_deletes_the_task_resource() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tasks/deleted").query_param("userId", "u-1");
                then.status(200).json_body(json!({"tasks": [{"id": "t-1"}]}));
            })
            .await;
        let purge = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/tasks/t-1");
                then.status(200).json_body(json!({"message": "Task deleted successfully"}));
            })
            .await;

        let body = api(&server).trash(ItemKind::Task).purge("t-1", "u-1").await.unwrap();
        purge.assert_async().await;
        assert_eq!(body["message"], "Task deleted successfully");
    }

    #[tokio::test]
    async fn ids_are_escaped_in_paths() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/tasks/a%2Fb/subtasks");
                then.status(200).json_body(json!([]));
            })
            .await;

        let events = Arc::new(TaskCoordinator::new());
        let subtasks = SubtaskApi::new(client(&server), events);
        assert_eq!(subtasks.list_for_task("a/b").await.unwrap(), json!([]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn purge_and_restore_publish_refresh() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/subtasks/deleted-new");
                then.status(200).json_body(json!([{"id": "s-1"}]));
            })
            .await;
        let purge = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/subtasks/s-1/permanent-new");
                then.status(200).json_body(json!({"message": "Subtask permanently deleted"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/subtasks/s-2/restore-new");
                then.status(200).json_body(json!({"message": "Subtask restored successfully"}));
            })
            .await;

        let api = api(&server);
        let log = Arc::new(Mutex::new(Vec::new()));
        record(api.events(), TaskEvent::TasksRefresh, &log);

        let trash = api.trash(ItemKind::Subtask);
        trash.purge("s-1", "u-1").await.unwrap();
        trash.restore("s-2").await.unwrap();
        purge.assert_async().await;
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn subtask_update_publishes_refresh() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/subtasks/s-1");
                then.status(200).json_body(json!({"id": "s-1", "status": "Ongoing"}));
            })
            .await;

        let events = Arc::new(TaskCoordinator::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        record(&events, TaskEvent::TasksRefresh, &log);

        let subtasks = SubtaskApi::new(client(&server), events);
        subtasks.update("s-1", &json!({"status": "Ongoing"})).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["tasks-refresh"]);
    }
}
