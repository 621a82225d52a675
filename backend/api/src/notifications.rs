//! Notification inbox calls.
//!
//! Mutations publish on the [`NotificationCoordinator`] only after the backend
//! accepted them. Because that coordinator is fail-fast, a failing subscriber
//! turns an otherwise successful call into an error for the caller.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use taskflow_core::{ClientError, Result};
use taskflow_events::NotificationCoordinator;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use urlencoding::encode;

use crate::client::ApiClient;

pub const DEFAULT_LIMIT: u32 = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct NotificationList {
    #[serde(default)]
    notifications: Vec<Notification>,
}

#[derive(Debug, Clone)]
pub struct NotificationApi {
    client: ApiClient,
    events: Arc<NotificationCoordinator>,
    limit: u32,
}

impl NotificationApi {
    pub fn new(client: ApiClient, events: Arc<NotificationCoordinator>) -> Self {
        Self { client, events, limit: DEFAULT_LIMIT }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn events(&self) -> &Arc<NotificationCoordinator> {
        &self.events
    }

    pub async fn list(&self, user_id: &str, unread_only: bool) -> Result<Vec<Notification>> {
        let query = [("unread_only", unread_only.to_string()), ("limit", self.limit.to_string())];
        let path = format!("/api/notifications/{}", encode(user_id));
        let body = self
            .client
            .get_with_query(&path, &query, "fetch notifications")
            .await?;
        let list: NotificationList = serde_json::from_value(body).map_err(|e| {
            ClientError::Application(format!("Failed to fetch notifications: {e}"))
        })?;
        Ok(list.notifications)
    }

    /// Never fails: a backend error counts as zero unread.
    pub async fn unread_count(&self, user_id: &str) -> usize {
        match self.list(user_id, true).await {
            Ok(unread) => unread.len(),
            Err(e) => {
                warn!(user_id, error = %e, "Could not load unread count");
                0
            }
        }
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<Value> {
        let path = format!("/api/notifications/{}/read", encode(notification_id));
        let body = self.client.put_empty(&path, "mark notification as read").await?;
        self.events.notify_marked_read(notification_id)?;
        Ok(body)
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<Value> {
        let path = format!("/api/notifications/user/{}/read-all", encode(user_id));
        let body = self.client.put_empty(&path, "mark all notifications as read").await?;
        self.events.notify_marked_all_read(user_id)?;
        Ok(body)
    }

    pub async fn delete(&self, notification_id: &str) -> Result<Value> {
        let path = format!("/api/notifications/{}", encode(notification_id));
        let body = self.client.delete(&path, "delete notification").await?;
        self.events.notify_deleted(notification_id)?;
        Ok(body)
    }

    /// Ask the backend to generate deadline notifications now.
    pub async fn check_deadlines(&self) -> Result<Value> {
        self.client
            .post_empty("/api/notifications/check-deadlines", "check deadlines")
            .await
    }

    /// Check deadlines, then tell notification views to reload. Failures are
    /// logged and yield `None`; nothing is retried.
    pub async fn check_upcoming_deadlines(&self) -> Option<Value> {
        let result = match self.check_deadlines().await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Deadline check failed");
                return None;
            }
        };
        info!(result = %result, "Deadline check finished");
        if let Err(e) = self.events.trigger_refresh() {
            error!(error = %e, "Notification refresh after deadline check failed");
        }
        Some(result)
    }

    /// Run [`check_upcoming_deadlines`](Self::check_upcoming_deadlines) in the
    /// background. The caller may drop the handle.
    pub fn spawn_deadline_check(&self) -> JoinHandle<Option<Value>> {
        let api = self.clone();
        tokio::spawn(async move { api.check_upcoming_deadlines().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;
    use taskflow_events::NotificationEvent;

    fn api(server: &MockServer) -> NotificationApi {
        let client = ApiClient::new(server.base_url(), Duration::from_secs(5)).unwrap();
        NotificationApi::new(client, Arc::new(NotificationCoordinator::new()))
    }

    fn record(events: &NotificationCoordinator, event: NotificationEvent) -> Arc<Mutex<Vec<Value>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        events.on(event, move |payload| {
            sink.lock().unwrap().push(payload.clone());
            Ok(())
        });
        seen
    }

    #[tokio::test]
    async fn list_passes_filters_and_parses_records() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/notifications/u-1")
                    .query_param("unread_only", "true")
                    .query_param("limit", "20");
                then.status(200).json_body(json!({
                    "notifications": [{
                        "id": "n-1",
                        "user_id": "u-1",
                        "type": "deadline_reminder",
                        "title": "Due tomorrow",
                        "message": "Task 'Report' is due tomorrow",
                        "task_id": "t-1",
                        "read": false,
                        "timestamp": "2025-10-01T09:00:00Z",
                        "due_date": "2025-10-02"
                    }],
                    "count": 1
                }));
            })
            .await;

        let list = api(&server).with_limit(20).list("u-1", true).await.unwrap();
        mock.assert_async().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].kind.as_deref(), Some("deadline_reminder"));
        assert!(!list[0].read);
        assert_eq!(list[0].extra["due_date"], "2025-10-02");
    }

    #[tokio::test]
    async fn unread_count_is_zero_on_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/notifications/u-1");
                then.status(500).json_body(json!({"error": "boom"}));
            })
            .await;

        assert_eq!(api(&server).unread_count("u-1").await, 0);
    }

    #[tokio::test]
    async fn mark_read_publishes_after_success() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/notifications/n-1/read");
                then.status(200).json_body(json!({"message": "Notification marked as read"}));
            })
            .await;

        let api = api(&server);
        let seen = record(api.events(), NotificationEvent::MarkedRead);
        api.mark_read("n-1").await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![json!({"notificationId": "n-1"})]);
    }

    #[tokio::test]
    async fn failed_mark_read_publishes_nothing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/notifications/n-404/read");
                then.status(404).json_body(json!({"error": "Notification not found"}));
            })
            .await;

        let api = api(&server);
        let seen = record(api.events(), NotificationEvent::MarkedRead);
        let err = api.mark_read("n-404").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_all_read_uses_user_route() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/notifications/user/u-1/read-all");
                then.status(200).json_body(json!({"count": 3}));
            })
            .await;

        let api = api(&server);
        let seen = record(api.events(), NotificationEvent::MarkedAllRead);
        assert_eq!(api.mark_all_read("u-1").await.unwrap(), json!({"count": 3}));
        mock.assert_async().await;
        assert_eq!(*seen.lock().unwrap(), vec![json!({"userId": "u-1"})]);
    }

    #[tokio::test]
    async fn failing_subscriber_surfaces_after_delete() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/notifications/n-1");
                then.status(200).json_body(json!({"message": "deleted"}));
            })
            .await;

        let api = api(&server);
        api.events().on(NotificationEvent::Deleted, |_| anyhow::bail!("badge view gone"));
        let err = api.delete("n-1").await.unwrap_err();
        mock.assert_async().await;
        assert!(matches!(err, ClientError::Subscriber { .. }));
    }

    #[tokio::test]
    async fn deadline_check_triggers_refresh() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/notifications/check-deadlines");
                then.status(200).json_body(json!({"notifications_created": 2}));
            })
            .await;

        let api = api(&server);
        let refreshes = record(api.events(), NotificationEvent::Refresh);
        let result = api.spawn_deadline_check().await.unwrap();
        assert_eq!(result, Some(json!({"notifications_created": 2})));
        assert_eq!(refreshes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deadline_check_failure_is_swallowed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/notifications/check-deadlines");
                then.status(500);
            })
            .await;

        let api = api(&server);
        let refreshes = record(api.events(), NotificationEvent::Refresh);
        assert_eq!(api.check_upcoming_deadlines().await, None);
        assert!(refreshes.lock().unwrap().is_empty());
    }
}
