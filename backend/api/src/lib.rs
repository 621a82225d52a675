//! `taskflow-api`: backend client for the task management service.
//!
//! Provides:
//! - `ApiClient`: JSON over HTTP with backend errors mapped onto `ClientError`
//! - Per-area APIs (auth, dashboard, notifications, tasks, projects)
//! - Post-success event publication through the task and notification coordinators
//! - Attachment validation and naming

pub mod auth;
pub mod client;
pub mod dashboard;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod uploads;

pub use auth::{AuthApi, Registration};
pub use client::ApiClient;
pub use dashboard::DashboardApi;
pub use notifications::{Notification, NotificationApi};
pub use projects::ProjectApi;
pub use tasks::{ItemKind, SubtaskApi, TaskApi, Trash};
pub use uploads::{
    format_file_size, plan_attachment, sanitize_file_name, storage_file_name, validate_upload,
    Attachment, AttachmentOwner, UploadCandidate,
};

use std::sync::Arc;

use taskflow_config::ClientConfig;
use taskflow_core::Result;
use taskflow_events::{NotificationCoordinator, TaskCoordinator};

/// Every API sharing one HTTP client and one pair of coordinators.
#[derive(Debug, Clone)]
pub struct Backend {
    pub auth: AuthApi,
    pub dashboard: DashboardApi,
    pub notifications: NotificationApi,
    pub tasks: TaskApi,
    pub subtasks: SubtaskApi,
    pub projects: ProjectApi,
}

impl Backend {
    pub fn new(
        client: ApiClient,
        task_events: Arc<TaskCoordinator>,
        notification_events: Arc<NotificationCoordinator>,
    ) -> Self {
        Self {
            auth: AuthApi::new(client.clone()),
            dashboard: DashboardApi::new(client.clone()),
            notifications: NotificationApi::new(client.clone(), Arc::clone(&notification_events)),
            tasks: TaskApi::new(client.clone(), Arc::clone(&task_events))
                .with_notifications(notification_events),
            subtasks: SubtaskApi::new(client.clone(), task_events),
            projects: ProjectApi::new(client),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let backend = Self::new(
            ApiClient::from_config(config)?,
            Arc::new(TaskCoordinator::new()),
            Arc::new(NotificationCoordinator::new()),
        );
        Ok(Self {
            notifications: backend.notifications.with_limit(config.notification_limit),
            ..backend
        })
    }
}
