/// Event vocabularies.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskEvent {
    /// A specific task was created. Always followed by [`TaskEvent::TasksRefresh`].
    TaskCreated,
    /// Something about tasks changed; reload whatever you show.
    TasksRefresh,
}

impl TaskEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskEvent::TaskCreated => "task-created",
            TaskEvent::TasksRefresh => "tasks-refresh",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationEvent {
    MarkedRead,
    MarkedAllRead,
    Deleted,
    /// New notifications may exist (after task creation, assignment, deadline checks).
    Refresh,
}

impl NotificationEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationEvent::MarkedRead => "notification-marked-read",
            NotificationEvent::MarkedAllRead => "notifications-marked-all-read",
            NotificationEvent::Deleted => "notification-deleted",
            NotificationEvent::Refresh => "notifications-refresh",
        }
    }
}

impl fmt::Display for TaskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
