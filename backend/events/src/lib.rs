//! Named-event coordinators built on [`taskflow_core::EventBus`].
//!
//! Two independent buses with fixed vocabularies: one for task changes
//! (calendar, dashboards) and one for notification changes (badges, lists).

pub mod names;
pub mod notifications;
pub mod tasks;

pub use names::{NotificationEvent, TaskEvent};
pub use notifications::NotificationCoordinator;
pub use tasks::TaskCoordinator;
