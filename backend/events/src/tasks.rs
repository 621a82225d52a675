/// Task event coordinator.
///
/// Subscribers are isolated from each other: a failing subscriber is logged
/// and the rest still run.
use serde_json::Value;
use taskflow_core::{Delivery, DeliveryPolicy, EventBus, Subscription};
use tracing::error;

use crate::names::TaskEvent;

#[derive(Debug)]
pub struct TaskCoordinator {
    bus: EventBus,
}

impl Default for TaskCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskCoordinator {
    pub fn new() -> Self {
        Self { bus: EventBus::new("tasks", DeliveryPolicy::Isolate) }
    }

    pub fn on<F>(&self, event: TaskEvent, callback: F) -> Subscription
    where
        F: Fn(&Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.bus.subscribe(event.as_str(), callback)
    }

    pub fn off(&self, subscription: &Subscription) -> bool {
        self.bus.unsubscribe(subscription)
    }

    pub fn subscriber_count(&self, event: TaskEvent) -> usize {
        self.bus.subscriber_count(event.as_str())
    }

    /// Publish `task-created`, then `tasks-refresh`, both with `task`.
    pub fn trigger_task_created(&self, task: &Value) -> Delivery {
        let created = self.publish(TaskEvent::TaskCreated, task);
        let refresh = self.publish(TaskEvent::TasksRefresh, task);
        Delivery {
            delivered: created.delivered + refresh.delivered,
            failed: created.failed + refresh.failed,
        }
    }

    /// General refresh. No precondition; safe with no subscribers.
    pub fn trigger_tasks_refresh(&self, payload: &Value) -> Delivery {
        self.publish(TaskEvent::TasksRefresh, payload)
    }

    fn publish(&self, event: TaskEvent, payload: &Value) -> Delivery {
        match self.bus.publish(event.as_str(), payload) {
            Ok(delivery) => delivery,
            // Only reachable if the bus is switched to FailFast.
            Err(e) => {
                error!(event = %event, error = %e, "Task event delivery aborted");
                Delivery::default()
            }
        }
    }
}
