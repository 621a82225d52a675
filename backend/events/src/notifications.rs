/// Notification event coordinator.
///
/// Delivery stops at the first failing subscriber and the failure is handed
/// back to the publisher, unlike the task coordinator.
use serde_json::{Value, json};
use taskflow_core::{Delivery, DeliveryPolicy, EventBus, Result, Subscription};

use crate::names::NotificationEvent;

#[derive(Debug)]
pub struct NotificationCoordinator {
    bus: EventBus,
}

impl Default for NotificationCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCoordinator {
    pub fn new() -> Self {
        Self { bus: EventBus::new("notifications", DeliveryPolicy::FailFast) }
    }

    pub fn on<F>(&self, event: NotificationEvent, callback: F) -> Subscription
    where
        F: Fn(&Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.bus.subscribe(event.as_str(), callback)
    }

    pub fn off(&self, subscription: &Subscription) -> bool {
        self.bus.unsubscribe(subscription)
    }

    pub fn subscriber_count(&self, event: NotificationEvent) -> usize {
        self.bus.subscriber_count(event.as_str())
    }

    pub fn notify_marked_read(&self, notification_id: &str) -> Result<Delivery> {
        self.publish(NotificationEvent::MarkedRead, &json!({ "notificationId": notification_id }))
    }

    pub fn notify_marked_all_read(&self, user_id: &str) -> Result<Delivery> {
        self.publish(NotificationEvent::MarkedAllRead, &json!({ "userId": user_id }))
    }

    pub fn notify_deleted(&self, notification_id: &str) -> Result<Delivery> {
        self.publish(NotificationEvent::Deleted, &json!({ "notificationId": notification_id }))
    }

    /// Ask every notification view to reload. No precondition; safe with no
    /// subscribers.
    pub fn trigger_refresh(&self) -> Result<Delivery> {
        self.publish(NotificationEvent::Refresh, &Value::Null)
    }

    fn publish(&self, event: NotificationEvent, payload: &Value) -> Result<Delivery> {
        self.bus.publish(event.as_str(), payload)
    }
}
