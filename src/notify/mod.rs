//! Outbound webhooks: the shared JSON forwarder and the update notifier.

mod dispatcher;
mod forwarder;
mod payload;

pub use dispatcher::NotificationDispatcher;
pub use forwarder::{ForwardError, WebhookForwarder};
pub use payload::{NotificationPayload, ACTION_CONFIG_UPDATE};
