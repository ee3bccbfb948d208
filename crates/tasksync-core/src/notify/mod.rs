//! Outbound webhooks: task mutation notifications and the chat relay.

pub mod chat;
pub mod dedup;
pub mod dispatcher;
pub mod endpoint;
pub mod event;

pub use chat::{ChatError, ChatRelay};
pub use dedup::DedupCache;
pub use dispatcher::{DispatchOutcome, NotificationDispatcher};
pub use endpoint::{validate_endpoint, EndpointError};
pub use event::{NotificationEvent, WebhookPayload};
