//! Server settings: listener, content store location, webhooks.

mod loader;
mod types;

pub use loader::SettingsError;
pub use types::{LeadSettings, NotifySettings, ServerSettings, Settings, StoreSettings};
