//! User-visible notifications
//!
//! Every note operation reports its outcome here rather than failing loudly:
//! - `Notification`: a toast carrying a level and a message
//! - `NotificationSink`: the injection seam used by the note collection
//! - `NotificationBus`: broadcast channel for whatever renders the toasts

mod bus;
mod types;

pub use bus::NotificationBus;
pub use types::{Notification, NotificationLevel, NotificationSink};
