//! Notification routing.
//!
//! The [`NotificationRouter`] subscribes to the event bus, persists
//! notification rows for follow activity, and pushes refresh frames to the
//! WebSocket connections of affected users.

pub mod router;

pub use router::{plan_delivery, Delivery, NotificationRouter};
