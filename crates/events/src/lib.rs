//! In-process domain event bus.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`DomainEvent`]: the event envelope.
//! - [`event_types`]: the dot-separated event names handlers publish.

pub mod bus;
pub mod event_types;

pub use bus::{DomainEvent, EventBus};
