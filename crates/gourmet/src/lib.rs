//! HTTP clients for the external gourmet services.
//!
//! - [`HotpepperClient`]: primary structured restaurant search.
//! - [`GeminiClient`]: grounded web-search fallback and restaurant chat.
//! - [`GoogleGeocoder`]: address to coordinates.
//!
//! The two search clients implement
//! [`RestaurantSearchProvider`](mineruca_core::search::RestaurantSearchProvider)
//! so the search orchestrator can drive them.

pub mod config;
pub mod error;
pub mod gemini;
pub mod geocoding;
pub mod hotpepper;

pub use config::GourmetConfig;
pub use error::GourmetError;
pub use gemini::GeminiClient;
pub use geocoding::GoogleGeocoder;
pub use hotpepper::HotpepperClient;
