//! Domain logic for the MINERUCA gourmet log.
//!
//! This crate has no IO dependencies: it holds the restaurant model, the
//! filter/sort/derive pipeline that produces rendered favorites lists, the
//! search-with-fallback state machine, the optimistic view session, and the
//! small validators shared by the repository and API layers.

pub mod chat;
pub mod error;
pub mod filter;
pub mod follow;
pub mod notification;
pub mod paging;
pub mod pipeline;
pub mod prefecture;
pub mod restaurant;
pub mod roles;
pub mod search;
pub mod share;
pub mod sort;
pub mod types;
pub mod view;
