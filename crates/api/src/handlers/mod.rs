pub mod admin;
pub mod auth;
pub mod chat;
pub mod follow;
pub mod geocode;
pub mod notification;
pub mod restaurant;
pub mod search;
pub mod share;
pub mod timeline;
pub mod user;
