//! Restaurant chat: message types, history trimming and prompt context.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::restaurant::Restaurant;
use crate::types::DbId;

pub const MAX_MESSAGE_LENGTH: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// Favorite the conversation is about, if any.
    pub restaurant_id: Option<DbId>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err(CoreError::Validation("Message must not be empty".to_string()));
        }
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Message exceeds maximum length of {MAX_MESSAGE_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

/// Keep at most `limit` of the most recent messages.
///
/// The kept window never starts with a model turn, since the conversation
/// sent upstream must open with the user.
pub fn trim_history(history: &[ChatMessage], limit: usize) -> Vec<ChatMessage> {
    let start = history.len().saturating_sub(limit);
    history[start..]
        .iter()
        .skip_while(|m| m.role == ChatRole::Model)
        .filter(|m| !m.content.trim().is_empty())
        .cloned()
        .collect()
}

/// Plain-text description of a favorite, prepended to the conversation.
pub fn restaurant_context(restaurant: &Restaurant) -> String {
    let mut lines = vec![
        format!("店名: {}", restaurant.name),
        format!("住所: {}", restaurant.address),
    ];
    if !restaurant.hours.is_empty() {
        lines.push(format!("営業時間: {}", restaurant.hours));
    }
    if !restaurant.genres.is_empty() {
        lines.push(format!("ジャンル: {}", restaurant.genres.join(", ")));
    }
    if let Some(price) = &restaurant.price_range {
        let fmt = |v: Option<i32>| v.map(|n| n.to_string()).unwrap_or_default();
        lines.push(format!("予算: {}～{}円", fmt(price.min), fmt(price.max)));
    }
    if !restaurant.comment.is_empty() {
        lines.push(format!("メモ: {}", restaurant.comment));
    }
    lines.join("\n")
}
