//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Conversation roles understood by the reasoning service.
///
/// The system prompt travels separately from the message history, so only
/// user and assistant turns appear in [`Message`](crate::Message).
///
/// # Examples
///
/// ```
/// use lexicut_core::Role;
///
/// assert_eq!(format!("{}", Role::User), "user");
/// assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Messages from the editor (or tool results fed back)
    #[display("user")]
    User,
    /// Messages from the reasoning service
    #[display("assistant")]
    Assistant,
}
