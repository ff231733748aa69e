//! Interaction wire types
//!
//! Discord posts every interaction to one endpoint with a numeric `type`
//! discriminator. Bodies are decoded at the boundary into [`InteractionEvent`],
//! a closed set of cases:
//!
//! - `1` ping → [`InteractionEvent::Ping`]
//! - `2` application command → [`InteractionEvent::Command`]
//! - anything else → [`InteractionEvent::Other`]
//!
//! Bodies without a numeric `type`, and commands missing the fields delivery
//! depends on, are rejected instead of being acknowledged blindly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::error::ApiError;
use crate::worker::{DeliveryJob, Sender};

pub const INTERACTION_PING: u64 = 1;
pub const INTERACTION_APPLICATION_COMMAND: u64 = 2;

pub const RESPONSE_PONG: u8 = 1;
pub const RESPONSE_DEFERRED_CHANNEL_MESSAGE: u8 = 5;

/// Command option carrying the free-text gallery links
pub const URLS_OPTION: &str = "urls";

const AVATAR_CDN: &str = "https://cdn.discordapp.com/avatars";

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    Ping,
    Command(CommandInteraction),
    Other(u64),
}

impl InteractionEvent {
    pub fn from_slice(body: &[u8]) -> Result<Self, ApiError> {
        let payload: Value = serde_json::from_slice(body)?;

        let kind = payload
            .get("type")
            .and_then(Value::as_u64)
            .ok_or_else(|| ApiError::InvalidPayload("missing numeric 'type'".to_string()))?;

        match kind {
            INTERACTION_PING => Ok(InteractionEvent::Ping),
            INTERACTION_APPLICATION_COMMAND => {
                Ok(InteractionEvent::Command(serde_json::from_value(payload)?))
            }
            other => Ok(InteractionEvent::Other(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandInteraction {
    pub application_id: String,
    pub token: String,
    pub channel_id: String,
    /// Present for guild invocations
    #[serde(default)]
    pub member: Option<Member>,
    /// Present for DM invocations
    #[serde(default)]
    pub user: Option<User>,
    pub data: CommandData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

impl CommandInteraction {
    fn invoking_user(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|member| member.user.as_ref())
            .or(self.user.as_ref())
    }

    /// Guild nickname, falling back to the account name
    pub fn sender(&self) -> Sender {
        let nick = self
            .member
            .as_ref()
            .and_then(|member| member.nick.as_deref())
            .filter(|nick| !nick.is_empty());

        let user = self.invoking_user();
        let name = nick
            .or(user.map(|user| user.username.as_str()))
            .map(str::to_string);

        let avatar_url = user.and_then(|user| {
            user.avatar
                .as_ref()
                .map(|avatar| format!("{AVATAR_CDN}/{}/{avatar}.png", user.id))
        });

        Sender { name, avatar_url }
    }

    /// String value of option `name`
    pub fn option(&self, name: &str) -> Option<&str> {
        self.data
            .options
            .iter()
            .find(|option| option.name == name)
            .and_then(|option| option.value.as_ref())
            .and_then(Value::as_str)
    }

    /// Snapshot handed to the background worker
    pub fn delivery_job(&self) -> DeliveryJob {
        DeliveryJob {
            application_id: self.application_id.clone(),
            token: self.token.clone(),
            channel_id: self.channel_id.clone(),
            sender: self.sender(),
            arguments: self.option(URLS_OPTION).unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: RESPONSE_PONG,
        }
    }

    pub fn deferred() -> Self {
        Self {
            kind: RESPONSE_DEFERRED_CHANNEL_MESSAGE,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub deliveries: crate::observability::MetricsSnapshot,
    pub version: String,
}
