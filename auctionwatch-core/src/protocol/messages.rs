// Protocol message types implementation
// Envelope and payload shapes broadcast by the auction tracker backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RealtimeError, RealtimeResult};

/// Decode a raw text frame into an opaque JSON value.
///
/// The connection layer stops here; typed payloads are a consumer concern.
pub fn decode_frame(raw: &str) -> RealtimeResult<Value> {
    serde_json::from_str(raw)
        .map_err(|e| RealtimeError::decode_with_source("Invalid frame payload", e))
}

/// Encode an outbound payload into the wire's text format.
pub fn encode_frame<T: Serialize>(payload: &T) -> RealtimeResult<String> {
    serde_json::to_string(payload)
        .map_err(|e| RealtimeError::encode(format!("Failed to serialize payload: {}", e)))
}

/// Envelope wrapping every frame the backend broadcasts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMessage {
    pub action: ServerAction,

    #[serde(default)]
    pub data: Value,
}

impl ServerMessage {
    /// Interpret an already-decoded frame as a server envelope
    pub fn from_value(value: &Value) -> RealtimeResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| RealtimeError::decode_with_source("Malformed server envelope", e))
    }

    /// Extract the notification payload from a `new_notification` frame
    pub fn notification(&self) -> RealtimeResult<PriceNotification> {
        if self.action != ServerAction::NewNotification {
            return Err(RealtimeError::decode(format!(
                "Frame action {:?} carries no notification",
                self.action
            )));
        }

        serde_json::from_value(self.data.clone())
            .map_err(|e| RealtimeError::decode_with_source("Malformed notification payload", e))
    }
}

/// Actions the backend broadcasts over the socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerAction {
    /// A price alert fired for a watched item
    NewNotification,
    /// A scan finished and fresh market data is available
    NewData,
    #[serde(untagged)]
    Other(String),
}

/// Notification kinds, one per alert rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PriceAboveAlert,
    PriceBelowAlert,
    PriceAboveBestAvgAlert,
    PriceBelowBestAvgAlert,
}

/// An amount split into gold and silver, the way prices render in game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub gold: u32,
    pub silver: u32,
}

/// Item rarity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Poor,
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Artifact,
    Heirloom,
    Token,
}

/// What the user intends to do with a watched item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Sell,
    Buy,
    Both,
}

/// Item descriptor embedded in a notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationItem {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub quality: u8,
    pub rarity: Rarity,
}

/// A price alert broadcast by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceNotification {
    pub id: i64,

    #[serde(rename = "type")]
    pub kind: NotificationKind,

    pub price_diff: Money,

    pub current_price: Money,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_threshold: Option<Money>,

    pub item: NotificationItem,

    #[serde(default)]
    pub read: bool,

    pub created_at: DateTime<Utc>,
}

/// A tradeable item on the user's watch list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedItem {
    pub id: i64,
    pub name: String,
    pub price: Money,
    pub quality: u8,
    pub rarity: Rarity,
    pub image: String,
    pub intent: Intent,

    #[serde(default)]
    pub notify_sell: bool,

    #[serde(default)]
    pub notify_buy: bool,
}
