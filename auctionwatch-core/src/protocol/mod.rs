// Wire protocol module
// JSON text frames exchanged with the auction tracker backend

pub mod messages;

// Re-export key types
pub use messages::{
    decode_frame, encode_frame, Intent, Money, NotificationItem, NotificationKind,
    PriceNotification, Rarity, ServerAction, ServerMessage, WatchedItem,
};
