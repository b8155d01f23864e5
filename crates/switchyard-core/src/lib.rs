//! # Switchyard Core
//!
//! The leaf layer of the Switchyard dispatch framework.
//!
//! This crate holds everything the routing engine needs to know about the
//! outside world, and nothing more:
//!
//! - **Update model**: the already-parsed inbound [`Update`] and its parts
//! - **Request classification**: [`Request::classify`] decides whether an
//!   update is a text command, a callback, or free text, and who sent it
//! - **Messaging channel**: the outbound [`MessagingChannel`] contract plus the
//!   keyboard and markup values it accepts
//! - **Key-value store**: the [`KeyValueStore`] contract and an
//!   [`InMemoryKeyValueStore`] default
//!
//! ```text
//! ┌───────────┐     ┌────────────┐     ┌────────────┐     ┌──────────────────┐
//! │ Transport │────▶│   Update   │────▶│  Request   │────▶│ switchyard-      │
//! │ (adapter) │     │  (parsed)  │     │ (classify) │     │ framework        │
//! └───────────┘     └────────────┘     └────────────┘     └──────────────────┘
//!       ▲                                                          │
//!       └──────────────────── MessagingChannel ◀───────────────────┘
//! ```

pub mod channel;
pub mod error;
pub mod request;
pub mod store;
pub mod update;

pub use channel::{
    BotCommand, BoxedChannel, ByteStream, ChatId, InlineButton, InlineKeyboard, MessageId,
    MessageRef, MessagingChannel, ParseMode, ReplyMarkup, SendOptions,
};
pub use error::{ChannelError, ChannelResult, StoreError, StoreResult};
pub use request::{Request, RequestKind, Unclassifiable};
pub use store::{BoxedStore, InMemoryKeyValueStore, KeyValueStore};
pub use update::{CallbackQuery, Chat, InlineQuery, Message, Update, User};
