//! # AgentMail Client
//! Blocking wrapper around the AgentMail REST API: provision inboxes, send mail through them, and page through, mark, fetch, or delete their messages using [`Client`] and [`ClientBuilder`].
//!
//! ## Audience and uses
//! For Rust programs (agents, bots, test rigs, small devices with a network stack) that need real programmable inboxes: configure with [`ClientBuilder`], create an [`Inbox`], send with [`SendOptions`], then poll [`Client::list_messages`] for [`Message`]s.
//!
//! ## Runtime requirements
//! Synchronous. Every call blocks the calling thread until the exchange completes or the configured timeout elapses. HTTP calls use `reqwest::blocking`, so do not call the client from inside an async runtime's worker thread. A [`Client`] is immutable once built and can be shared across threads by reference.
//!
//! ## Out of scope
//! No retries, caching, webhooks, attachment transfer, or threading logic. Every call is one stateless round trip to the service.
//!
//! ## Errors
//! Every operation returns exactly one [`Error`]. [`Error::kind`] collapses it onto the closed [`ErrorKind`] set: missing arguments are [`ErrorKind::InvalidArgument`] (no request is sent), transport failures are [`ErrorKind::Network`] or [`ErrorKind::Timeout`], non-2xx statuses map to [`ErrorKind::Auth`], [`ErrorKind::NotFound`], [`ErrorKind::RateLimit`], [`ErrorKind::Server`] or [`ErrorKind::Other`], and undecodable bodies are [`ErrorKind::Parse`]. Bodies larger than the response size limit report [`ErrorKind::Truncated`]. [`ErrorKind::is_retryable`] tells which are worth retrying with backoff.
//!
//! ## Example
//! ```no_run
//! use agentmail_client::{Client, InboxOptions, MessageQuery, SendOptions};
//!
//! fn main() -> Result<(), agentmail_client::Error> {
//!     let client = Client::new("am_live_xxx")?;
//!     let inbox = client.create_inbox(&InboxOptions::new().name("Build Bot"))?;
//!     let inbox_id = inbox.inbox_id.unwrap_or_default();
//!
//!     let opts = SendOptions::new(inbox_id.as_str(), "user@example.com")
//!         .subject("Hello")
//!         .text("Sent from Rust");
//!     client.send(&opts)?;
//!
//!     let page = client.list_messages(&inbox_id, &MessageQuery::new().unread_only(true))?;
//!     for msg in page {
//!         println!("From: {:?}, Subject: {:?}", msg.from, msg.subject);
//!     }
//!
//!     client.delete_inbox(&inbox_id)?;
//!     Ok(())
//! }
//! ```

mod buffer;
mod client;
mod codec;
mod error;
mod models;
mod transport;

pub use buffer::{DEFAULT_MAX_RESPONSE_SIZE, INITIAL_CAPACITY, ResponseBuffer};
pub use client::{Client, ClientBuilder};
pub use error::{BoxError, Error, ErrorKind, TransportOutcome, classify, classify_status};
pub use models::{
    Inbox, InboxList, InboxOptions, Message, MessageList, MessageQuery, Page, RawMessage,
    SendOptions, SentMessage,
};
pub use reqwest::StatusCode;

/// Result type alias for AgentMail operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
