//! Request options and decoded result types.

use serde::{Deserialize, Serialize};

/// An inbox as reported by the service.
///
/// Every field is optional; fields the server omitted are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inbox {
    /// Unique inbox ID, e.g. `abc@agentmail.to`.
    pub inbox_id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Full email address.
    pub email_address: Option<String>,
    /// ISO 8601 creation timestamp.
    pub created_at: Option<String>,
    /// Free-form metadata as flat JSON text.
    pub metadata: Option<String>,
}

/// An email message belonging to an inbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID.
    pub message_id: Option<String>,
    /// Thread the message belongs to.
    pub thread_id: Option<String>,
    /// Sender address.
    pub from: Option<String>,
    /// Recipient address.
    pub to: Option<String>,
    /// Subject line.
    pub subject: Option<String>,
    /// Plain-text body.
    pub body_text: Option<String>,
    /// HTML body.
    pub body_html: Option<String>,
    /// ISO 8601 timestamp.
    pub timestamp: Option<String>,
    /// Read status.
    pub is_read: bool,
    /// Attachment references (URLs or attachment IDs).
    pub attachments: Vec<String>,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// Cursor for the next page; `None` when there are no more.
    pub next_cursor: Option<String>,
    /// Total count, only when the server reports one.
    pub total: Option<u64>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            total: None,
        }
    }
}

impl<T> Page<T> {
    /// Whether another page can be requested with [`Page::next_cursor`].
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when the page holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// A page of inboxes.
pub type InboxList = Page<Inbox>;

/// A page of messages.
pub type MessageList = Page<Message>;

/// Options for creating or updating an inbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboxOptions {
    /// Display name.
    pub name: Option<String>,
    /// Metadata as JSON text, sent as a nested object. Dropped if it does not parse.
    pub metadata: Option<String>,
}

impl InboxOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set metadata from JSON text.
    pub fn metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }
}

/// Options for sending a message or a reply.
///
/// `from` and `to` are required by [`Client::send`](crate::Client::send);
/// a reply only needs the body fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Sender inbox ID.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: Option<String>,
    /// Plain-text body.
    pub body_text: Option<String>,
    /// HTML body.
    pub body_html: Option<String>,
    /// Thread to send into.
    pub thread_id: Option<String>,
    /// Reply-to address.
    pub reply_to: Option<String>,
    /// CC recipients.
    pub cc: Vec<String>,
    /// BCC recipients.
    pub bcc: Vec<String>,
}

impl SendOptions {
    /// Start a message from `from` to `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Self::default()
        }
    }

    /// Set the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the plain-text body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body_text = Some(body.into());
        self
    }

    /// Set the HTML body.
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.body_html = Some(body.into());
        self
    }

    /// Send into an existing thread.
    pub fn thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// Set the reply-to address.
    pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Add a CC recipient.
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Add a BCC recipient.
    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }
}

/// Filters and pagination for [`Client::list_messages`](crate::Client::list_messages).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQuery {
    /// Page size; `None` or zero means 20.
    pub limit: Option<u32>,
    /// Cursor from a previous page.
    pub cursor: Option<String>,
    /// Only return unread messages.
    pub unread_only: bool,
    /// Only return messages in this thread.
    pub thread_id: Option<String>,
}

impl MessageQuery {
    /// Default query: first page, 20 messages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Continue from a cursor.
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Restrict to unread messages.
    pub fn unread_only(mut self, unread_only: bool) -> Self {
        self.unread_only = unread_only;
        self
    }

    /// Restrict to one thread.
    pub fn thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }
}

/// Identifiers the server returns after a send or reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    /// ID of the new message.
    pub message_id: Option<String>,
    /// Thread the message landed in.
    pub thread_id: Option<String>,
}

/// Raw MIME content of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMessage {
    /// Bytes as received.
    pub content: Vec<u8>,
    /// Set when the body hit the response size limit and was cut short.
    pub truncated: bool,
}

impl RawMessage {
    /// Content size in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// `true` when no content was returned.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Content as UTF-8 text, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}
