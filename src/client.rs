//! AgentMail blocking client implementation.

use crate::buffer::{DEFAULT_MAX_RESPONSE_SIZE, ResponseBuffer};
use crate::codec;
use crate::error::{classify, Error};
use crate::transport::HttpTransport;
use crate::{
    Inbox, InboxList, InboxOptions, Message, MessageList, MessageQuery, RawMessage, Result,
    SendOptions, SentMessage,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const DEFAULT_BASE_URL: &str = "https://api.agentmail.to/v0";
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
const DEFAULT_PAGE_LIMIT: u32 = 20;
const USER_AGENT_VALUE: &str = concat!("agentmail-client/", env!("CARGO_PKG_VERSION"));

/// Blocking client for the AgentMail REST API.
///
/// Configuration is fixed once built. The client is `Send + Sync`, so one
/// instance can be shared by reference across threads without locking.
/// Use [`Client::new`] for defaults or [`Client::builder`] for custom settings.
#[derive(Debug)]
pub struct Client {
    transport: HttpTransport,
    timeout: Duration,
    proxy: Option<String>,
    context: Option<Arc<dyn Any + Send + Sync>>,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with default settings and the given API key.
    ///
    /// # Examples
    /// ```no_run
    /// # use agentmail_client::Client;
    /// # fn main() -> Result<(), agentmail_client::Error> {
    /// let client = Client::new("am_live_xxx")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// Base URL every request path is appended to.
    pub fn base_url(&self) -> &str {
        &self.transport.base_url
    }

    /// Timeout applied to each request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether request/response logging is enabled.
    pub fn logging_enabled(&self) -> bool {
        self.transport.logging
    }

    /// Largest response body that is buffered before truncation.
    pub fn max_response_size(&self) -> usize {
        self.transport.max_response_size
    }

    /// Get the proxy URL if one was configured.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// The user context set on the builder, if it has type `T`.
    pub fn context<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.context.as_deref().and_then(|ctx| ctx.downcast_ref::<T>())
    }

    /// Create a new inbox.
    ///
    /// # Examples
    /// ```no_run
    /// # use agentmail_client::{Client, InboxOptions};
    /// # fn main() -> Result<(), agentmail_client::Error> {
    /// let client = Client::new("am_live_xxx")?;
    /// let opts = InboxOptions::new()
    ///     .name("Build Bot")
    ///     .metadata(r#"{"device_id":"abc123"}"#);
    /// let inbox = client.create_inbox(&opts)?;
    /// println!("{:?}", inbox.email_address);
    /// # Ok(())
    /// # }
    /// ```
    pub fn create_inbox(&self, options: &InboxOptions) -> Result<Inbox> {
        let payload = codec::encode_inbox_options(options);
        let inbox = self.fetch(Method::POST, "/inboxes", Some(&payload), codec::decode_inbox)?;

        if self.transport.logging {
            if let Some(id) = &inbox.inbox_id {
                info!(inbox_id = %id, "created inbox");
            }
        }
        Ok(inbox)
    }

    /// Fetch one inbox.
    pub fn get_inbox(&self, inbox_id: &str) -> Result<Inbox> {
        require(inbox_id, "inbox_id")?;
        let path = format!("/inboxes/{inbox_id}");
        self.fetch(Method::GET, &path, None, codec::decode_inbox)
    }

    /// List inboxes, one page at a time.
    ///
    /// `limit` of `None` or zero requests 20 per page. Pass the previous
    /// page's [`next_cursor`](crate::Page::next_cursor) to continue.
    pub fn list_inboxes(&self, limit: Option<u32>, cursor: Option<&str>) -> Result<InboxList> {
        let mut path = format!("/inboxes?limit={}", page_limit(limit));
        if let Some(cursor) = cursor {
            let _ = write!(path, "&cursor={cursor}");
        }
        self.fetch(Method::GET, &path, None, codec::decode_inbox_list)
    }

    /// Change an inbox's name and/or metadata.
    pub fn update_inbox(&self, inbox_id: &str, options: &InboxOptions) -> Result<()> {
        require(inbox_id, "inbox_id")?;
        let payload = codec::encode_inbox_options(options);
        let path = format!("/inboxes/{inbox_id}");
        self.call(Method::PATCH, &path, Some(&payload))?;

        if self.transport.logging {
            info!(inbox_id, "updated inbox");
        }
        Ok(())
    }

    /// Permanently delete an inbox and all its messages.
    pub fn delete_inbox(&self, inbox_id: &str) -> Result<()> {
        require(inbox_id, "inbox_id")?;
        let path = format!("/inboxes/{inbox_id}");
        self.call(Method::DELETE, &path, None)?;

        if self.transport.logging {
            info!(inbox_id, "deleted inbox");
        }
        Ok(())
    }

    /// Send a message from the inbox named in `options.from`.
    ///
    /// # Examples
    /// ```no_run
    /// # use agentmail_client::{Client, SendOptions};
    /// # fn main() -> Result<(), agentmail_client::Error> {
    /// let client = Client::new("am_live_xxx")?;
    /// let opts = SendOptions::new("bot@agentmail.to", "user@example.com")
    ///     .subject("Hello")
    ///     .text("This is a test message");
    /// let sent = client.send(&opts)?;
    /// println!("{:?}", sent.message_id);
    /// # Ok(())
    /// # }
    /// ```
    pub fn send(&self, options: &SendOptions) -> Result<SentMessage> {
        require(&options.from, "from")?;
        require(&options.to, "to")?;

        let payload = codec::encode_send(options);
        let path = format!("/inboxes/{}/messages/send", options.from);
        let sent = self.fetch(Method::POST, &path, Some(&payload), codec::decode_sent)?;

        if self.transport.logging {
            if let Some(id) = &sent.message_id {
                info!(message_id = %id, "sent message");
            }
        }
        Ok(sent)
    }

    /// Reply to `message_id` from `inbox_id`.
    ///
    /// Threading follows from the path; only `to`, `subject` and the bodies
    /// of `options` are sent.
    pub fn send_reply(
        &self,
        inbox_id: &str,
        message_id: &str,
        options: &SendOptions,
    ) -> Result<SentMessage> {
        require(inbox_id, "inbox_id")?;
        require(message_id, "message_id")?;

        let payload = codec::encode_reply(options);
        let path = format!("/inboxes/{inbox_id}/messages/{message_id}/reply");
        let sent = self.fetch(Method::POST, &path, Some(&payload), codec::decode_sent)?;

        if self.transport.logging {
            if let Some(id) = &sent.message_id {
                info!(message_id = %id, "sent reply");
            }
        }
        Ok(sent)
    }

    /// List messages in an inbox.
    ///
    /// # Examples
    /// ```no_run
    /// # use agentmail_client::{Client, MessageQuery};
    /// # fn main() -> Result<(), agentmail_client::Error> {
    /// let client = Client::new("am_live_xxx")?;
    /// let query = MessageQuery::new().limit(10).unread_only(true);
    /// let page = client.list_messages("bot@agentmail.to", &query)?;
    /// for msg in &page.items {
    ///     println!("{:?}: {:?}", msg.from, msg.subject);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn list_messages(&self, inbox_id: &str, query: &MessageQuery) -> Result<MessageList> {
        require(inbox_id, "inbox_id")?;

        let mut path = format!(
            "/inboxes/{inbox_id}/messages?limit={}",
            page_limit(query.limit)
        );
        if let Some(cursor) = &query.cursor {
            let _ = write!(path, "&cursor={cursor}");
        }
        if query.unread_only {
            path.push_str("&unread=true");
        }
        if let Some(thread_id) = &query.thread_id {
            let _ = write!(path, "&thread_id={thread_id}");
        }

        let messages = self.fetch(Method::GET, &path, None, codec::decode_message_list)?;
        if self.transport.logging {
            info!(inbox_id, count = messages.len(), "retrieved messages");
        }
        Ok(messages)
    }

    /// Fetch one message.
    pub fn get_message(&self, inbox_id: &str, message_id: &str) -> Result<Message> {
        require(inbox_id, "inbox_id")?;
        require(message_id, "message_id")?;
        let path = format!("/inboxes/{inbox_id}/messages/{message_id}");
        self.fetch(Method::GET, &path, None, codec::decode_message)
    }

    /// Set a message's read status.
    pub fn mark_read(&self, inbox_id: &str, message_id: &str, is_read: bool) -> Result<()> {
        require(inbox_id, "inbox_id")?;
        require(message_id, "message_id")?;

        let payload = codec::encode_mark_read(is_read);
        let path = format!("/inboxes/{inbox_id}/messages/{message_id}");
        self.call(Method::PATCH, &path, Some(&payload))?;

        if self.transport.logging {
            let state = if is_read { "read" } else { "unread" };
            info!(message_id, state, "marked message");
        }
        Ok(())
    }

    /// Permanently delete a message.
    pub fn delete_message(&self, inbox_id: &str, message_id: &str) -> Result<()> {
        require(inbox_id, "inbox_id")?;
        require(message_id, "message_id")?;
        let path = format!("/inboxes/{inbox_id}/messages/{message_id}");
        self.call(Method::DELETE, &path, None)?;

        if self.transport.logging {
            info!(message_id, "deleted message");
        }
        Ok(())
    }

    /// Fetch the raw MIME content of a message.
    ///
    /// Bodies larger than the response size limit come back cut short with
    /// [`RawMessage::truncated`] set.
    pub fn get_raw_message(&self, inbox_id: &str, message_id: &str) -> Result<RawMessage> {
        require(inbox_id, "inbox_id")?;
        require(message_id, "message_id")?;
        let path = format!("/inboxes/{inbox_id}/messages/{message_id}/raw");
        let body = self.call(Method::GET, &path, None)?;

        let raw = RawMessage {
            truncated: body.is_truncated(),
            content: body.into_bytes(),
        };
        if self.transport.logging {
            info!(message_id, size = raw.len(), "retrieved raw message");
        }
        Ok(raw)
    }

    /// Perform a request and fail on any non-2xx status.
    fn call(&self, method: Method, path: &str, payload: Option<&Value>) -> Result<ResponseBuffer> {
        let exchange = self.transport.execute(method, path, payload)?;
        classify(exchange.outcome()).map_err(|kind| Error::Status {
            kind,
            status: exchange.status,
        })?;
        Ok(exchange.body)
    }

    /// Perform a request and decode its JSON body.
    fn fetch<T>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
        decode: fn(&[u8]) -> serde_json::Result<T>,
    ) -> Result<T> {
        let body = self.call(method, path, payload)?;
        if body.is_truncated() {
            return Err(Error::ResponseTruncated { limit: body.limit() });
        }
        Ok(decode(body.as_bytes())?)
    }
}

fn require(value: &str, name: &'static str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(name));
    }
    Ok(())
}

fn page_limit(limit: Option<u32>) -> u32 {
    limit.filter(|&n| n > 0).unwrap_or(DEFAULT_PAGE_LIMIT)
}

/// Builder for configuring an AgentMail client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Clone)]
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    enable_logging: bool,
    max_response_size: usize,
    proxy: Option<String>,
    context: Option<Arc<dyn Any + Send + Sync>>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - No API key (required before [`build`](Self::build))
    /// - Base URL `https://api.agentmail.to/v0`
    /// - 10 second timeout
    /// - Logging enabled
    /// - 32 KiB response size limit
    /// - No proxy
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            enable_logging: true,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            proxy: None,
            context: None,
        }
    }

    /// Start from the environment.
    ///
    /// Reads `AGENTMAIL_API_KEY`, `AGENTMAIL_BASE_URL` and
    /// `AGENTMAIL_TIMEOUT_MS`; unset or unparsable values keep the defaults.
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        if let Ok(key) = std::env::var("AGENTMAIL_API_KEY") {
            builder = builder.api_key(key);
        }
        if let Ok(url) = std::env::var("AGENTMAIL_BASE_URL") {
            builder = builder.base_url(url);
        }
        if let Some(ms) = std::env::var("AGENTMAIL_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        builder
    }

    /// Set the API key sent as a bearer token.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API root. Request paths are appended verbatim, so omit
    /// the trailing slash.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout. Zero selects the default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };
        self
    }

    /// Enable or disable request/response logging (default: enabled).
    pub fn enable_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }

    /// Cap on buffered response bodies. Zero selects the default.
    pub fn max_response_size(mut self, bytes: usize) -> Self {
        self.max_response_size = if bytes == 0 {
            DEFAULT_MAX_RESPONSE_SIZE
        } else {
            bytes
        };
        self
    }

    /// Set a proxy URL (e.g., "socks5://127.0.0.1:1080").
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Attach an opaque value that the client carries but never reads.
    pub fn context<T: Any + Send + Sync>(mut self, context: T) -> Self {
        self.context = Some(Arc::new(context));
        self
    }

    /// Build the client.
    ///
    /// Fails with [`Error::InvalidArgument`] when the API key is missing or the
    /// base URL does not parse. No network request is made.
    pub fn build(self) -> Result<Client> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or(Error::InvalidArgument("api_key"))?;
        reqwest::Url::parse(&self.base_url).map_err(|_| Error::InvalidArgument("base_url"))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| Error::InvalidArgument("api_key"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT_VALUE);

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url).map_err(Error::Http)?);
        }

        let http = builder.build().map_err(Error::Http)?;

        if self.enable_logging {
            info!(base_url = %self.base_url, "AgentMail client initialized");
        }

        Ok(Client {
            transport: HttpTransport {
                http,
                headers,
                base_url: self.base_url,
                max_response_size: self.max_response_size,
                logging: self.enable_logging,
            },
            timeout: self.timeout,
            proxy: self.proxy,
            context: self.context,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("enable_logging", &self.enable_logging)
            .field("max_response_size", &self.max_response_size)
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}
