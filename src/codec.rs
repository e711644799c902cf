//! JSON payload encoding and tolerant response decoding.
//!
//! Decoding looks every field up on its own and type-checks it; a missing or
//! mistyped field leaves the result field unset instead of failing the decode.

use crate::models::{Inbox, InboxList, InboxOptions, Message, MessageList, SendOptions, SentMessage};
use serde::de::Error as _;
use serde_json::{Map, Value};

type Object = Map<String, Value>;

pub(crate) fn encode_inbox_options(options: &InboxOptions) -> Value {
    let mut json = Object::new();
    insert_str(&mut json, "name", options.name.as_deref());
    if let Some(metadata) = options
        .metadata
        .as_deref()
        .and_then(|text| serde_json::from_str::<Value>(text).ok())
    {
        json.insert("metadata".into(), metadata);
    }
    Value::Object(json)
}

pub(crate) fn encode_send(options: &SendOptions) -> Value {
    let mut json = Object::new();
    json.insert("from".into(), Value::from(options.from.as_str()));
    json.insert("to".into(), Value::from(options.to.as_str()));
    insert_str(&mut json, "subject", options.subject.as_deref());
    insert_str(&mut json, "body_text", options.body_text.as_deref());
    insert_str(&mut json, "body_html", options.body_html.as_deref());
    insert_str(&mut json, "thread_id", options.thread_id.as_deref());
    insert_str(&mut json, "reply_to", options.reply_to.as_deref());
    insert_list(&mut json, "cc", &options.cc);
    insert_list(&mut json, "bcc", &options.bcc);
    Value::Object(json)
}

pub(crate) fn encode_reply(options: &SendOptions) -> Value {
    let mut json = Object::new();
    insert_str(&mut json, "to", non_empty(&options.to));
    insert_str(&mut json, "subject", options.subject.as_deref());
    insert_str(&mut json, "text", options.body_text.as_deref());
    insert_str(&mut json, "html", options.body_html.as_deref());
    Value::Object(json)
}

pub(crate) fn encode_mark_read(is_read: bool) -> Value {
    let mut json = Object::new();
    json.insert("is_read".into(), Value::Bool(is_read));
    Value::Object(json)
}

pub(crate) fn decode_inbox(body: &[u8]) -> serde_json::Result<Inbox> {
    let value = parse(body)?;
    let object = value
        .as_object()
        .ok_or_else(|| serde_json::Error::custom("expected an inbox object"))?;
    Ok(inbox_from(object))
}

pub(crate) fn decode_message(body: &[u8]) -> serde_json::Result<Message> {
    let value = parse(body)?;
    let object = value
        .as_object()
        .ok_or_else(|| serde_json::Error::custom("expected a message object"))?;
    Ok(message_from(object))
}

pub(crate) fn decode_inbox_list(body: &[u8]) -> serde_json::Result<InboxList> {
    let value = parse(body)?;
    let items = collection(&value, "inboxes")
        .iter()
        .filter_map(Value::as_object)
        .map(inbox_from)
        .collect();

    Ok(InboxList {
        items,
        next_cursor: str_field(&value, "next_page_token"),
        total: None,
    })
}

pub(crate) fn decode_message_list(body: &[u8]) -> serde_json::Result<MessageList> {
    let value = parse(body)?;
    let items = collection(&value, "messages")
        .iter()
        .filter_map(Value::as_object)
        .map(message_from)
        .collect();

    Ok(MessageList {
        items,
        next_cursor: str_field(&value, "next_page_token"),
        total: value.get("count").and_then(Value::as_u64),
    })
}

pub(crate) fn decode_sent(body: &[u8]) -> serde_json::Result<SentMessage> {
    let value = parse(body)?;
    Ok(SentMessage {
        message_id: str_field(&value, "message_id"),
        thread_id: str_field(&value, "thread_id"),
    })
}

fn parse(body: &[u8]) -> serde_json::Result<Value> {
    serde_json::from_slice(body)
}

/// The array under `field` when present, else the payload itself when it is an array.
fn collection<'a>(value: &'a Value, field: &str) -> &'a [Value] {
    value
        .get(field)
        .and_then(Value::as_array)
        .or_else(|| value.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn inbox_from(object: &Object) -> Inbox {
    Inbox {
        inbox_id: str_at(object, "inbox_id"),
        name: str_at(object, "name"),
        email_address: str_at(object, "address"),
        created_at: str_at(object, "created_at"),
        metadata: object.get("metadata").and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Object(_) | Value::Array(_) => Some(v.to_string()),
            _ => None,
        }),
    }
}

fn message_from(object: &Object) -> Message {
    Message {
        message_id: str_at(object, "message_id"),
        thread_id: str_at(object, "thread_id"),
        from: str_at(object, "from"),
        to: str_at(object, "to"),
        subject: str_at(object, "subject"),
        body_text: str_at(object, "text"),
        body_html: str_at(object, "html"),
        timestamp: str_at(object, "created_at").or_else(|| str_at(object, "timestamp")),
        is_read: object
            .get("is_read")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        attachments: object
            .get("attachments")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(attachment_ref).collect())
            .unwrap_or_default(),
    }
}

fn attachment_ref(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(object) => str_at(object, "url").or_else(|| str_at(object, "attachment_id")),
        _ => None,
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn str_at(object: &Object, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn insert_str(json: &mut Object, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        json.insert(key.into(), Value::from(value));
    }
}

fn insert_list(json: &mut Object, key: &str, values: &[String]) {
    if !values.is_empty() {
        json.insert(
            key.into(),
            Value::Array(values.iter().map(|v| Value::from(v.as_str())).collect()),
        );
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inbox_fields_decode_verbatim() {
        let body = br#"{"inbox_id":"abc@x.to","address":"abc@x.to","name":"Dev","created_at":"2024-01-01T00:00:00Z"}"#;
        let inbox = decode_inbox(body).unwrap();
        assert_eq!(inbox.inbox_id.as_deref(), Some("abc@x.to"));
        assert_eq!(inbox.email_address.as_deref(), Some("abc@x.to"));
        assert_eq!(inbox.name.as_deref(), Some("Dev"));
        assert_eq!(inbox.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(inbox.metadata, None);
    }

    #[test]
    fn mistyped_fields_are_unset() {
        let body = br#"{"inbox_id":42,"address":null,"name":["x"],"created_at":true}"#;
        assert_eq!(decode_inbox(body).unwrap(), Inbox::default());

        let body = br#"{"message_id":"m1","is_read":"yes","subject":7}"#;
        let message = decode_message(body).unwrap();
        assert_eq!(message.message_id.as_deref(), Some("m1"));
        assert!(!message.is_read);
        assert_eq!(message.subject, None);
    }

    #[test]
    fn object_metadata_is_flattened_to_text() {
        let body = br#"{"inbox_id":"a","metadata":{"device":"abc","n":1}}"#;
        let inbox = decode_inbox(body).unwrap();
        let metadata: Value = serde_json::from_str(inbox.metadata.as_deref().unwrap()).unwrap();
        assert_eq!(metadata, json!({"device": "abc", "n": 1}));

        let body = br#"{"inbox_id":"a","metadata":"{\"k\":1}"}"#;
        let inbox = decode_inbox(body).unwrap();
        assert_eq!(inbox.metadata.as_deref(), Some(r#"{"k":1}"#));
    }

    #[test]
    fn empty_or_invalid_payload_is_a_parse_error() {
        assert!(decode_inbox(b"").is_err());
        assert!(decode_message(b"{\"message_id\":").is_err());
        assert!(decode_message_list(b"not json").is_err());
        assert!(decode_inbox(b"[]").is_err());
    }

    #[test]
    fn named_and_bare_collections_decode_alike() {
        let items = json!([
            {"inbox_id": "a@x.to", "address": "a@x.to"},
            {"inbox_id": "b@x.to", "name": "B"}
        ]);
        let named = json!({"inboxes": items.clone()}).to_string();
        let bare = items.to_string();

        let named = decode_inbox_list(named.as_bytes()).unwrap();
        let bare = decode_inbox_list(bare.as_bytes()).unwrap();
        assert_eq!(named.items, bare.items);
        assert_eq!(named.len(), 2);
        assert_eq!(named.items[1].name.as_deref(), Some("B"));
    }

    #[test]
    fn non_array_named_field_falls_back_to_payload() {
        let list = decode_message_list(br#"{"messages":"oops"}"#).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.total, None);
    }

    #[test]
    fn message_list_envelope() {
        let body = br#"{"messages":[{"message_id":"m1","from":"a@x","subject":"hi","is_read":false}],"next_page_token":"c2"}"#;
        let list = decode_message_list(body).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.items[0].message_id.as_deref(), Some("m1"));
        assert_eq!(list.items[0].from.as_deref(), Some("a@x"));
        assert!(!list.items[0].is_read);
        assert_eq!(list.next_cursor.as_deref(), Some("c2"));
        assert_eq!(list.total, None);

        let list = decode_message_list(br#"{"messages":[],"count":0}"#).unwrap();
        assert_eq!(list.total, Some(0));
    }

    #[test]
    fn message_bodies_timestamps_and_attachments() {
        let body = json!({
            "message_id": "m1",
            "text": "plain",
            "html": "<p>x</p>",
            "timestamp": "2024-01-02T00:00:00Z",
            "is_read": true,
            "attachments": ["https://files/a", {"attachment_id": "att_2"}, {"url": "https://files/c", "attachment_id": "att_3"}, 5]
        })
        .to_string();
        let message = decode_message(body.as_bytes()).unwrap();
        assert_eq!(message.body_text.as_deref(), Some("plain"));
        assert_eq!(message.body_html.as_deref(), Some("<p>x</p>"));
        assert_eq!(message.timestamp.as_deref(), Some("2024-01-02T00:00:00Z"));
        assert!(message.is_read);
        assert_eq!(
            message.attachments,
            vec!["https://files/a", "att_2", "https://files/c"]
        );
    }

    #[test]
    fn send_payload_omits_absent_fields() {
        let opts = SendOptions::new("me@x.to", "you@y.com").subject("hi");
        assert_eq!(
            encode_send(&opts),
            json!({"from": "me@x.to", "to": "you@y.com", "subject": "hi"})
        );
    }

    #[test]
    fn send_payload_keeps_recipient_order() {
        let opts = SendOptions::new("me@x.to", "you@y.com")
            .text("body")
            .cc("c1@x")
            .cc("c2@x")
            .bcc("b1@x");
        let payload = encode_send(&opts);
        assert_eq!(payload["cc"], json!(["c1@x", "c2@x"]));
        assert_eq!(payload["bcc"], json!(["b1@x"]));
        assert_eq!(payload["body_text"], json!("body"));
    }

    #[test]
    fn reply_payload_uses_reply_keys() {
        let opts = SendOptions {
            subject: Some("Re: hi".into()),
            body_text: Some("thanks".into()),
            body_html: Some("<b>thanks</b>".into()),
            ..SendOptions::default()
        };
        assert_eq!(
            encode_reply(&opts),
            json!({"subject": "Re: hi", "text": "thanks", "html": "<b>thanks</b>"})
        );
    }

    #[test]
    fn metadata_is_embedded_or_dropped() {
        let opts = InboxOptions::new().name("Dev").metadata(r#"{"device_id":"abc123"}"#);
        assert_eq!(
            encode_inbox_options(&opts),
            json!({"name": "Dev", "metadata": {"device_id": "abc123"}})
        );

        let opts = InboxOptions::new().metadata("{not json");
        assert_eq!(encode_inbox_options(&opts), json!({}));
    }

    #[test]
    fn sent_message_ids() {
        let sent = decode_sent(br#"{"message_id":"m9","thread_id":"t1"}"#).unwrap();
        assert_eq!(sent.message_id.as_deref(), Some("m9"));
        assert_eq!(sent.thread_id.as_deref(), Some("t1"));
        assert_eq!(decode_sent(b"{}").unwrap(), SentMessage::default());
    }
}
