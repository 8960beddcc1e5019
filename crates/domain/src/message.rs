//! SMS and message-store types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{DomainError, DomainResult};

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// An outbound SMS.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SmsMessage {
    /// Sender phone number (must belong to the authenticated extension).
    pub from: String,
    /// Recipient phone number.
    pub to: String,
    /// Message text.
    pub text: String,
}

impl SmsMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            text: text.into(),
        }
    }

    /// Checks that `from`, `to` and `text` are all present.
    ///
    /// # Errors
    /// Returns [`DomainError::MissingField`] naming the first empty field.
    pub fn validate(&self) -> DomainResult<()> {
        if self.from.trim().is_empty() {
            return Err(DomainError::MissingField("from"));
        }
        if self.to.trim().is_empty() {
            return Err(DomainError::MissingField("to"));
        }
        if self.text.is_empty() {
            return Err(DomainError::MissingField("text"));
        }
        Ok(())
    }

    /// Request body for `POST /account/~/extension/~/sms`.
    #[must_use]
    pub fn to_request_body(&self) -> serde_json::Value {
        json!({
            "from": { "phoneNumber": self.from },
            "to": [ { "phoneNumber": self.to } ],
            "text": self.text,
        })
    }
}

/// Formats a timestamp the way RingCentral date filters expect.
#[must_use]
pub fn format_api_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Filters for the SMS message store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQuery {
    /// Only messages created at or after this instant.
    pub date_from: Option<DateTime<Utc>>,
    /// Only messages created before this instant.
    pub date_to: Option<DateTime<Utc>>,
    /// Page size.
    pub per_page: u32,
}

impl Default for MessageQuery {
    fn default() -> Self {
        Self {
            date_from: None,
            date_to: None,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl MessageQuery {
    /// Sets the lower date bound.
    #[must_use]
    pub const fn from_date(mut self, date: DateTime<Utc>) -> Self {
        self.date_from = Some(date);
        self
    }

    /// Sets the upper date bound.
    #[must_use]
    pub const fn to_date(mut self, date: DateTime<Utc>) -> Self {
        self.date_to = Some(date);
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Query parameters for the message-store endpoint.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("messageType".to_string(), "SMS".to_string()),
            ("perPage".to_string(), self.per_page.to_string()),
        ];
        if let Some(from) = &self.date_from {
            query.push(("dateFrom".to_string(), format_api_date(from)));
        }
        if let Some(to) = &self.date_to {
            query.push(("dateTo".to_string(), format_api_date(to)));
        }
        query
    }
}

/// A phone endpoint in a message or call record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneEndpoint {
    /// E.164 phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Extension number, for internal endpoints.
    #[serde(default)]
    pub extension_number: Option<String>,
}

/// A message attachment reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAttachment {
    /// Attachment id.
    pub id: u64,
    /// Content URI.
    pub uri: String,
    /// Attachment kind, e.g. `Text`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// MIME type of the content.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// A message-store record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message id.
    pub id: u64,
    /// Canonical URI of the record.
    pub uri: String,
    /// `Inbound` or `Outbound`.
    #[serde(default)]
    pub direction: Option<String>,
    /// Message text.
    #[serde(default)]
    pub subject: Option<String>,
    /// Sender.
    #[serde(default)]
    pub from: Option<PhoneEndpoint>,
    /// Recipients.
    #[serde(default)]
    pub to: Vec<PhoneEndpoint>,
    /// Attachments.
    #[serde(default)]
    pub attachments: Vec<MessageAttachment>,
    /// Creation time, as sent by the server.
    #[serde(default)]
    pub creation_time: Option<String>,
    /// Delivery status.
    #[serde(default)]
    pub message_status: Option<String>,
}

/// Generic `{ "records": [...] }` list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordList<T> {
    /// Records on this page.
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_requires_all_fields() {
        assert_eq!(
            SmsMessage::new("", "+15550001", "hi").validate(),
            Err(DomainError::MissingField("from"))
        );
        assert_eq!(
            SmsMessage::new("+15550000", "", "hi").validate(),
            Err(DomainError::MissingField("to"))
        );
        assert_eq!(
            SmsMessage::new("+15550000", "+15550001", "").validate(),
            Err(DomainError::MissingField("text"))
        );
        assert!(SmsMessage::new("+15550000", "+15550001", "hi").validate().is_ok());
    }

    #[test]
    fn test_request_body_shape() {
        let body = SmsMessage::new("+1000", "+2000", "Test Message").to_request_body();
        assert_eq!(body["from"]["phoneNumber"], "+1000");
        assert_eq!(body["to"][0]["phoneNumber"], "+2000");
        assert_eq!(body["text"], "Test Message");
    }

    #[test]
    fn test_query_includes_both_dates() {
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
        let query = MessageQuery::default().from_date(from).to_date(to).per_page(2).to_query();
        assert_eq!(
            query,
            vec![
                ("messageType".to_string(), "SMS".to_string()),
                ("perPage".to_string(), "2".to_string()),
                ("dateFrom".to_string(), "2024-03-01T10:00:00+00:00".to_string()),
                ("dateTo".to_string(), "2024-03-02T10:00:00+00:00".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_query() {
        let query = MessageQuery::default().to_query();
        assert_eq!(query.len(), 2);
        assert_eq!(query[1].1, "100");
    }

    #[test]
    fn test_message_record_decodes() {
        let json = r#"{
            "id": 123, "uri": "https://x/restapi/v1.0/account/1/extension/2/message-store/123",
            "direction": "Outbound", "subject": "Test Message",
            "from": {"phoneNumber": "+1000"}, "to": [{"phoneNumber": "+2000"}],
            "attachments": [
                {"id": 9, "uri": "https://x/content/9", "type": "Text", "contentType": "text/plain"}
            ]
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.attachments[0].id, 9);
        assert_eq!(message.to[0].phone_number.as_deref(), Some("+2000"));
    }
}
