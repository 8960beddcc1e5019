//! Webhook subscriptions and inbound telephony notifications.
//!
//! Subscriptions are managed through the REST API. Inbound notifications are
//! telephony-session events; they are verified against the configured
//! verification token and reduced to a [`WebhookRecord`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::expires_after;
use crate::error::{DomainError, DomainResult};

/// Header carrying the verification token on inbound notifications.
pub const VERIFICATION_HEADER: &str = "verification-token";

/// Event filter for finished calls that have recordings.
pub const RECORDING_EVENT_FILTER: &str =
    "/restapi/v1.0/account/~/telephony/sessions?withRecordings=true&statusCode=Disconnected";

/// Event filter for answered outbound calls.
pub const ANSWERED_EVENT_FILTER: &str =
    "/restapi/v1.0/account/~/telephony/sessions?direction=Outbound&statusCode=Answered";

/// Default subscription lifetime in seconds (30 days).
pub const DEFAULT_WEBHOOK_TTL: u64 = 2_592_000;

/// Default renewal window in seconds (7 days).
pub const DEFAULT_RENEWAL_WINDOW: u64 = 604_800;

/// Direction of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallDirection {
    /// Call received by the account.
    Inbound,
    /// Call placed by the account.
    Outbound,
}

impl CallDirection {
    /// Wire value, also used as display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "Inbound",
            Self::Outbound => "Outbound",
        }
    }
}

impl std::fmt::Display for CallDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery settings of a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryMode {
    /// `WebHook` for HTTP delivery.
    pub transport_type: String,
    /// Callback URL.
    #[serde(default)]
    pub address: Option<String>,
}

/// A webhook subscription as returned by `/subscription`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Subscription id.
    pub id: String,
    /// `Active`, `Suspended`, ...
    #[serde(default)]
    pub status: Option<String>,
    /// Subscribed event filters.
    #[serde(default)]
    pub event_filters: Vec<String>,
    /// When the subscription lapses.
    #[serde(default)]
    pub expiration_time: Option<DateTime<Utc>>,
    /// Seconds until expiry at the time of the response.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Delivery settings.
    #[serde(default)]
    pub delivery_mode: Option<DeliveryMode>,
}

impl Subscription {
    /// True if the subscription is active and lapses within `window_secs` of `now`.
    #[must_use]
    pub fn expires_within(&self, now: DateTime<Utc>, window_secs: u64) -> bool {
        let active = self
            .status
            .as_deref()
            .is_none_or(|s| s.eq_ignore_ascii_case("active"));
        let deadline = expires_after(now, window_secs);
        active
            && self
                .expiration_time
                .is_some_and(|expires| expires <= deadline)
    }
}

/// Request to create a webhook subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWebhook {
    /// Event filters to subscribe to.
    pub event_filters: Vec<String>,
    /// Requested lifetime in seconds.
    pub expires_in: u64,
    /// Callback URL.
    pub address: String,
    /// Token echoed back in the `verification-token` header.
    pub verification_token: Option<String>,
}

impl CreateWebhook {
    /// Validates the request.
    ///
    /// # Errors
    /// Returns [`DomainError::MissingField`] when there are no filters or no
    /// address, and [`DomainError::InvalidUrl`] for a malformed address.
    pub fn validate(&self) -> DomainResult<()> {
        if self.event_filters.is_empty() {
            return Err(DomainError::MissingField("event_filters"));
        }
        if self.address.trim().is_empty() {
            return Err(DomainError::MissingField("address"));
        }
        url::Url::parse(&self.address)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.address)))?;
        Ok(())
    }

    /// Request body for `POST /subscription`.
    #[must_use]
    pub fn to_request_body(&self) -> serde_json::Value {
        let mut delivery = json!({
            "transportType": "WebHook",
            "address": self.address,
        });
        if let Some(token) = &self.verification_token {
            delivery["verificationToken"] = json!(token);
        }
        json!({
            "eventFilters": self.event_filters,
            "deliveryMode": delivery,
            "expiresIn": self.expires_in,
        })
    }
}

/// Compares the presented verification token with the configured one.
///
/// A missing configured token rejects everything.
#[must_use]
pub fn verify_token(configured: Option<&str>, presented: Option<&str>) -> bool {
    match (configured, presented) {
        (Some(expected), Some(actual)) => !expected.is_empty() && expected == actual,
        _ => false,
    }
}

/// Removes a leading North American country code.
#[must_use]
pub fn strip_country_code(number: &str) -> &str {
    number.strip_prefix("+1").unwrap_or(number)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    body: SessionEvent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionEvent {
    #[serde(default)]
    telephony_session_id: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    event_time: Option<DateTime<Utc>>,
    #[serde(default)]
    parties: Vec<SessionParty>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionParty {
    #[serde(default)]
    extension_id: Option<String>,
    #[serde(default)]
    direction: Option<CallDirection>,
    #[serde(default)]
    from: Option<PartyEndpoint>,
    #[serde(default)]
    to: Option<PartyEndpoint>,
    #[serde(default)]
    recordings: Vec<PartyRecording>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartyEndpoint {
    #[serde(default)]
    phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PartyRecording {
    id: String,
}

/// Normalized telephony-session notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookRecord {
    /// Telephony session id.
    pub session_id: String,
    /// Event time.
    pub timestamp: Option<DateTime<Utc>>,
    /// Call direction from the account party's point of view.
    pub direction: Option<CallDirection>,
    /// Extension that took part in the call.
    pub extension_id: Option<String>,
    /// Email of that extension, resolved by the client.
    pub extension_email: Option<String>,
    /// First recording id, if the call was recorded.
    pub recording_id: Option<String>,
    /// The other side's number, without a leading `+1`.
    pub external_number: Option<String>,
}

impl WebhookRecord {
    /// Parses a notification body.
    ///
    /// The account-side party (the first one carrying an extension id, or
    /// else the first party) decides direction, extension and recording.
    /// The external number is the caller for inbound calls and the callee
    /// for outbound calls.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidPayload`] if the body is not a
    /// telephony-session event or has no parties.
    pub fn from_payload(body: &[u8]) -> DomainResult<Self> {
        let envelope: Envelope = serde_json::from_slice(body)
            .map_err(|e| DomainError::InvalidPayload(format!("malformed notification: {e}")))?;
        let event = envelope.body;

        let session_id = event
            .telephony_session_id
            .or(event.session_id)
            .ok_or_else(|| DomainError::InvalidPayload("notification has no session id".into()))?;

        let party = event
            .parties
            .iter()
            .find(|p| p.extension_id.is_some())
            .or_else(|| event.parties.first())
            .ok_or_else(|| DomainError::InvalidPayload("notification has no parties".into()))?;

        let external = match party.direction {
            Some(CallDirection::Outbound) => party.to.as_ref(),
            _ => party.from.as_ref(),
        };

        Ok(Self {
            session_id,
            timestamp: event.event_time.or(envelope.timestamp),
            direction: party.direction,
            extension_id: party.extension_id.clone(),
            extension_email: None,
            recording_id: party.recordings.first().map(|r| r.id.clone()),
            external_number: external
                .and_then(|e| e.phone_number.as_deref())
                .map(|n| strip_country_code(n).to_string()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn notification(direction: &str) -> Vec<u8> {
        json!({
            "uuid": "u-1",
            "event": "/restapi/v1.0/account/1/telephony/sessions",
            "timestamp": "2024-05-01T12:00:00.000Z",
            "subscriptionId": "sub-1",
            "body": {
                "telephonySessionId": "s-abc",
                "sessionId": "123",
                "eventTime": "2024-05-01T11:59:59.000Z",
                "parties": [
                    {
                        "extensionId": "2001",
                        "direction": direction,
                        "from": {"phoneNumber": "+15551112222"},
                        "to": {"phoneNumber": "+15553334444"},
                        "recordings": [{"id": "rec-9", "active": false}]
                    }
                ]
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_inbound_uses_caller_number() {
        let record = WebhookRecord::from_payload(&notification("Inbound")).unwrap();
        assert_eq!(
            record,
            WebhookRecord {
                session_id: "s-abc".to_string(),
                timestamp: Some(Utc.with_ymd_and_hms(2024, 5, 1, 11, 59, 59).unwrap()),
                direction: Some(CallDirection::Inbound),
                extension_id: Some("2001".to_string()),
                extension_email: None,
                recording_id: Some("rec-9".to_string()),
                external_number: Some("5551112222".to_string()),
            }
        );
    }

    #[test]
    fn test_outbound_uses_callee_number() {
        let record = WebhookRecord::from_payload(&notification("Outbound")).unwrap();
        assert_eq!(record.external_number.as_deref(), Some("5553334444"));
        assert_eq!(record.direction, Some(CallDirection::Outbound));
    }

    #[test]
    fn test_rejects_payload_without_parties() {
        let body = json!({"body": {"telephonySessionId": "s", "parties": []}}).to_string();
        assert!(matches!(
            WebhookRecord::from_payload(body.as_bytes()),
            Err(DomainError::InvalidPayload(_))
        ));
        assert!(WebhookRecord::from_payload(b"not json").is_err());
    }

    #[test]
    fn test_verify_token() {
        assert!(verify_token(Some("T"), Some("T")));
        assert!(!verify_token(Some("T"), Some("X")));
        assert!(!verify_token(Some("T"), None));
        assert!(!verify_token(None, Some("T")));
        assert!(!verify_token(Some(""), Some("")));
    }

    #[test]
    fn test_strip_country_code() {
        assert_eq!(strip_country_code("+15551112222"), "5551112222");
        assert_eq!(strip_country_code("+445551112222"), "+445551112222");
    }

    #[test]
    fn test_create_webhook_body() {
        let request = CreateWebhook {
            event_filters: vec![RECORDING_EVENT_FILTER.to_string()],
            expires_in: DEFAULT_WEBHOOK_TTL,
            address: "https://app.example.com/hooks/rc".to_string(),
            verification_token: Some("T".to_string()),
        };
        request.validate().unwrap();
        let body = request.to_request_body();
        assert_eq!(body["deliveryMode"]["transportType"], "WebHook");
        assert_eq!(body["deliveryMode"]["verificationToken"], "T");
        assert_eq!(body["expiresIn"], 2_592_000);
    }

    #[test]
    fn test_create_webhook_validation() {
        let request = CreateWebhook {
            event_filters: vec![],
            expires_in: 60,
            address: "https://x".to_string(),
            verification_token: None,
        };
        assert_eq!(request.validate(), Err(DomainError::MissingField("event_filters")));
    }

    #[test]
    fn test_expires_within() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut subscription = Subscription {
            id: "s".to_string(),
            status: Some("Active".to_string()),
            event_filters: vec![],
            expiration_time: Some(now + chrono::Duration::days(3)),
            expires_in: None,
            delivery_mode: None,
        };
        assert!(subscription.expires_within(now, DEFAULT_RENEWAL_WINDOW));
        assert!(!subscription.expires_within(now, 3600));

        subscription.status = Some("Suspended".to_string());
        assert!(!subscription.expires_within(now, DEFAULT_RENEWAL_WINDOW));
    }
}
