//! High-level RingCentral operations.
//!
//! Each method is a direct translation of "operation → verb + path +
//! parameters" over the [`Dispatcher`], followed by decoding of the JSON
//! result.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use ringcentral_domain::webhook::{
    ANSWERED_EVENT_FILTER, DEFAULT_WEBHOOK_TTL, RECORDING_EVENT_FILTER, VERIFICATION_HEADER,
};
use ringcentral_domain::{
    ApiResponse, CallLogQuery, CallLogRecord, CreateWebhook, Extension, Message, MessageQuery,
    RecordList, Recording, RequestBody, SmsMessage, Subscription, WebhookRecord, verify_token,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::dispatcher::{Dispatcher, RequestOptions};
use crate::error::{ClientError, ClientResult};
use crate::ports::Clock;

/// Typed access to the RingCentral REST API.
#[derive(Clone)]
pub struct RingCentralClient {
    dispatcher: Dispatcher,
    clock: Option<Arc<dyn Clock>>,
}

fn decode<T: DeserializeOwned>(response: &ApiResponse) -> ClientResult<T> {
    response
        .json()
        .map_err(|e| ClientError::Decode(e.to_string()))
}

impl RingCentralClient {
    /// Wraps a dispatcher.
    #[must_use]
    pub const fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            clock: None,
        }
    }

    /// Uses `clock` to decide which webhooks are about to expire.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// The underlying dispatcher, for calls not covered here.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Sends an SMS from an authenticated extension number.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidInput`] before any network call if
    /// `from`, `to` or `text` is empty; otherwise dispatch errors.
    pub async fn send_message(&self, message: &SmsMessage) -> ClientResult<Message> {
        message.validate()?;

        let body = RequestBody::json(&message.to_request_body())?;
        let response = self
            .dispatcher
            .post("/account/~/extension/~/sms", body, RequestOptions::default())
            .await?;
        let sent: Message = decode(&response)?;
        info!(message_id = sent.id, "sms sent");
        Ok(sent)
    }

    /// Lists the account's extensions.
    ///
    /// # Errors
    /// Dispatch or decode errors.
    pub async fn get_extensions(&self) -> ClientResult<Vec<Extension>> {
        let response = self
            .dispatcher
            .get("/account/~/extension", Vec::new(), RequestOptions::default())
            .await?;
        Ok(decode::<RecordList<Extension>>(&response)?.records)
    }

    /// Fetches one extension.
    ///
    /// # Errors
    /// Dispatch or decode errors.
    pub async fn get_extension(&self, extension_id: &str) -> ClientResult<Extension> {
        let response = self
            .dispatcher
            .get(
                &format!("/account/~/extension/{extension_id}"),
                Vec::new(),
                RequestOptions::default(),
            )
            .await?;
        decode(&response)
    }

    /// Fetches the extension the JWT belongs to.
    ///
    /// # Errors
    /// Dispatch or decode errors.
    pub async fn get_logged_in_extension(&self) -> ClientResult<Extension> {
        self.get_extension("~").await
    }

    /// Lists SMS messages of an extension.
    ///
    /// # Errors
    /// Dispatch or decode errors.
    pub async fn get_messages(
        &self,
        extension_id: &str,
        query: &MessageQuery,
    ) -> ClientResult<Vec<Message>> {
        let response = self
            .dispatcher
            .get(
                &format!("/account/~/extension/{extension_id}/message-store"),
                query.to_query(),
                RequestOptions::default(),
            )
            .await?;
        Ok(decode::<RecordList<Message>>(&response)?.records)
    }

    /// Fetches a message attachment; the raw response is returned since the
    /// content type varies.
    ///
    /// # Errors
    /// Dispatch errors.
    pub async fn get_message_attachment(
        &self,
        extension_id: &str,
        message_id: &str,
        attachment_id: &str,
    ) -> ClientResult<ApiResponse> {
        self.dispatcher
            .get(
                &format!(
                    "/account/~/extension/{extension_id}/message-store/{message_id}\
                     /content/{attachment_id}"
                ),
                Vec::new(),
                RequestOptions::default(),
            )
            .await
    }

    /// Reads the account or extension call log.
    ///
    /// # Errors
    /// Dispatch or decode errors.
    pub async fn get_call_logs(&self, query: &CallLogQuery) -> ClientResult<Vec<CallLogRecord>> {
        let response = self
            .dispatcher
            .get(&query.path(), query.to_query(), RequestOptions::default())
            .await?;
        Ok(decode::<RecordList<CallLogRecord>>(&response)?.records)
    }

    /// Fetches recording metadata.
    ///
    /// # Errors
    /// Dispatch or decode errors.
    pub async fn get_recording(&self, recording_id: &str) -> ClientResult<Recording> {
        let response = self
            .dispatcher
            .get(
                &format!("/account/~/recording/{recording_id}"),
                Vec::new(),
                RequestOptions::default(),
            )
            .await?;
        decode(&response)
    }

    /// Downloads recording media. `content_uri` is absolute and usually on
    /// the media host, so no base path is prepended.
    ///
    /// # Errors
    /// Dispatch errors.
    pub async fn download_recording(&self, content_uri: &str) -> ClientResult<Vec<u8>> {
        let response = self
            .dispatcher
            .get(content_uri, Vec::new(), RequestOptions::absolute())
            .await?;
        debug!(bytes = response.body.len(), "recording downloaded");
        Ok(response.body)
    }

    /// Lists webhook subscriptions.
    ///
    /// # Errors
    /// Dispatch or decode errors.
    pub async fn list_webhooks(&self) -> ClientResult<Vec<Subscription>> {
        let response = self
            .dispatcher
            .get("/subscription", Vec::new(), RequestOptions::default())
            .await?;
        Ok(decode::<RecordList<Subscription>>(&response)?.records)
    }

    /// Creates a webhook subscription delivering to `address`.
    ///
    /// The configured verification token, if any, is registered with the
    /// subscription.
    ///
    /// # Errors
    /// [`ClientError::InvalidInput`] for empty filters or a bad address;
    /// otherwise dispatch or decode errors.
    pub async fn create_webhook(
        &self,
        event_filters: Vec<String>,
        expires_in: u64,
        address: &str,
    ) -> ClientResult<Subscription> {
        let request = CreateWebhook {
            event_filters,
            expires_in,
            address: address.to_string(),
            verification_token: self.dispatcher.config().verification_token.clone(),
        };
        request.validate()?;

        let body = RequestBody::json(&request.to_request_body())?;
        let response = self
            .dispatcher
            .post("/subscription", body, RequestOptions::default())
            .await?;
        let subscription: Subscription = decode(&response)?;
        info!(subscription_id = %subscription.id, %address, "webhook created");
        Ok(subscription)
    }

    /// Subscribes `address` to finished calls with recordings.
    ///
    /// # Errors
    /// See [`RingCentralClient::create_webhook`].
    pub async fn create_recording_webhook(&self, address: &str) -> ClientResult<Subscription> {
        self.create_webhook(
            vec![RECORDING_EVENT_FILTER.to_string()],
            DEFAULT_WEBHOOK_TTL,
            address,
        )
        .await
    }

    /// Subscribes `address` to answered outbound calls.
    ///
    /// # Errors
    /// See [`RingCentralClient::create_webhook`].
    pub async fn create_answered_webhook(&self, address: &str) -> ClientResult<Subscription> {
        self.create_webhook(
            vec![ANSWERED_EVENT_FILTER.to_string()],
            DEFAULT_WEBHOOK_TTL,
            address,
        )
        .await
    }

    /// Extends a subscription's lifetime.
    ///
    /// # Errors
    /// Dispatch or decode errors.
    pub async fn renew_webhook(&self, subscription_id: &str) -> ClientResult<Subscription> {
        let response = self
            .dispatcher
            .post(
                &format!("/subscription/{subscription_id}/renew"),
                RequestBody::None,
                RequestOptions::default(),
            )
            .await?;
        decode(&response)
    }

    /// Deletes a subscription.
    ///
    /// # Errors
    /// Dispatch errors.
    pub async fn delete_webhook(&self, subscription_id: &str) -> ClientResult<()> {
        self.dispatcher
            .delete(
                &format!("/subscription/{subscription_id}"),
                RequestOptions::default(),
            )
            .await?;
        info!(%subscription_id, "webhook deleted");
        Ok(())
    }

    /// Renews every active subscription expiring within `window_secs`.
    ///
    /// Returns the ids of the renewed subscriptions. Stops at the first
    /// failure.
    ///
    /// # Errors
    /// Dispatch or decode errors.
    pub async fn renew_expiring_webhooks(&self, window_secs: u64) -> ClientResult<Vec<String>> {
        let now = self.clock.as_ref().map_or_else(Utc::now, |c| c.now());
        let mut renewed = Vec::new();

        for subscription in self.list_webhooks().await? {
            if !subscription.expires_within(now, window_secs) {
                continue;
            }
            self.renew_webhook(&subscription.id).await?;
            renewed.push(subscription.id);
        }

        info!(count = renewed.len(), "renewed expiring webhooks");
        Ok(renewed)
    }

    /// Checks a presented `verification-token` against the configuration.
    #[must_use]
    pub fn verify_webhook(&self, presented: Option<&str>) -> bool {
        verify_token(
            self.dispatcher.config().verification_token.as_deref(),
            presented,
        )
    }

    /// Verifies and normalizes an inbound telephony notification.
    ///
    /// `headers` are matched case-insensitively. When the notification names
    /// an extension, its email is looked up through the API.
    ///
    /// # Errors
    /// - [`ClientError::WebhookVerification`] if the token does not match
    /// - [`ClientError::InvalidInput`] if the body is not a session event
    /// - dispatch errors from the extension lookup
    pub async fn parse_webhook(
        &self,
        headers: &HashMap<String, String>,
        body: &[u8],
    ) -> ClientResult<WebhookRecord> {
        let presented = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(VERIFICATION_HEADER))
            .map(|(_, v)| v.as_str());

        if !self.verify_webhook(presented) {
            warn!("rejected webhook with bad verification token");
            return Err(ClientError::WebhookVerification);
        }

        let mut record = WebhookRecord::from_payload(body)?;

        if let Some(extension_id) = &record.extension_id {
            let extension = self.get_extension(extension_id).await?;
            record.extension_email = extension.email().map(String::from);
        }

        debug!(session_id = %record.session_id, "webhook parsed");
        Ok(record)
    }
}

impl std::fmt::Debug for RingCentralClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingCentralClient")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::auth::InMemoryTokenStore;
    use crate::error::ErrorKind;
    use crate::ports::TokenStore;
    use crate::test_support::{ManualClock, ScriptedTransport, config};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use ringcentral_domain::{HttpMethod, message::format_api_date};
    use serde_json::json;

    async fn client(transport: &Arc<ScriptedTransport>) -> RingCentralClient {
        let store = InMemoryTokenStore::new();
        store
            .put("ringcentral:client-id:access_token", "tok", 3600)
            .await
            .unwrap();
        RingCentralClient::new(Dispatcher::new(config(), Arc::new(store), transport.clone()))
    }

    fn json_body(request: &ringcentral_domain::ApiRequest) -> serde_json::Value {
        match &request.body {
            RequestBody::Json(raw) => serde_json::from_str(raw).unwrap(),
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_message_validates_before_network() {
        let transport = ScriptedTransport::new();
        let client = client(&transport).await;

        for message in [
            SmsMessage::new("", "+15550001", "hi"),
            SmsMessage::new("+15550000", "", "hi"),
            SmsMessage::new("+15550000", "+15550001", ""),
        ] {
            let err = client.send_message(&message).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_send_message() {
        let transport = ScriptedTransport::new();
        transport.push_json(
            200,
            json!({
                "id": 555, "uri": "https://x/restapi/v1.0/account/1/extension/2/message-store/555",
                "subject": "Test Message",
                "from": {"phoneNumber": "+15550000"}, "to": [{"phoneNumber": "+15550001"}]
            }),
        );
        let client = client(&transport).await;

        let sent = client
            .send_message(&SmsMessage::new("+15550000", "+15550001", "Test Message"))
            .await
            .unwrap();

        assert_eq!(sent.id, 555);
        let request = &transport.requests()[0];
        assert_eq!(request.url, "https://x/restapi/v1.0/account/~/extension/~/sms");
        assert_eq!(json_body(request)["to"][0]["phoneNumber"], "+15550001");
    }

    #[tokio::test]
    async fn test_get_extensions() {
        let transport = ScriptedTransport::new();
        transport.push_json(
            200,
            json!({"records": [
                {"id": 1, "extensionNumber": "101"},
                {"id": 2, "extensionNumber": "102"}
            ]}),
        );
        let client = client(&transport).await;

        let extensions = client.get_extensions().await.unwrap();
        assert_eq!(extensions.len(), 2);
        assert_eq!(extensions[1].extension_number.as_deref(), Some("102"));
    }

    #[tokio::test]
    async fn test_get_messages_sends_date_range() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!({"records": []}));
        let client = client(&transport).await;
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

        client
            .get_messages("42", &MessageQuery::default().from_date(from).to_date(to))
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(
            request.url,
            "https://x/restapi/v1.0/account/~/extension/42/message-store"
        );
        assert!(request.query.contains(&("dateFrom".to_string(), format_api_date(&from))));
        assert!(request.query.contains(&("dateTo".to_string(), format_api_date(&to))));
    }

    #[tokio::test]
    async fn test_get_message_attachment_path() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!({}));
        let client = client(&transport).await;

        client.get_message_attachment("1", "2", "3").await.unwrap();
        assert_eq!(
            transport.requests()[0].url,
            "https://x/restapi/v1.0/account/~/extension/1/message-store/2/content/3"
        );
    }

    #[tokio::test]
    async fn test_call_logs_and_recording_download() {
        let transport = ScriptedTransport::new();
        transport.push_json(
            200,
            json!({"records": [{
                "id": "c1",
                "recording": {
                    "id": "r1",
                    "contentUri": "https://media.example.com/restapi/v1.0/account/1/recording/r1/content"
                }
            }]}),
        );
        transport.push(ApiResponse::new(200, HashMap::new(), b"RIFF".to_vec()));
        let client = client(&transport).await;

        let records = client
            .get_call_logs(&CallLogQuery::default().with_recording())
            .await
            .unwrap();
        let recording = records[0].recording.as_ref().unwrap();
        let bytes = client.download_recording(&recording.content_uri).await.unwrap();

        assert_eq!(bytes, b"RIFF");
        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://x/restapi/v1.0/account/~/call-log");
        assert_eq!(
            requests[1].url,
            "https://media.example.com/restapi/v1.0/account/1/recording/r1/content"
        );
        assert_eq!(requests[1].header("Authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_create_webhook_registers_verification_token() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, json!({"id": "sub-1", "status": "Active"}));
        let client = client(&transport).await;

        let subscription = client
            .create_recording_webhook("https://app.example.com/webhooks/ringcentral")
            .await
            .unwrap();

        assert_eq!(subscription.id, "sub-1");
        let request = &transport.requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        let body = json_body(request);
        assert_eq!(body["eventFilters"][0], RECORDING_EVENT_FILTER);
        assert_eq!(body["deliveryMode"]["verificationToken"], "verify-me");
        assert_eq!(body["expiresIn"], DEFAULT_WEBHOOK_TTL);
    }

    #[tokio::test]
    async fn test_delete_webhook() {
        let transport = ScriptedTransport::new();
        transport.push(ApiResponse::new(204, HashMap::new(), Vec::new()));
        let client = client(&transport).await;

        client.delete_webhook("sub-9").await.unwrap();
        let request = &transport.requests()[0];
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.url, "https://x/restapi/v1.0/subscription/sub-9");
    }

    #[tokio::test]
    async fn test_renew_expiring_webhooks() {
        let clock = ManualClock::new();
        let now = clock.now();
        let transport = ScriptedTransport::new();
        transport.push_json(
            200,
            json!({"records": [
                {"id": "soon", "status": "Active",
                 "expirationTime": (now + chrono::Duration::days(2)).to_rfc3339()},
                {"id": "later", "status": "Active",
                 "expirationTime": (now + chrono::Duration::days(20)).to_rfc3339()}
            ]}),
        );
        transport.push_json(200, json!({"id": "soon", "status": "Active"}));
        let client = client(&transport).await.with_clock(clock);

        let renewed = client.renew_expiring_webhooks(604_800).await.unwrap();

        assert_eq!(renewed, vec!["soon".to_string()]);
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].url,
            "https://x/restapi/v1.0/subscription/soon/renew"
        );
    }

    fn notification() -> Vec<u8> {
        json!({
            "timestamp": "2024-05-01T12:00:00Z",
            "body": {
                "telephonySessionId": "s-1",
                "parties": [{
                    "extensionId": "2001",
                    "direction": "Inbound",
                    "from": {"phoneNumber": "+15551112222"},
                    "recordings": [{"id": "rec-1"}]
                }]
            }
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn test_parse_webhook_resolves_email() {
        let transport = ScriptedTransport::new();
        transport.push_json(
            200,
            json!({"id": 2001, "contact": {"email": "agent@example.com"}}),
        );
        let client = client(&transport).await;
        let headers = HashMap::from([("Verification-Token".to_string(), "verify-me".to_string())]);

        let record = client.parse_webhook(&headers, &notification()).await.unwrap();

        assert_eq!(record.extension_email.as_deref(), Some("agent@example.com"));
        assert_eq!(record.external_number.as_deref(), Some("5551112222"));
        assert_eq!(record.recording_id.as_deref(), Some("rec-1"));
        assert_eq!(
            transport.requests()[0].url,
            "https://x/restapi/v1.0/account/~/extension/2001"
        );
    }

    #[tokio::test]
    async fn test_parse_webhook_rejects_wrong_token() {
        let transport = ScriptedTransport::new();
        let client = client(&transport).await;
        let headers = HashMap::from([("verification-token".to_string(), "nope".to_string())]);

        let err = client.parse_webhook(&headers, &notification()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Verification);
        assert_eq!(transport.request_count(), 0);
        assert!(!client.verify_webhook(None));
        assert!(client.verify_webhook(Some("verify-me")));
    }
}
