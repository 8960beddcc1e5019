//! Fakes shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ringcentral_domain::{ApiRequest, ApiResponse, Credentials, RingCentralConfig};
use serde_json::json;

use crate::ports::{Clock, HttpTransport, TransportError};

/// Transport that replays canned responses and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, response: ApiResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push(ApiResponse::json_body(status, &body));
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left")
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
        })
    }

    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn config() -> RingCentralConfig {
    let credentials = Credentials::new("client-id", "client-secret", "https://x", "jwt-assertion")
        .unwrap();
    RingCentralConfig::new(credentials).with_verification_token("verify-me")
}

pub fn login_response() -> serde_json::Value {
    json!({
        "access_token": "access-from-login",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-from-login",
        "refresh_token_expires_in": 604_800
    })
}

pub fn refresh_response() -> serde_json::Value {
    json!({
        "access_token": "access-from-refresh",
        "token_type": "bearer",
        "expires_in": 1800,
        "refresh_token": "rotated-refresh",
        "refresh_token_expires_in": 604_800
    })
}
