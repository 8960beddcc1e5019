//! Call log and recording types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{DEFAULT_PER_PAGE, PhoneEndpoint, format_api_date};

/// Level of detail requested from the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallLogView {
    /// One record per call.
    #[default]
    Simple,
    /// Records include call legs.
    Detailed,
}

impl CallLogView {
    /// Wire value for the `view` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "Simple",
            Self::Detailed => "Detailed",
        }
    }
}

/// Filters for the call log endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallLogQuery {
    /// Restrict to one extension; `None` reads the whole account log.
    pub extension_id: Option<String>,
    /// Only calls started at or after this instant.
    pub date_from: Option<DateTime<Utc>>,
    /// Only calls started before this instant.
    pub date_to: Option<DateTime<Utc>>,
    /// Page size.
    pub per_page: u32,
    /// Level of detail.
    pub view: CallLogView,
    /// Only calls that have a recording.
    pub with_recording: bool,
}

impl Default for CallLogQuery {
    fn default() -> Self {
        Self {
            extension_id: None,
            date_from: None,
            date_to: None,
            per_page: DEFAULT_PER_PAGE,
            view: CallLogView::Simple,
            with_recording: false,
        }
    }
}

impl CallLogQuery {
    /// Restricts the query to one extension.
    #[must_use]
    pub fn for_extension(mut self, extension_id: impl Into<String>) -> Self {
        self.extension_id = Some(extension_id.into());
        self
    }

    /// Sets the date window.
    #[must_use]
    pub const fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// Only return calls with recordings.
    #[must_use]
    pub const fn with_recording(mut self) -> Self {
        self.with_recording = true;
        self
    }

    /// Relative API path for this query.
    #[must_use]
    pub fn path(&self) -> String {
        self.extension_id.as_ref().map_or_else(
            || "/account/~/call-log".to_string(),
            |id| format!("/account/~/extension/{id}/call-log"),
        )
    }

    /// Query parameters for the call log endpoint.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("perPage".to_string(), self.per_page.to_string()),
            ("view".to_string(), self.view.as_str().to_string()),
        ];
        if self.with_recording {
            query.push(("withRecording".to_string(), "true".to_string()));
        }
        if let Some(from) = &self.date_from {
            query.push(("dateFrom".to_string(), format_api_date(from)));
        }
        if let Some(to) = &self.date_to {
            query.push(("dateTo".to_string(), format_api_date(to)));
        }
        query
    }
}

/// Recording reference attached to a call or returned by the recording endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    /// Recording id.
    pub id: String,
    /// Media URL; lives on a different host than the REST API.
    pub content_uri: String,
    /// Metadata URI.
    #[serde(default)]
    pub uri: Option<String>,
    /// `Automatic` or `OnDemand`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// MIME type of the media.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Length in seconds.
    #[serde(default)]
    pub duration: Option<u64>,
}

/// A call log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLogRecord {
    /// Record id.
    pub id: String,
    /// Session id.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Telephony session id.
    #[serde(default)]
    pub telephony_session_id: Option<String>,
    /// Start time, as sent by the server.
    #[serde(default)]
    pub start_time: Option<String>,
    /// Length in seconds.
    #[serde(default)]
    pub duration: Option<u64>,
    /// `Inbound` or `Outbound`.
    #[serde(default)]
    pub direction: Option<String>,
    /// Call result, e.g. `Accepted`.
    #[serde(default)]
    pub result: Option<String>,
    /// Caller.
    #[serde(default)]
    pub from: Option<PhoneEndpoint>,
    /// Callee.
    #[serde(default)]
    pub to: Option<PhoneEndpoint>,
    /// Recording, if any.
    #[serde(default)]
    pub recording: Option<Recording>,
}
