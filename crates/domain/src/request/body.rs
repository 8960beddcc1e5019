//! HTTP Request body types

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// Serialized JSON document
    Json(String),
    /// `application/x-www-form-urlencoded` fields
    Form(Vec<(String, String)>),
}

impl RequestBody {
    /// Serializes a value into a JSON body.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidPayload`] if the value cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> DomainResult<Self> {
        serde_json::to_string(value)
            .map(Self::Json)
            .map_err(|e| DomainError::InvalidPayload(format!("cannot serialize body: {e}")))
    }

    /// Creates a form body from key/value pairs.
    #[must_use]
    pub fn form<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the Content-Type for this body, if any.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json(_) => Some("application/json"),
            Self::Form(_) => Some("application/x-www-form-urlencoded"),
        }
    }

    /// Returns true if there is no body.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_body() {
        let body = RequestBody::json(&serde_json::json!({"text": "hi"})).unwrap();
        assert_eq!(body, RequestBody::Json(r#"{"text":"hi"}"#.to_string()));
        assert_eq!(body.content_type(), Some("application/json"));
    }

    #[test]
    fn test_form_body() {
        let body = RequestBody::form([("a", "1")]);
        assert_eq!(body.content_type(), Some("application/x-www-form-urlencoded"));
        assert!(!body.is_empty());
        assert!(RequestBody::None.is_empty());
    }
}
