//! Account extension types.

use serde::{Deserialize, Serialize};

/// Contact details of an extension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionContact {
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
}

/// An account extension (a user, department or line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Numeric extension id.
    pub id: u64,
    /// Short dialable number.
    #[serde(default)]
    pub extension_number: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// `User`, `Department`, ...
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// `Enabled`, `Disabled`, ...
    #[serde(default)]
    pub status: Option<String>,
    /// Contact details.
    #[serde(default)]
    pub contact: Option<ExtensionContact>,
}

impl Extension {
    /// Contact email, if present.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.contact.as_ref().and_then(|c| c.email.as_deref())
    }
}
