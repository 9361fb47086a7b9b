// Wire types of the contacts service. Field names follow the service's JSON.

use crate::walker::{ContinuationToken, Page};
use base64::Engine as _;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Login payload for `POST /auth`.
#[derive(Serialize, Debug)]
pub struct AuthRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    /// Name the client identifies itself with.
    pub source: String,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[derive(Deserialize, Debug)]
pub struct AuthResponse {
    pub token: String,
}

/// One page of the contacts feed.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactsFeed {
    #[serde(default)]
    pub entries: Vec<ContactEntry>,
    /// Absolute URL of the next page; absent on the last page.
    pub next_link: Option<String>,
}

impl From<ContactsFeed> for Page<ContactEntry> {
    fn from(feed: ContactsFeed) -> Self {
        let next = feed
            .next_link
            .filter(|link| !link.is_empty())
            .map(ContinuationToken::new);
        Page::new(feed.entries, next)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContactEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default)]
    pub emails: Vec<Email>,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default)]
    pub group_membership: Vec<GroupMembership>,
    #[serde(default)]
    pub extended_properties: Vec<ExtendedProperty>,
}

impl ContactEntry {
    pub fn primary_emails(&self) -> impl Iterator<Item = &str> {
        self.emails.iter().filter(|e| e.primary).map(|e| e.address.as_str())
    }

    pub fn first_phone(&self) -> Option<&str> {
        self.phone_numbers.first().map(|p| p.number.as_str())
    }

    /// Replace the full name, creating the name block if the entry has none.
    pub fn set_full_name(&mut self, full_name: &str) {
        self.name.get_or_insert_with(Name::default).full_name = Some(full_name.to_string());
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Name {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Email {
    pub address: String,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhoneNumber {
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupMembership {
    pub href: String,
}

/// Application-defined key/value attached to an entry. Carries either a plain
/// `value` or an XML blob (base64 on the wire).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtendedProperty {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_blob: Option<String>,
}

impl ExtendedProperty {
    /// The plain value if set, else the decoded XML blob. A blob that is not
    /// valid base64 UTF-8 is shown as sent.
    pub fn display_value(&self) -> String {
        if let Some(value) = self.value.as_deref().filter(|v| !v.is_empty()) {
            return value.to_string();
        }
        let Some(blob) = self.xml_blob.as_deref() else {
            return String::new();
        };
        base64::engine::general_purpose::STANDARD
            .decode(blob)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .unwrap_or_else(|| blob.to_string())
    }
}
