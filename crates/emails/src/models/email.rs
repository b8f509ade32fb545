//! Email record model as returned by the email service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned identifier of an email record
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailId(pub String);

impl EmailId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EmailId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EmailId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single email as listed by the service
///
/// Every field is optional on the wire. Missing or `null` fields fall back to
/// empty values (and `date` to the current time) so a sparse response never
/// fails to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    /// Server-assigned ID, sent as `_id`
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "null_as_default")]
    pub id: EmailId,
    /// Message-ID header value; may differ from `id`
    #[serde(default, deserialize_with = "null_as_default")]
    pub message_id: String,
    #[serde(default = "Utc::now", deserialize_with = "null_as_now")]
    pub date: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub from: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub to: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cc: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bcc: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_read: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_starred: bool,
    /// View-local checkbox state; never sent to the service
    #[serde(skip)]
    pub is_selected: bool,
}

impl EmailRecord {
    /// Create a new record builder
    pub fn builder(id: impl Into<EmailId>) -> EmailRecordBuilder {
        EmailRecordBuilder::new(id.into())
    }

    /// Date as `DD/MM/YYYY`, zero-padded, in UTC
    pub fn formatted_date(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or_else(Utc::now))
}

/// Builder for creating EmailRecord instances
pub struct EmailRecordBuilder {
    id: EmailId,
    message_id: Option<String>,
    date: Option<DateTime<Utc>>,
    from: String,
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    subject: String,
    body: String,
    is_read: bool,
    is_starred: bool,
}

impl EmailRecordBuilder {
    fn new(id: EmailId) -> Self {
        Self {
            id,
            message_id: None,
            date: None,
            from: String::new(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: String::new(),
            body: String::new(),
            is_read: false,
            is_starred: false,
        }
    }

    pub fn message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn to(mut self, to: Vec<String>) -> Self {
        self.to = to;
        self
    }

    pub fn cc(mut self, cc: Vec<String>) -> Self {
        self.cc = cc;
        self
    }

    pub fn bcc(mut self, bcc: Vec<String>) -> Self {
        self.bcc = bcc;
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn read(mut self, is_read: bool) -> Self {
        self.is_read = is_read;
        self
    }

    pub fn starred(mut self, is_starred: bool) -> Self {
        self.is_starred = is_starred;
        self
    }

    pub fn build(self) -> EmailRecord {
        EmailRecord {
            id: self.id,
            message_id: self.message_id.unwrap_or_default(),
            date: self.date.unwrap_or_else(Utc::now),
            from: self.from,
            to: self.to,
            cc: self.cc,
            bcc: self.bcc,
            subject: self.subject,
            body: self.body,
            is_read: self.is_read,
            is_starred: self.is_starred,
            is_selected: false,
        }
    }
}
