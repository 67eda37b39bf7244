use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Ticket identifier as returned by the API. Zendesk uses integers, but the
/// value is kept as-is when a server hands back a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TicketId {
    Number(u64),
    Text(String),
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketId::Number(n) => write!(f, "{}", n),
            TicketId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for TicketId {
    fn from(id: u64) -> Self {
        TicketId::Number(id)
    }
}

/// A search result record. Only `id` and `subject` are ever looked at; every
/// other field is carried through untouched for full output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Ticket {
    /// The subject as text. Strings are borrowed; any other non-null value
    /// is rendered as JSON.
    pub fn subject(&self) -> Option<Cow<'_, str>> {
        match self.fields.get("subject")? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    /// One-line `id  subject` rendering, falling back to the bare id.
    pub fn summary_line(&self) -> String {
        match self.subject() {
            Some(subject) => format!("{}  {}", self.id, subject),
            None => self.id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<Ticket>,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl SearchPage {
    /// The continuation cursor, treating an empty string like null.
    pub fn cursor(&self) -> Option<&str> {
        self.next_page.as_deref().filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub url: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkResponse {
    pub job_status: JobStatus,
}
