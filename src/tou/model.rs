//! Wire types for the `/api/tou` endpoints.

use serde::{Deserialize, Serialize};

/// `{ ok, data?, error? }` envelope every endpoint answers with.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiEnvelope<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct TouDocument {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub agreement_text: Option<String>,
}

impl TouDocument {
    /// Agreement label, falling back to `default` when absent or blank.
    pub fn agreement_text_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.agreement_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => default,
        }
    }
}

/// One stored TOU version as returned by `GET /api/tou` and `/version/<n>`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TouRecord {
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub content: TouDocument,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HistoryEntry {
    pub version: i64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct AcceptanceRequest<'a> {
    pub email: &'a str,
    pub version: i64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AcceptanceReceipt {
    pub id: i64,
    #[serde(default)]
    pub accepted_at: Option<String>,
}
