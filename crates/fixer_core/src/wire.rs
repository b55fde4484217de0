//! Request, response and push-event shapes exchanged with the path fixer server.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Error string the server reports when a download stopped because the user asked.
/// Compared by exact equality.
pub const USER_CANCELLED: &str = "用户中断";

/// category -> (display name -> url)
pub type LinkHints = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "id")]
    pub node_id: NodeId,
    pub widget_name: String,
    #[serde(rename = "current_val")]
    pub current_value: String,
    /// Mirrors `widget_name`; the server routes on it.
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "id")]
    pub node_id: NodeId,
    pub widget_name: String,
    pub old_value: String,
    #[serde(default)]
    pub candidates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
}

impl MatchResult {
    /// `"<nodeId>-<widgetName>"`, the identity of a conflict row.
    pub fn key(&self) -> String {
        format!("{}-{}", self.node_id, self.widget_name)
    }

    /// The download URL, treating a blank string as absent.
    pub fn download_link(&self) -> Option<&str> {
        self.download_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixInstruction {
    #[serde(rename = "id")]
    pub node_id: NodeId,
    pub widget_name: String,
    pub new_value: String,
    pub old_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixRequest {
    pub queries: Vec<Query>,
    pub dynamic_links: LinkHints,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixResponse {
    #[serde(default)]
    pub fixed: Vec<MatchResult>,
    /// Set when the matcher itself failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTasksResponse {
    #[serde(default)]
    pub active: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    pub url: String,
    pub filename: String,
    pub model_type: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// How the client reads a [`StartResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// File already present locally; no task was created.
    AlreadyPresent,
    Accepted,
    Rejected(String),
}

impl StartResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            status: None,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            status: None,
            message: Some(message.into()),
        }
    }

    pub fn outcome(&self) -> StartOutcome {
        match (self.success, self.status.as_deref()) {
            (true, Some("exists")) => StartOutcome::AlreadyPresent,
            (true, _) => StartOutcome::Accepted,
            (false, _) => StartOutcome::Rejected(
                self.message
                    .clone()
                    .unwrap_or_else(|| "download could not be started".to_string()),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CancelResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub filename: String,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEvent {
    pub filename: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TerminalEvent {
    pub fn is_user_cancelled(&self) -> bool {
        self.error.as_deref() == Some(USER_CANCELLED)
    }
}

/// A pushed download event. Ordering is only meaningful per filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Progress(ProgressEvent),
    Terminal(TerminalEvent),
}

impl StatusEvent {
    pub fn filename(&self) -> &str {
        match self {
            StatusEvent::Progress(event) => &event.filename,
            StatusEvent::Terminal(event) => &event.filename,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StatusEvent::Terminal(_))
    }
}
