use sha2::{Digest, Sha256};

/// Client view of one background download, keyed by filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub filename: String,
    pub url: Option<String>,
    pub model_type: Option<String>,
    pub state: DownloadState,
    pub progress: Option<Progress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DownloadState {
    #[default]
    Idle,
    /// Start request in flight; the control stays disabled.
    Requesting,
    Active,
    /// Cancel acknowledged locally; waiting for the terminal event.
    Cancelling,
    Completed,
    /// The server already had the file; no task was created.
    AlreadyPresent,
    Failed(DownloadFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadFailure {
    Cancelled,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
}

impl Progress {
    /// Whole percent, or `None` while the total size is unknown.
    pub fn percent(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let percent = self.current.saturating_mul(100) / self.total;
        Some(percent.min(100) as u8)
    }
}

impl DownloadTask {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            url: None,
            model_type: None,
            state: DownloadState::Idle,
            progress: None,
        }
    }

    pub fn with_source(mut self, url: Option<String>, model_type: Option<String>) -> Self {
        self.url = url;
        self.model_type = model_type;
        self
    }

    pub fn can_start(&self) -> bool {
        matches!(self.state, DownloadState::Idle | DownloadState::Failed(_)) && self.url.is_some()
    }

    pub fn can_cancel(&self) -> bool {
        self.state == DownloadState::Active
    }

    /// Work the server is (or may be) doing for this file.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self.state,
            DownloadState::Requesting | DownloadState::Active | DownloadState::Cancelling
        )
    }

    /// Completed states ignore later progress events.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.state,
            DownloadState::Completed | DownloadState::AlreadyPresent
        )
    }

    /// Folder label shown under the row, e.g. `/models/loras/`.
    pub fn target_folder(&self) -> String {
        format!(
            "/models/{}/",
            self.model_type.as_deref().unwrap_or("uncategorized")
        )
    }
}

/// The last path component, splitting on both separators.
pub fn download_filename(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .trim()
        .to_string()
}

/// Identity of the live control for a filename: `{sanitized}--{short_hash}`.
///
/// Sanitizing keeps `[A-Za-z0-9_.-]`; the hash of the raw name keeps two
/// names that sanitize alike apart.
pub fn control_key(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{sanitized}--{}", short_hash(filename))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
