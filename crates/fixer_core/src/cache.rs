use crate::classify::Classification;
use crate::wire::MatchResult;

/// Last classification that needed the user, kept for the editor session.
///
/// Cleared when a fresh scan starts, refilled when it completes, and read
/// when the dialog is reopened while downloads are still running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResultCache {
    conflicts: Vec<MatchResult>,
    downloads: Vec<MatchResult>,
    unknowns: Vec<MatchResult>,
}

impl ScanResultCache {
    pub fn clear(&mut self) {
        self.conflicts.clear();
        self.downloads.clear();
        self.unknowns.clear();
    }

    pub fn store(&mut self, classification: &Classification) {
        self.conflicts = classification.conflicts.clone();
        self.downloads = classification.downloads.clone();
        self.unknowns = classification.unknowns.clone();
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty() && self.downloads.is_empty() && self.unknowns.is_empty()
    }

    pub fn conflicts(&self) -> &[MatchResult] {
        &self.conflicts
    }

    pub fn downloads(&self) -> &[MatchResult] {
        &self.downloads
    }

    pub fn unknowns(&self) -> &[MatchResult] {
        &self.unknowns
    }
}
