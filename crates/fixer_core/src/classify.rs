use crate::wire::{FixInstruction, MatchResult};

/// Where a match result goes. Every result lands in exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    AutoFix,
    Conflict,
    Download,
    Unknown,
}

pub fn bucket_of(result: &MatchResult) -> Bucket {
    match result.candidates.len() {
        0 if result.download_link().is_some() => Bucket::Download,
        0 => Bucket::Unknown,
        1 => Bucket::AutoFix,
        _ => Bucket::Conflict,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub auto_fixes: Vec<FixInstruction>,
    pub conflicts: Vec<MatchResult>,
    pub downloads: Vec<MatchResult>,
    pub unknowns: Vec<MatchResult>,
}

impl Classification {
    pub fn len(&self) -> usize {
        self.auto_fixes.len() + self.conflicts.len() + self.downloads.len() + self.unknowns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Anything left that needs the user.
    pub fn needs_dialog(&self) -> bool {
        !(self.conflicts.is_empty() && self.downloads.is_empty() && self.unknowns.is_empty())
    }
}

/// Partitions matcher output. AutoFix results become instructions right away.
pub fn classify(results: Vec<MatchResult>) -> Classification {
    let mut classification = Classification::default();
    for result in results {
        match bucket_of(&result) {
            Bucket::AutoFix => {
                let MatchResult {
                    node_id,
                    widget_name,
                    old_value,
                    mut candidates,
                    ..
                } = result;
                classification.auto_fixes.push(FixInstruction {
                    node_id,
                    widget_name,
                    new_value: candidates.remove(0),
                    old_value,
                });
            }
            Bucket::Conflict => classification.conflicts.push(result),
            Bucket::Download => classification.downloads.push(result),
            Bucket::Unknown => classification.unknowns.push(result),
        }
    }
    classification
}
