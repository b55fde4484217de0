
use crate::wire::{FixInstruction, MatchResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictChoice {
    pub result: MatchResult,
    /// Index into `result.candidates`; starts at the first candidate.
    pub selected: usize,
}

impl ConflictChoice {
    pub fn selected_path(&self) -> Option<&str> {
        self.result.candidates.get(self.selected).map(String::as_str)
    }
}

/// Content of the open resolution dialog.
///
/// Download rows only carry filenames; their state lives in the task registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogModel {
    pub conflicts: Vec<ConflictChoice>,
    pub downloads: Vec<String>,
    pub unknowns: Vec<MatchResult>,
}

impl DialogModel {
    pub fn new<I>(conflicts: &[MatchResult], downloads: I, unknowns: &[MatchResult]) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut rows: Vec<String> = Vec::new();
        for filename in downloads {
            if !rows.contains(&filename) {
                rows.push(filename);
            }
        }
        Self {
            conflicts: conflicts
                .iter()
                .cloned()
                .map(|result| ConflictChoice {
                    result,
                    selected: 0,
                })
                .collect(),
            downloads: rows,
            unknowns: unknowns.to_vec(),
        }
    }

    /// Changes the chosen candidate of a conflict row. Returns whether it changed.
    pub fn select(&mut self, key: &str, index: usize) -> bool {
        let Some(choice) = self.conflicts.iter_mut().find(|c| c.result.key() == key) else {
            return false;
        };
        if index >= choice.result.candidates.len() || choice.selected == index {
            return false;
        }
        choice.selected = index;
        true
    }

    /// One instruction per conflict, carrying the chosen path.
    pub fn fixes(&self) -> Vec<FixInstruction> {
        self.conflicts
            .iter()
            .filter_map(|choice| {
                let path = choice.selected_path()?;
                Some(FixInstruction {
                    node_id: choice.result.node_id,
                    widget_name: choice.result.widget_name.clone(),
                    new_value: path.to_string(),
                    old_value: choice.result.old_value.clone(),
                })
            })
            .collect()
    }
}
