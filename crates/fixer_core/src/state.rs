use std::collections::BTreeMap;

use crate::cache::ScanResultCache;
use crate::dialog::DialogModel;
use crate::download::DownloadTask;
use crate::view_model::{dialog_view, FixerViewModel};

/// Session-scoped state: scan cache, download registry and the open dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixerState {
    cache: ScanResultCache,
    tasks: BTreeMap<String, DownloadTask>,
    dialog: Option<DialogModel>,
    dirty: bool,
}

impl FixerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> FixerViewModel {
        FixerViewModel {
            dialog: self
                .dialog
                .as_ref()
                .map(|dialog| dialog_view(dialog, &self.tasks)),
            in_flight_downloads: self.in_flight_count(),
            dirty: self.dirty,
        }
    }

    pub fn cache(&self) -> &ScanResultCache {
        &self.cache
    }

    pub fn dialog(&self) -> Option<&DialogModel> {
        self.dialog.as_ref()
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn task(&self, filename: &str) -> Option<&DownloadTask> {
        self.tasks.get(filename)
    }

    pub fn in_flight_count(&self) -> usize {
        self.tasks.values().filter(|task| task.is_in_flight()).count()
    }

    /// Returns whether anything visible changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn cache_mut(&mut self) -> &mut ScanResultCache {
        &mut self.cache
    }

    pub(crate) fn task_mut(&mut self, filename: &str) -> Option<&mut DownloadTask> {
        self.tasks.get_mut(filename)
    }

    /// Registers a task or refreshes its source. In-flight tasks keep their state.
    pub(crate) fn upsert_task(&mut self, task: DownloadTask) {
        match self.tasks.get_mut(&task.filename) {
            Some(existing) if existing.is_in_flight() => {
                if existing.url.is_none() {
                    existing.url = task.url;
                }
                if existing.model_type.is_none() {
                    existing.model_type = task.model_type;
                }
            }
            _ => {
                self.tasks.insert(task.filename.clone(), task);
            }
        }
    }

    /// Registers a task unless one exists; an existing task only gains missing source fields.
    pub(crate) fn ensure_task(&mut self, task: DownloadTask) {
        match self.tasks.get_mut(&task.filename) {
            Some(existing) => {
                if existing.url.is_none() {
                    existing.url = task.url;
                }
                if existing.model_type.is_none() {
                    existing.model_type = task.model_type;
                }
            }
            None => {
                self.tasks.insert(task.filename.clone(), task);
            }
        }
    }

    pub(crate) fn open_dialog(&mut self, dialog: DialogModel) {
        self.dialog = Some(dialog);
        self.mark_dirty();
    }

    pub(crate) fn dialog_mut(&mut self) -> Option<&mut DialogModel> {
        self.dialog.as_mut()
    }

    pub(crate) fn take_dialog(&mut self) -> Option<DialogModel> {
        let dialog = self.dialog.take();
        if dialog.is_some() {
            self.mark_dirty();
        }
        dialog
    }
}
