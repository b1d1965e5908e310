use std::collections::VecDeque;

use chrono::NaiveDate;
use tracing::info;

use crate::{config::DEFAULT_UNDO_CAPACITY, errors::LedgerError};

use super::{entry::Entry, service::LedgerService};

const LABEL_WIDTH: usize = 20;

/// What a recorded mutation changed, with enough state to reverse it.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoKind {
    AddEntry { entry: Entry },
    DeleteEntry { entry: Entry },
    EditEntry { old: Entry, new: Entry },
    SetScreenTime { old: String, new: String },
    SetJournal { old: String, new: String },
}

/// One reversible mutation against the day at `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoAction {
    pub date: NaiveDate,
    pub description: String,
    pub kind: UndoKind,
}

impl UndoAction {
    pub fn new(date: NaiveDate, kind: UndoKind) -> Self {
        let description = match &kind {
            UndoKind::AddEntry { entry } => format!("Added '{}'", truncate(&entry.description)),
            UndoKind::DeleteEntry { entry } => {
                format!("Deleted '{}'", truncate(&entry.description))
            }
            UndoKind::EditEntry { old, .. } => format!("Edited '{}'", truncate(&old.description)),
            UndoKind::SetScreenTime { new, .. } => format!("Changed screen time to '{}'", new),
            UndoKind::SetJournal { .. } => "Edited journal".to_string(),
        };
        Self {
            date,
            description,
            kind,
        }
    }
}

/// Bounded LIFO of recorded mutations. The oldest action is dropped once capacity is reached.
#[derive(Debug, Clone)]
pub struct UndoManager {
    actions: VecDeque<UndoAction>,
    capacity: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoManager {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_UNDO_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            actions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, action: UndoAction) {
        self.actions.push_back(action);
        while self.actions.len() > self.capacity {
            self.actions.pop_front();
        }
    }

    pub fn record_add_entry(&mut self, date: NaiveDate, entry: &Entry) {
        self.push(UndoAction::new(
            date,
            UndoKind::AddEntry {
                entry: entry.clone(),
            },
        ));
    }

    pub fn record_delete_entry(&mut self, date: NaiveDate, entry: &Entry) {
        self.push(UndoAction::new(
            date,
            UndoKind::DeleteEntry {
                entry: entry.clone(),
            },
        ));
    }

    pub fn record_edit_entry(&mut self, date: NaiveDate, old: &Entry, new: &Entry) {
        self.push(UndoAction::new(
            date,
            UndoKind::EditEntry {
                old: old.clone(),
                new: new.clone(),
            },
        ));
    }

    pub fn record_set_screen_time(&mut self, date: NaiveDate, old: &str, new: &str) {
        self.push(UndoAction::new(
            date,
            UndoKind::SetScreenTime {
                old: old.to_string(),
                new: new.to_string(),
            },
        ));
    }

    pub fn record_set_journal(&mut self, date: NaiveDate, old: &str, new: &str) {
        self.push(UndoAction::new(
            date,
            UndoKind::SetJournal {
                old: old.to_string(),
                new: new.to_string(),
            },
        ));
    }

    /// Reverses the most recent action through `ledger` and describes what was undone.
    ///
    /// Returns `Ok(None)` when there is nothing to undo. The action is popped before it is
    /// applied, so a failed undo is not retried.
    pub fn undo(&mut self, ledger: &mut LedgerService) -> Result<Option<String>, LedgerError> {
        let Some(action) = self.actions.pop_back() else {
            return Ok(None);
        };
        let shared = ledger.get_day(action.date)?;
        let message = {
            let mut day = shared.borrow_mut();
            match &action.kind {
                UndoKind::AddEntry { entry } => {
                    day.remove_entry(entry.id);
                    format!("Undo: Removed '{}'", truncate(&entry.description))
                }
                UndoKind::DeleteEntry { entry } => {
                    day.add_entry(entry.clone());
                    format!("Undo: Restored '{}'", truncate(&entry.description))
                }
                UndoKind::EditEntry { old, .. } => {
                    day.update_entry(old.clone());
                    format!("Undo: Reverted '{}'", truncate(&old.description))
                }
                UndoKind::SetScreenTime { old, .. } => {
                    day.set_screen_time(old.as_str());
                    format!("Undo: Restored screen time to '{}'", old)
                }
                UndoKind::SetJournal { old, .. } => {
                    day.journal = old.clone();
                    "Undo: Restored journal".to_string()
                }
            }
        };
        ledger.save_day(&shared)?;

        let (no_entries, no_journal) = {
            let day = shared.borrow();
            (day.entries.is_empty(), !day.has_journal())
        };
        if no_entries {
            ledger.delete_day(action.date)?;
        }
        if no_journal && matches!(action.kind, UndoKind::SetJournal { .. }) {
            ledger.delete_journal(action.date)?;
        }
        info!(date = %action.date, action = %action.description, "undo applied");
        Ok(Some(message))
    }

    pub fn can_undo(&self) -> bool {
        !self.actions.is_empty()
    }

    /// The action the next [`UndoManager::undo`] would reverse.
    pub fn peek(&self) -> Option<&UndoAction> {
        self.actions.back()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

/// Shortens `text` to the label width, marking the cut with `...`.
fn truncate(text: &str) -> String {
    if text.chars().count() <= LABEL_WIDTH {
        return text.to_string();
    }
    let kept: String = text.chars().take(LABEL_WIDTH - 3).collect();
    format!("{}...", kept)
}
