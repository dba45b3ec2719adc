//! In-memory state for one interactive session.

use crate::core::message::{greeting, ChatMessage};
use crate::core::profile::UserProfile;
use crate::core::records::GenerationRecord;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Welcome,
    Login,
    Dashboard,
}

impl Page {
    pub fn as_str(self) -> &'static str {
        match self {
            Page::Welcome => "welcome",
            Page::Login => "login",
            Page::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a history index does not name a saved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryIndexError {
    pub index: usize,
    pub len: usize,
}

impl fmt::Display for HistoryIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len == 0 {
            write!(f, "No saved history (index {})", self.index)
        } else {
            write!(
                f,
                "History index {} out of range (0 to {})",
                self.index,
                self.len - 1
            )
        }
    }
}

impl std::error::Error for HistoryIndexError {}

/// Counts shown at the top of the history panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySummary {
    pub saved_records: usize,
    pub chat_messages: usize,
}

impl HistorySummary {
    pub fn total(&self) -> usize {
        self.saved_records + self.chat_messages
    }
}

/// Page, profile, saved history, chat transcript and the unsaved current output.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub page: Page,
    pub profile: Option<UserProfile>,
    history: Vec<GenerationRecord>,
    chat: Vec<ChatMessage>,
    pub current_output: Option<GenerationRecord>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved records, oldest first.
    pub fn history(&self) -> &[GenerationRecord] {
        &self.history
    }

    /// Saved records, newest first, as the history panel lists them.
    pub fn history_newest_first(&self) -> impl Iterator<Item = &GenerationRecord> {
        self.history.iter().rev()
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub fn history_summary(&self) -> HistorySummary {
        HistorySummary {
            saved_records: self.history.len(),
            chat_messages: self.chat.len(),
        }
    }

    /// Append the current output to history. Returns `false` when there is none.
    ///
    /// The current output stays in place so it can still be exported.
    pub fn save_current(&mut self) -> bool {
        match &self.current_output {
            Some(record) => {
                self.history.push(record.clone());
                debug!(saved = self.history.len(), "Saved current output to history");
                true
            }
            None => false,
        }
    }

    pub fn push_history(&mut self, record: GenerationRecord) {
        self.history.push(record);
    }

    /// Delete a saved record; `index_from_newest` 0 is the most recently saved one.
    pub fn delete_history(
        &mut self,
        index_from_newest: usize,
    ) -> Result<GenerationRecord, HistoryIndexError> {
        let len = self.history.len();
        if index_from_newest >= len {
            return Err(HistoryIndexError {
                index: index_from_newest,
                len,
            });
        }
        let removed = self.history.remove(len - 1 - index_from_newest);
        debug!(index_from_newest, remaining = self.history.len(), "Deleted history record");
        Ok(removed)
    }

    /// Seed the greeting when the transcript is empty. Returns whether it was seeded.
    pub fn seed_chat(&mut self, name: &str) -> bool {
        if !self.chat.is_empty() {
            return false;
        }
        self.chat.push(greeting(name));
        true
    }

    pub fn push_chat(&mut self, message: ChatMessage) {
        self.chat.push(message);
    }

    /// Clear the profile and go back to the welcome page.
    ///
    /// History, chat and the current output survive until the process exits.
    pub fn logout(&mut self) {
        self.profile = None;
        self.page = Page::Welcome;
        debug!(
            history = self.history.len(),
            chat = self.chat.len(),
            "Logged out; session collections retained"
        );
    }
}
