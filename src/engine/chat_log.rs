use std::sync::mpsc::{self, Receiver, Sender};

use crate::model::message::ChatMessage;

/// The transcript shown in the chat panel.
///
/// Only the control thread owns a `ChatLog` and appends to it directly.
/// Background work gets a [`LogSender`] instead; what it sends is queued
/// on a channel and lands in the transcript on the next
/// [`ChatLog::drain_pending`]. Entries are never edited or removed.
pub struct ChatLog {
    entries: Vec<ChatMessage>,
    tx: Sender<ChatMessage>,
    rx: Receiver<ChatMessage>,
}

/// Append handle for background threads.
#[derive(Clone)]
pub struct LogSender(Sender<ChatMessage>);

impl LogSender {
    pub fn append(&self, message: ChatMessage) {
        // A closed channel means the application is shutting down.
        let _ = self.0.send(message);
    }
}

impl ChatLog {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            entries: Vec::new(),
            tx,
            rx,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.entries.push(message);
    }

    pub fn sender(&self) -> LogSender {
        LogSender(self.tx.clone())
    }

    /// Move every message queued by background threads into the transcript.
    /// Returns how many were added.
    pub fn drain_pending(&mut self) -> usize {
        let before = self.entries.len();
        while let Ok(message) = self.rx.try_recv() {
            self.entries.push(message);
        }
        self.entries.len() - before
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}
