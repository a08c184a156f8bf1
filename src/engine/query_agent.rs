use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use crate::engine::chat_log::LogSender;
use crate::engine::llm_client::{ChatBackend, ChatTurn};
use crate::model::message::ChatMessage;

pub const SYSTEM_PROMPT: &str = "Tu es un assistant Dofus Rétro. Tu aides le joueur sans proposer \
d'automatisation. Sois concis en français.";

/// Prefix of every chat line produced from a failed API call.
pub const ERROR_MARKER: &str = "Erreur API: ";
pub const KEY_ERROR_MARKER: &str = "Erreur clé: ";

/// Runs free-text questions against the chat backend.
///
/// Every call either yields the model's answer or an `ERROR_MARKER` line;
/// nothing raised by the backend escapes.
#[derive(Clone)]
pub struct QueryAgent {
    backend: Arc<dyn ChatBackend>,
    max_tokens: u32,
}

impl QueryAgent {
    pub fn new(backend: Arc<dyn ChatBackend>, max_tokens: u32) -> Self {
        Self {
            backend,
            max_tokens,
        }
    }

    pub fn conversation(text: &str) -> Vec<ChatTurn> {
        vec![ChatTurn::system(SYSTEM_PROMPT), ChatTurn::user(text)]
    }

    /// Blocking call. Prefer [`QueryAgent::spawn`] from the UI thread.
    pub fn query(&self, api_key: &str, text: &str) -> String {
        let turns = Self::conversation(text);
        let backend = &self.backend;

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            backend.complete(api_key, &turns, self.max_tokens)
        }));

        match result {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                warn!("external query failed: {e:#}");
                format!("{ERROR_MARKER}{e:#}")
            }
            Err(payload) => {
                let cause = panic_message(payload.as_ref());
                warn!("external query panicked: {cause}");
                format!("{ERROR_MARKER}{cause}")
            }
        }
    }

    /// Run [`QueryAgent::query`] on a fresh thread and append the answer as a
    /// bot message through `sink` when it is done.
    pub fn spawn(&self, api_key: String, text: String, sink: LogSender) -> io::Result<JoinHandle<()>> {
        let agent = self.clone();
        debug!("scheduling external query ({} chars)", text.chars().count());

        thread::Builder::new()
            .name("external-query".into())
            .spawn(move || {
                let answer = agent.query(&api_key, &text);
                info!("external query finished");
                sink.append(ChatMessage::bot(answer));
            })
    }

    pub fn check_key(&self, api_key: &str) -> String {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.backend.check_key(api_key)));

        match result {
            Ok(Ok(count)) => format!("Clé valide et API accessible ({count} modèles)."),
            Ok(Err(e)) => {
                warn!("API key check failed: {e:#}");
                format!("{KEY_ERROR_MARKER}{e:#}")
            }
            Err(payload) => format!("{KEY_ERROR_MARKER}{}", panic_message(payload.as_ref())),
        }
    }

    pub fn spawn_key_check(&self, api_key: String, sink: LogSender) -> io::Result<JoinHandle<()>> {
        let agent = self.clone();

        thread::Builder::new()
            .name("api-key-check".into())
            .spawn(move || sink.append(ChatMessage::bot(agent.check_key(&api_key))))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected failure".into()
    }
}
