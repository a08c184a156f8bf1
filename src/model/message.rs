#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

impl Speaker {
    /// Label shown in front of the text, also the key into the colour map.
    pub fn label(self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Bot => "Bot",
        }
    }
}

/// One transcript entry. Insertion order in the log is the only ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }
}
