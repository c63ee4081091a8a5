//! Widget state: transcript, status banner, inputs and focus

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Agent,
}

/// One message in the transcript. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub sender: Sender,
    pub content: String,
    /// Tools the agent used for this reply; always empty for user turns
    pub tool_calls: Vec<String>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn agent(content: impl Into<String>, tool_calls: Vec<String>) -> Self {
        Self {
            sender: Sender::Agent,
            content: content.into(),
            tool_calls,
        }
    }
}

/// Append-only conversation log
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

/// Single-slot status banner
///
/// Every change bumps the generation. A pending auto-hide captures the
/// generation it was scheduled for and only hides that banner.
#[derive(Debug, Clone, Default)]
pub struct StatusBanner {
    current: Option<Banner>,
    generation: u64,
}

impl StatusBanner {
    /// Replace the banner, returning its generation
    pub fn show(&mut self, kind: BannerKind, text: impl Into<String>) -> u64 {
        self.generation += 1;
        self.current = Some(Banner {
            kind,
            text: text.into(),
        });
        self.generation
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    /// Hide the banner if it is still the one shown at `generation`
    pub fn hide_if(&mut self, generation: u64) -> bool {
        if self.generation == generation && self.current.is_some() {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&Banner> {
        self.current.as_ref()
    }
}

/// Which input has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Message,
    ApiKey,
    None,
}

/// Everything the widget displays
#[derive(Debug, Clone)]
pub struct WidgetState {
    pub transcript: Transcript,
    pub banner: StatusBanner,
    pub message_input: String,
    pub api_key_input: String,
    pub send_enabled: bool,
    pub focus: Focus,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            transcript: Transcript::default(),
            banner: StatusBanner::default(),
            message_input: String::new(),
            api_key_input: String::new(),
            send_enabled: true,
            focus: Focus::Message,
        }
    }
}

impl WidgetState {
    /// Trimmed credential field, `None` when blank
    pub fn api_key(&self) -> Option<String> {
        let key = self.api_key_input.trim();
        (!key.is_empty()).then(|| key.to_string())
    }
}
