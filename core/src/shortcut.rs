//! Keyboard shortcuts, decoded from plain key data so the mapping is
//! testable without a browser.

/// Where a key press landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTarget {
    Body,
    TextField,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyChord {
    pub key: String,
    pub code: String,
    pub ctrl: bool,
    pub meta: bool,
    pub repeat: bool,
    pub target: KeyTarget,
}

impl KeyChord {
    pub fn new(key: impl Into<String>, target: KeyTarget) -> Self {
        Self {
            key: key.into(),
            code: String::new(),
            ctrl: false,
            meta: false,
            repeat: false,
            target,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_command(mut self) -> Self {
        self.ctrl = true;
        self
    }

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    ResetPhotos,
    ToggleInteractive,
    Reveal,
    ClearEffects,
    /// Zero-based slot position.
    QuickSelect(usize),
}

impl Shortcut {
    /// Maps a key press to a shortcut. `slot_count` bounds quick-select.
    pub fn decode(chord: &KeyChord, slot_count: usize) -> Option<Self> {
        if chord.repeat {
            return None;
        }
        if chord.command() {
            return match chord.key.as_str() {
                "r" | "R" => Some(Shortcut::ResetPhotos),
                "i" | "I" => Some(Shortcut::ToggleInteractive),
                _ => None,
            };
        }
        if chord.target == KeyTarget::TextField {
            return None;
        }
        match chord.key.as_str() {
            "Escape" => Some(Shortcut::ClearEffects),
            " " if chord.target == KeyTarget::Body => Some(Shortcut::Reveal),
            key => {
                let digit = key.parse::<usize>().ok()?;
                let index = digit.checked_sub(1)?;
                (digit <= slot_count.min(9)).then_some(Shortcut::QuickSelect(index))
            }
        }
    }

    /// Whether the browser's own handling of the key must be suppressed.
    pub fn prevents_default(self) -> bool {
        matches!(
            self,
            Shortcut::ResetPhotos | Shortcut::ToggleInteractive | Shortcut::Reveal
        )
    }
}
