//! Soft keyboard visibility and text composition
//!
//! [`KeyboardController`] reference-counts requests for the on-screen
//! keyboard. Only the 0 -> 1 and 1 -> 0 crossings report a visibility change,
//! so the caller issues the host show/hide call exactly once per crossing.
//!
//! [`CompositionState`] tracks text the input method (or a dead key) has
//! inserted provisionally. Each composition step produces a [`TextInput`]
//! telling the receiver how many characters to delete before inserting the
//! new text, which maps composition onto a single-buffer text editor.

use crate::input::TextInput;
use tracing::debug;

/// Result of the last text event, as reported by `compose()`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ComposeStatus {
    /// The last event was not a composition event
    #[default]
    None,
    /// Provisional text replaced the previous composition
    Update,
    /// Composition finished; the text is final
    Commit,
}

/// Change in soft keyboard visibility the host must apply
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyboardVisibility {
    Show,
    Hide,
}

/// On-screen keyboard reference count plus composition state
#[derive(Debug, Default)]
pub struct KeyboardController {
    requests: u32,
    composition: CompositionState,
}

impl KeyboardController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request; returns `Show` on the 0 -> 1 transition
    pub fn request(&mut self) -> Option<KeyboardVisibility> {
        self.requests = self.requests.saturating_add(1);
        debug!(count = self.requests, "soft keyboard requested");
        (self.requests == 1).then_some(KeyboardVisibility::Show)
    }

    /// Drop a request; returns `Hide` on the 1 -> 0 transition
    ///
    /// Releasing with no outstanding request is a no-op. Any release resets
    /// the composition.
    pub fn release(&mut self) -> Option<KeyboardVisibility> {
        self.composition.reset();
        if self.requests == 0 {
            return None;
        }
        self.requests -= 1;
        debug!(count = self.requests, "soft keyboard released");
        (self.requests == 0).then_some(KeyboardVisibility::Hide)
    }

    /// Outstanding requests
    pub fn request_count(&self) -> u32 {
        self.requests
    }

    /// Whether the keyboard should be on screen
    pub fn is_visible(&self) -> bool {
        self.requests > 0
    }

    pub fn composition(&self) -> &CompositionState {
        &self.composition
    }

    pub fn composition_mut(&mut self) -> &mut CompositionState {
        &mut self.composition
    }
}

/// In-progress composition
#[derive(Debug, Default)]
pub struct CompositionState {
    composed: String,
    pending_accent: Option<char>,
    last_status: ComposeStatus,
    last_deletion: usize,
}

impl CompositionState {
    /// Whether provisional text is on screen
    pub fn is_active(&self) -> bool {
        !self.composed.is_empty()
    }

    /// Provisional text currently inserted
    pub fn composed(&self) -> &str {
        &self.composed
    }

    /// Dead key waiting for its base character
    pub fn pending_accent(&self) -> Option<char> {
        self.pending_accent
    }

    /// Report the last text event: deletion count and status
    pub fn compose(&self, deletion: &mut usize) -> ComposeStatus {
        *deletion = self.last_deletion;
        self.last_status
    }

    /// Forget the composition without producing an event
    pub fn reset(&mut self) {
        if self.is_active() {
            debug!("composition reset");
        }
        self.composed.clear();
        self.pending_accent = None;
        self.last_status = ComposeStatus::None;
        self.last_deletion = 0;
    }

    /// Mark that the last dispatched event was not a text event
    pub fn clear_status(&mut self) {
        self.last_status = ComposeStatus::None;
        self.last_deletion = 0;
    }

    /// Replace the provisional text
    pub fn update(&mut self, text: &str) -> TextInput {
        let deletion = self.composed.chars().count();
        self.composed.clear();
        self.composed.push_str(text);
        if text.is_empty() {
            self.pending_accent = None;
        }
        self.record(text.to_string(), deletion, ComposeStatus::Update)
    }

    /// Replace the provisional text with final text and end the composition
    pub fn commit(&mut self, text: &str) -> TextInput {
        let deletion = self.composed.chars().count();
        self.composed.clear();
        self.pending_accent = None;
        self.record(text.to_string(), deletion, ComposeStatus::Commit)
    }

    /// Delete the provisional text and end the composition
    pub fn cancel(&mut self) -> TextInput {
        self.commit("")
    }

    /// Start a dead-key composition showing the accent
    pub fn start_accent(&mut self, accent: char) -> TextInput {
        if let Some(pending) = self.pending_accent {
            if pending == accent {
                // Dead key pressed twice produces the accent itself
                return self.commit(&spacing_accent(accent).to_string());
            }
        }
        let shown = spacing_accent(accent).to_string();
        let input = self.update(&shown);
        self.pending_accent = Some(accent);
        input
    }

    /// Add a typed character to the composition
    ///
    /// With a pending dead key the character is combined with it and the
    /// result is committed.
    pub fn push_char(&mut self, ch: char) -> TextInput {
        if let Some(accent) = self.pending_accent {
            let committed = match combine_accent(accent, ch) {
                Some(combined) => combined.to_string(),
                None if ch == ' ' => spacing_accent(accent).to_string(),
                None => format!("{}{}", spacing_accent(accent), ch),
            };
            return self.commit(&committed);
        }
        let mut next = self.composed.clone();
        next.push(ch);
        self.update(&next)
    }

    /// Remove the last composed character
    pub fn backspace(&mut self) -> TextInput {
        let mut next = self.composed.clone();
        next.pop();
        self.pending_accent = None;
        self.update(&next)
    }

    fn record(&mut self, text: String, deletion: usize, status: ComposeStatus) -> TextInput {
        self.last_status = status;
        self.last_deletion = deletion;
        TextInput {
            text,
            deletion,
            status,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Accent {
    Grave,
    Acute,
    Circumflex,
    Tilde,
    Diaeresis,
    Ring,
    Cedilla,
}

fn classify_accent(accent: char) -> Option<Accent> {
    match accent {
        '\u{300}' | '`' => Some(Accent::Grave),
        '\u{301}' | '\u{b4}' | '\'' => Some(Accent::Acute),
        '\u{302}' | '^' => Some(Accent::Circumflex),
        '\u{303}' | '~' => Some(Accent::Tilde),
        '\u{308}' | '\u{a8}' | '"' => Some(Accent::Diaeresis),
        '\u{30a}' | '\u{b0}' => Some(Accent::Ring),
        '\u{327}' | '\u{b8}' => Some(Accent::Cedilla),
        _ => None,
    }
}

/// Printable form of a (possibly combining) accent
fn spacing_accent(accent: char) -> char {
    match classify_accent(accent) {
        Some(Accent::Grave) => '`',
        Some(Accent::Acute) => '\u{b4}',
        Some(Accent::Circumflex) => '^',
        Some(Accent::Tilde) => '~',
        Some(Accent::Diaeresis) => '\u{a8}',
        Some(Accent::Ring) => '\u{b0}',
        Some(Accent::Cedilla) => '\u{b8}',
        None => accent,
    }
}

/// Precomposed Latin-1 character for an accent and base letter
pub fn combine_accent(accent: char, base: char) -> Option<char> {
    let combined = match (classify_accent(accent)?, base) {
        (Accent::Grave, 'a') => 'à',
        (Accent::Grave, 'e') => 'è',
        (Accent::Grave, 'i') => 'ì',
        (Accent::Grave, 'o') => 'ò',
        (Accent::Grave, 'u') => 'ù',
        (Accent::Grave, 'A') => 'À',
        (Accent::Grave, 'E') => 'È',
        (Accent::Grave, 'I') => 'Ì',
        (Accent::Grave, 'O') => 'Ò',
        (Accent::Grave, 'U') => 'Ù',
        (Accent::Acute, 'a') => 'á',
        (Accent::Acute, 'e') => 'é',
        (Accent::Acute, 'i') => 'í',
        (Accent::Acute, 'o') => 'ó',
        (Accent::Acute, 'u') => 'ú',
        (Accent::Acute, 'y') => 'ý',
        (Accent::Acute, 'A') => 'Á',
        (Accent::Acute, 'E') => 'É',
        (Accent::Acute, 'I') => 'Í',
        (Accent::Acute, 'O') => 'Ó',
        (Accent::Acute, 'U') => 'Ú',
        (Accent::Acute, 'Y') => 'Ý',
        (Accent::Circumflex, 'a') => 'â',
        (Accent::Circumflex, 'e') => 'ê',
        (Accent::Circumflex, 'i') => 'î',
        (Accent::Circumflex, 'o') => 'ô',
        (Accent::Circumflex, 'u') => 'û',
        (Accent::Circumflex, 'A') => 'Â',
        (Accent::Circumflex, 'E') => 'Ê',
        (Accent::Circumflex, 'I') => 'Î',
        (Accent::Circumflex, 'O') => 'Ô',
        (Accent::Circumflex, 'U') => 'Û',
        (Accent::Tilde, 'a') => 'ã',
        (Accent::Tilde, 'n') => 'ñ',
        (Accent::Tilde, 'o') => 'õ',
        (Accent::Tilde, 'A') => 'Ã',
        (Accent::Tilde, 'N') => 'Ñ',
        (Accent::Tilde, 'O') => 'Õ',
        (Accent::Diaeresis, 'a') => 'ä',
        (Accent::Diaeresis, 'e') => 'ë',
        (Accent::Diaeresis, 'i') => 'ï',
        (Accent::Diaeresis, 'o') => 'ö',
        (Accent::Diaeresis, 'u') => 'ü',
        (Accent::Diaeresis, 'y') => 'ÿ',
        (Accent::Diaeresis, 'A') => 'Ä',
        (Accent::Diaeresis, 'E') => 'Ë',
        (Accent::Diaeresis, 'I') => 'Ï',
        (Accent::Diaeresis, 'O') => 'Ö',
        (Accent::Diaeresis, 'U') => 'Ü',
        (Accent::Ring, 'a') => 'å',
        (Accent::Ring, 'A') => 'Å',
        (Accent::Cedilla, 'c') => 'ç',
        (Accent::Cedilla, 'C') => 'Ç',
        _ => return None,
    };
    Some(combined)
}
