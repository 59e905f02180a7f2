//! Moderation pipeline - pure screening of outbound message text.
//!
//! Two rules run in order:
//!
//! 1. Contact-info detection (phone-shaped digit runs). A single match
//!    replaces the *entire* message body with [`CONTACT_REDACTION_PLACEHOLDER`]
//!    and directs the caller to freeze the conversation. The raw text is
//!    never persisted once this fires.
//! 2. Profanity masking (configurable word list, word-boundary safe,
//!    case-insensitive). Matches are replaced in place with [`BLUR_TOKEN`];
//!    this blurs the message but does not freeze anything.
//!
//! Everything here is pure and stateless. The injectable service wrapper
//! lives in `kernel::moderation`.

pub mod detector;
pub mod redactor;

pub use detector::{build_word_regex, find_banned_words, find_contact_info, DEFAULT_BANNED_WORDS};
pub use redactor::mask_spans;

/// Replacement body for a message caught sharing contact information.
pub const CONTACT_REDACTION_PLACEHOLDER: &str =
    "[message removed: sharing contact information is not allowed]";

/// Fixed-width mask for banned words.
pub const BLUR_TOKEN: &str = "****";

/// Display prefix applied to administrator override messages instead of
/// moderation filtering.
pub const ADMIN_MESSAGE_PREFIX: &str = "[Administrator]";

/// Result of screening one outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screened {
    /// Text safe to persist.
    pub content: String,
    /// Conversation must be frozen before any further participant traffic.
    pub freeze: bool,
    /// At least one word was masked.
    pub blurred: bool,
}

impl Screened {
    /// Screening outcome that passes text through untouched.
    pub fn clean(text: &str) -> Self {
        Self {
            content: text.to_string(),
            freeze: false,
            blurred: false,
        }
    }
}
