// Moderation Service Implementations

use regex::Regex;
use std::sync::Arc;

use crate::domains::moderation::{
    build_word_regex, find_banned_words, find_contact_info, mask_spans, Screened, BLUR_TOKEN,
    CONTACT_REDACTION_PLACEHOLDER, DEFAULT_BANNED_WORDS,
};
use crate::kernel::traits::BaseModerationService;

// =============================================================================
// Ruleset-based Moderation Service
// =============================================================================

/// Screens messages against the configured ruleset: contact-info patterns
/// redact the whole body and direct a freeze; banned words are masked in
/// place and only blur the message.
pub struct RulesetModerationService {
    word_regex: Option<Regex>,
}

impl RulesetModerationService {
    /// Build from the default word list plus any extra configured words.
    pub fn new(extra_words: &[String]) -> Self {
        let mut words: Vec<String> = DEFAULT_BANNED_WORDS.iter().map(|w| w.to_string()).collect();
        words.extend(extra_words.iter().cloned());

        Self {
            word_regex: build_word_regex(&words),
        }
    }
}

impl BaseModerationService for RulesetModerationService {
    fn screen(&self, text: &str) -> Screened {
        // Contact info is a hard stop: the raw content never survives.
        if !find_contact_info(text).is_empty() {
            return Screened {
                content: CONTACT_REDACTION_PLACEHOLDER.to_string(),
                freeze: true,
                blurred: false,
            };
        }

        if let Some(word_regex) = &self.word_regex {
            let spans = find_banned_words(text, word_regex);
            if !spans.is_empty() {
                return Screened {
                    content: mask_spans(text, &spans, BLUR_TOKEN),
                    freeze: false,
                    blurred: true,
                };
            }
        }

        Screened::clean(text)
    }
}

// =============================================================================
// No-op Service (for testing or when moderation is disabled)
// =============================================================================

/// No-op moderation that passes everything through unchanged.
pub struct NoopModerationService;

impl BaseModerationService for NoopModerationService {
    fn screen(&self, text: &str) -> Screened {
        Screened::clean(text)
    }
}

// =============================================================================
// Factory function
// =============================================================================

/// Create a moderation service based on configuration
pub fn create_moderation_service(
    enabled: bool,
    extra_words: &[String],
) -> Arc<dyn BaseModerationService> {
    if !enabled {
        tracing::warn!("message moderation disabled");
        return Arc::new(NoopModerationService);
    }

    tracing::info!(
        extra_words = extra_words.len(),
        "message moderation enabled with ruleset screening"
    );
    Arc::new(RulesetModerationService::new(extra_words))
}
