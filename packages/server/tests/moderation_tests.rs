//! End-to-end tests for the message screening pipeline.

use api_core::domains::moderation::CONTACT_REDACTION_PLACEHOLDER;
use api_core::kernel::moderation::RulesetModerationService;
use api_core::kernel::BaseModerationService;

fn service() -> RulesetModerationService {
    RulesetModerationService::new(&[])
}

#[test]
fn plain_phone_run_is_redacted_and_freezes() {
    let result = service().screen("call me at 01012345678");

    assert!(result.freeze);
    assert_eq!(result.content, CONTACT_REDACTION_PLACEHOLDER);
}

#[test]
fn grouped_phone_numbers_are_detected() {
    for text in [
        "reach me on 010-1234-5678",
        "reach me on 010 1234 5678",
        "reach me on 010.1234.5678",
        "02-123-4567 is my office",
    ] {
        let result = service().screen(text);
        assert!(result.freeze, "expected freeze for: {text}");
        assert_eq!(result.content, CONTACT_REDACTION_PLACEHOLDER);
    }
}

#[test]
fn redaction_never_leaks_any_digits() {
    let result = service().screen("my number is 010-9876-5432, text me");

    assert!(!result.content.contains("9876"));
    assert!(!result.content.contains("010"));
}

#[test]
fn prices_and_small_numbers_are_not_phone_numbers() {
    for text in [
        "I can do it for 600 for 5 days",
        "the project needs 12000 words",
        "meet in room 101",
        "delivery in 10 days for 1500 credits",
    ] {
        let result = service().screen(text);
        assert!(!result.freeze, "false positive on: {text}");
        assert_eq!(result.content, text);
    }
}

#[test]
fn banned_word_is_masked_in_place() {
    let result = service().screen("you absolute idiot");

    assert!(result.blurred);
    assert!(!result.freeze);
    assert_eq!(result.content, "you absolute ****");
}

#[test]
fn masking_is_case_insensitive() {
    let result = service().screen("you absolute IDIOT");

    assert!(result.blurred);
    assert_eq!(result.content, "you absolute ****");
}

#[test]
fn banned_word_inside_a_larger_word_is_left_alone() {
    // Word-boundary matching only; substrings of honest words survive.
    let result = service().screen("the class on idioms starts tomorrow");

    assert!(!result.blurred);
    assert_eq!(result.content, "the class on idioms starts tomorrow");
}

#[test]
fn contact_info_wins_over_profanity() {
    let result = service().screen("idiot, call 010-1234-5678");

    assert!(result.freeze);
    assert!(!result.blurred);
    assert_eq!(result.content, CONTACT_REDACTION_PLACEHOLDER);
}

#[test]
fn clean_message_is_untouched() {
    let text = "could you add one more revision round?";
    let result = service().screen(text);

    assert!(!result.freeze);
    assert!(!result.blurred);
    assert_eq!(result.content, text);
}

#[test]
fn configured_extra_words_are_enforced() {
    let service = RulesetModerationService::new(&["paypal".to_string()]);

    let result = service.screen("let's settle via PayPal instead");

    assert!(result.blurred);
    assert_eq!(result.content, "let's settle via **** instead");
}
