//! Property tests for the chat pipeline, safety filter and negotiator.

use proptest::prelude::*;
use serde_json::{Map, Value};
use tether::chat::{kick_reason, strip_codes, Decoder};
use tether::protocol::{Candidate, ChatPayload, GameVersion, Negotiator, VersionLadder};
use tether::security::{FilterRule, SafetyFilter};

const CODES: &str = "0123456789abcdefklmnorABCDEFKLMNOR";

fn has_code(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    chars
        .windows(2)
        .any(|w| w[0] == '§' && CODES.contains(w[1]))
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z §\n]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::hash_map("(text|extra|translate|with|fallback|color)", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

proptest! {
    #[test]
    fn strip_is_idempotent(text in "[a-z0-9 §rR]{0,40}") {
        let once = strip_codes(&text);
        prop_assert_eq!(strip_codes(&once), once.clone());
        prop_assert!(!has_code(&once));
    }

    #[test]
    fn strip_keeps_plain_text(text in "[a-zA-Z0-9 .,!?]{0,60}") {
        prop_assert_eq!(strip_codes(&text), text);
    }

    #[test]
    fn forbidden_substring_always_blocks(prefix in "[a-z ]{0,20}", suffix in "[a-z ]{0,20}") {
        let filter = SafetyFilter::default();
        let message = format!("{prefix}${suffix}");
        prop_assert_eq!(filter.check(&message), Err(FilterRule::Forbidden("$".to_string())));
    }

    #[test]
    fn over_long_messages_block(len in 257usize..600) {
        let filter = SafetyFilter::default();
        let message = "x".repeat(len);
        prop_assert!(!filter.is_safe(&message));
    }

    #[test]
    fn accepted_messages_satisfy_every_rule(message in "[a-zA-Z0-9 /$]{0,300}") {
        let filter = SafetyFilter::default();
        if filter.is_safe(&message) {
            prop_assert!(!message.contains('$'));
            prop_assert!(message.chars().count() <= filter.max_length());
            prop_assert!(!message.trim().is_empty());
        }
    }

    #[test]
    fn decoded_lines_are_clean(json in arb_json()) {
        if let Some(line) = Decoder::default().decode(&ChatPayload::from_json(json)) {
            prop_assert!(!line.is_empty());
            prop_assert_eq!(line.trim(), line.as_str());
            prop_assert!(!line.contains("  "));
            prop_assert!(!line.contains('\n'));
            prop_assert!(!has_code(&line));
        }
    }

    #[test]
    fn player_chat_renders_sender_and_body(
        sender in "[A-Za-z0-9_]{1,16}",
        body in "[a-z]{1,10}( [a-z]{1,10}){0,3}",
    ) {
        let payload = ChatPayload::from_json(serde_json::json!({
            "translate": "chat.type.text",
            "with": [{"text": sender.clone()}, body.clone()],
        }));
        prop_assert_eq!(
            Decoder::default().decode(&payload),
            Some(format!("[{sender}] {body}"))
        );
    }

    #[test]
    fn kick_reason_is_never_empty(json in arb_json()) {
        prop_assert!(!kick_reason(&json).is_empty());
    }

    #[test]
    fn ladder_restarts_three_times_then_exhausts(n in 1u32..8) {
        let ladder = VersionLadder::new((0..n).map(|p| GameVersion::new(1, 20, Some(p))).collect()).unwrap();
        let mut negotiator = Negotiator::new(ladder);
        let mut tried = 0;
        let mut restarts = 0;
        loop {
            match negotiator.next_candidate() {
                Candidate::Try(_) => {
                    tried += 1;
                    negotiator.advance();
                },
                Candidate::Restart { .. } => restarts += 1,
                Candidate::Exhausted { attempts } => {
                    prop_assert_eq!(attempts, 4);
                    break;
                },
            }
        }
        prop_assert_eq!(restarts, 3);
        prop_assert_eq!(tried, 4 * n);
    }
}
