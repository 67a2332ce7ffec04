//! Property-based tests for the script language primitives
//!
//! These tests verify:
//! - The delete/move guard over arbitrary safe names
//! - Tokenizer splitting and quoting
//! - Marker and list parsing
//! - Decimal to hex encodings

use proptest::prelude::*;

use packscript::{
    decimal_to_hex, decimal_to_reversed_hex, is_dangerous_combination, list_items, platform_marker,
    tokenize_line, Platform, PROTECTED_ROOTS, ULTRA_PROTECTED_ROOTS,
};

fn safe_name() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,12}"
}

fn protected_root() -> impl Strategy<Value = &'static str> {
    prop::sample::select(PROTECTED_ROOTS.to_vec())
}

// =============================================================================
// Guard
// =============================================================================

proptest! {
    #[test]
    fn guard_rejects_roots_and_bare_wildcards(root in protected_root()) {
        prop_assert!(is_dangerous_combination(root));
        let star = format!("{}*", root);
        let star_dir = format!("{}*/", root);
        prop_assert!(is_dangerous_combination(&star));
        prop_assert!(is_dangerous_combination(&star_dir));
    }

    #[test]
    fn guard_allows_safe_children_outside_ultra_roots(root in protected_root(), name in safe_name()) {
        let child = format!("{}{}/", root, name);
        let ultra = ULTRA_PROTECTED_ROOTS.contains(&root);
        prop_assert_eq!(is_dangerous_combination(&child), ultra);
    }

    #[test]
    fn guard_rejects_traversal_anywhere(a in safe_name(), b in safe_name()) {
        let up = format!("sdmc:/{}/../{}", a, b);
        let usb = format!("usb:/{}/../{}", a, b);
        prop_assert!(is_dangerous_combination(&up));
        prop_assert!(is_dangerous_combination(&usb));
    }

    #[test]
    fn guard_allows_deep_wildcards(a in safe_name(), ext in "[a-z]{1,4}") {
        let pattern = format!("sdmc:/switch/{}/*.{}", a, ext);
        prop_assert!(!is_dangerous_combination(&pattern));
    }
}

// =============================================================================
// Tokenizer
// =============================================================================

proptest! {
    #[test]
    fn tokenizer_splits_plain_words(words in prop::collection::vec("[A-Za-z0-9_:/.{}()-]{1,10}", 1..8)) {
        let line = words.join("  ");
        prop_assert_eq!(tokenize_line(&line), words);
    }

    #[test]
    fn tokenizer_keeps_quoted_span_whole(cmd in "[a-z]{1,8}", parts in prop::collection::vec("[a-z0-9]{1,6}", 1..5)) {
        let phrase = parts.join(" ");
        let line = format!("{} '{}'", cmd, phrase);
        prop_assert_eq!(tokenize_line(&line), vec![cmd, phrase]);
    }

    #[test]
    fn tokenizer_never_yields_empty_tokens(line in "[ a-z']{0,40}") {
        prop_assert!(tokenize_line(&line).iter().all(|t| !t.is_empty()));
    }
}

// =============================================================================
// Markers and lists
// =============================================================================

fn mixed_case(word: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), word.len()).prop_map(move |upper| {
        word.chars()
            .zip(upper)
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

proptest! {
    #[test]
    fn platform_markers_ignore_case(erista in mixed_case("erista"), mariko in mixed_case("mariko")) {
        prop_assert_eq!(platform_marker(&format!("{}:", erista)), Some(Platform::Erista));
        prop_assert_eq!(platform_marker(&format!("{}:", mariko)), Some(Platform::Mariko));
        prop_assert_eq!(platform_marker(&erista), None);
    }

    #[test]
    fn list_items_strip_brackets_and_spaces(items in prop::collection::vec("[a-z0-9]{1,8}", 1..6)) {
        prop_assert_eq!(list_items(&format!("({})", items.join(", "))), items.clone());
        prop_assert_eq!(list_items(&format!("[{}]", items.join(","))), items.clone());
        prop_assert_eq!(list_items(&items.join("\n")), items);
    }
}

// =============================================================================
// Hex encodings
// =============================================================================

proptest! {
    #[test]
    fn decimal_hex_decodes_to_value(n in any::<u32>()) {
        let encoded = decimal_to_hex(&n.to_string()).unwrap();
        let bytes = hex::decode(&encoded).unwrap();
        let value = bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
        prop_assert_eq!(value, u64::from(n));
        prop_assert!(bytes.len() == 1 || bytes[0] != 0);
    }

    #[test]
    fn reversed_decimal_is_byte_reversal(n in any::<u32>()) {
        let forward = hex::decode(decimal_to_hex(&n.to_string()).unwrap()).unwrap();
        let mut reversed = hex::decode(decimal_to_reversed_hex(&n.to_string()).unwrap()).unwrap();
        reversed.reverse();
        prop_assert_eq!(forward, reversed);
    }
}
