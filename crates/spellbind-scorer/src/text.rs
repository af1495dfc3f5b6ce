//! Tokenization and scoring-blob assembly.
//!
//! The tokenizer is deliberately simple and must stay in lockstep with the
//! external scorer: lowercase, strip everything outside `[a-z0-9]`, split
//! on whitespace, drop tokens of length <= 2. Any drift between the two
//! implementations would make local and external scores diverge.

use spellbind_types::SpellText;

/// Minimum token length kept by the tokenizer (exclusive bound: tokens of
/// this length or shorter are dropped).
pub const MIN_TOKEN_LEN: usize = 2;

/// Tokenize free text for scoring.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|w| w.len() > MIN_TOKEN_LEN)
        .map(String::from)
        .collect()
}

/// Combine a spell's text fields into one scoring blob.
///
/// The name is included twice -- duplication, not weighting -- so that
/// name-token matches dominate over incidental description overlap.
pub fn scoring_blob(spell: &SpellText) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !spell.name.is_empty() {
        parts.push(&spell.name);
        parts.push(&spell.name);
    }
    if !spell.desc.is_empty() {
        parts.push(&spell.desc);
    }
    for effect in &spell.effects {
        if !effect.is_empty() {
            parts.push(effect);
        }
    }
    parts.join(" ")
}

/// Tokenize a spell's combined scoring blob.
pub fn tokenize_spell(spell: &SpellText) -> Vec<String> {
    tokenize(&scoring_blob(spell))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_lowercases_and_strips_punctuation() {
        let tokens = tokenize("Fireball: a MIGHTY explosion!");
        assert_eq!(tokens, vec!["fireball", "mighty", "explosion"]);
    }

    #[test]
    fn short_tokens_are_dropped() {
        let tokens = tokenize("an of to ice age 42 123");
        assert_eq!(tokens, vec!["ice", "age", "123"]);
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("!! ?? ..").is_empty());
    }

    #[test]
    fn blob_counts_name_twice() {
        let spell = SpellText {
            name: String::from("Firebolt"),
            desc: String::from("A bolt of fire"),
            effects: vec![String::from("Fire Damage")],
        };
        let tokens = tokenize_spell(&spell);
        let firebolt_count = tokens.iter().filter(|t| *t == "firebolt").count();
        assert_eq!(firebolt_count, 2);
        assert!(tokens.contains(&String::from("bolt")));
        assert!(tokens.contains(&String::from("damage")));
    }

    #[test]
    fn blob_skips_empty_fields() {
        let spell = SpellText {
            name: String::new(),
            desc: String::new(),
            effects: vec![String::new()],
        };
        assert_eq!(scoring_blob(&spell), "");
    }
}
