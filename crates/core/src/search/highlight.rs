//! Excerpts with the first matching term marked.

use super::fold_case;

/// Characters of context kept on each side of the match.
const CONTEXT_CHARS: usize = 40;
/// Length of the fallback excerpt when nothing matches.
const PREFIX_CHARS: usize = 120;

/// Excerpt of `text` around the earliest occurrence of any of `terms`.
///
/// Terms are expected lowercased. The match is wrapped in `[` `]` and `...`
/// marks truncation on either side. Without a match the first characters of
/// the text are returned. Line breaks become spaces. All offsets count
/// characters, never bytes.
pub fn excerpt<'t>(text: &str, terms: impl IntoIterator<Item = &'t str>) -> String {
    if text.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let folded = fold_case(text);

    let mut best: Option<(usize, usize)> = None;
    for term in terms.into_iter().filter(|t| !t.is_empty()) {
        let Some(byte_idx) = folded.find(term) else {
            continue;
        };
        let idx = folded[..byte_idx].chars().count();
        if best.is_none_or(|(best_idx, _)| idx < best_idx) {
            best = Some((idx, term.chars().count()));
        }
    }

    let out = match best {
        Some((idx, len)) => {
            let start = idx.saturating_sub(CONTEXT_CHARS);
            let end = (idx + len + CONTEXT_CHARS).min(chars.len());
            let mut out = String::new();
            if start > 0 {
                out.push_str("...");
            }
            out.extend(&chars[start..idx]);
            out.push('[');
            out.extend(&chars[idx..idx + len]);
            out.push(']');
            out.extend(&chars[idx + len..end]);
            if end < chars.len() {
                out.push_str("...");
            }
            out
        }
        None => {
            let mut out: String = chars.iter().take(PREFIX_CHARS).collect();
            if chars.len() > PREFIX_CHARS {
                out.push_str("...");
            }
            out
        }
    };

    out.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_marks_match_in_short_text() {
        assert_snapshot!(
            excerpt("The quick brown fox jumps over the lazy dog", ["fox"]),
            @"The quick brown [fox] jumps over the lazy dog"
        );
    }

    #[test]
    fn test_keeps_original_case() {
        assert_snapshot!(excerpt("RUST is great", ["rust"]), @"[RUST] is great");
    }

    #[test]
    fn test_earliest_term_wins() {
        assert_snapshot!(excerpt("alpha beta gamma", ["gamma", "beta"]), @"alpha [beta] gamma");
    }

    #[test]
    fn test_newlines_flattened() {
        assert_snapshot!(
            excerpt("first line\nsecond match here", ["match"]),
            @"first line second [match] here"
        );
    }

    #[test]
    fn test_multibyte_offsets() {
        assert_snapshot!(excerpt("Caffè latte e cornetto", ["latte"]), @"Caffè [latte] e cornetto");
    }

    #[test]
    fn test_window_truncated_both_sides() {
        let text = format!("{}Needle{}", "x".repeat(50), "y".repeat(50));
        let expected = format!("...{}[Needle]{}...", "x".repeat(40), "y".repeat(40));
        assert_eq!(excerpt(&text, ["needle"]), expected);
    }

    #[test]
    fn test_no_match_falls_back_to_prefix() {
        let text = "é".repeat(130);
        let expected = format!("{}...", "é".repeat(120));
        assert_eq!(excerpt(&text, ["zzz"]), expected);
        assert_eq!(excerpt("short body", ["zzz"]), "short body");
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(excerpt("", ["a"]), "");
    }
}
