//! Query string grammar.

use std::sync::LazyLock;

use regex::Regex;

use super::fold_case;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"|(\S+)"#).unwrap());

/// Split on whitespace, keeping `"quoted phrases"` together without quotes.
///
/// An unterminated quote is not special: it stays part of a plain token.
pub fn tokenize(input: &str) -> Vec<String> {
    TOKEN_RE
        .captures_iter(input)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A query reduced to OR'ed clauses of AND'ed terms plus exclusions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Tokens as written, quotes removed.
    pub tokens: Vec<String>,
    /// Lowercased terms; a note matches when every term of any clause does.
    pub clauses: Vec<Vec<String>>,
    /// Lowercased terms that exclude a note when any of them matches.
    pub negatives: Vec<String>,
}

impl ParsedQuery {
    pub fn parse(input: &str) -> Self {
        let tokens = tokenize(input);
        let mut clauses = Vec::new();
        let mut negatives = Vec::new();
        let mut current: Vec<String> = Vec::new();

        let mut iter = tokens.iter();
        while let Some(token) = iter.next() {
            if token.eq_ignore_ascii_case("or") {
                if !current.is_empty() {
                    clauses.push(std::mem::take(&mut current));
                }
            } else if token.eq_ignore_ascii_case("not") {
                if let Some(next) = iter.next() {
                    negatives.push(fold_case(next));
                }
            } else if let Some(rest) = token.strip_prefix('-')
                && !rest.is_empty()
            {
                negatives.push(fold_case(rest));
            } else {
                current.push(fold_case(token));
            }
        }
        if !current.is_empty() {
            clauses.push(current);
        }

        Self { tokens, clauses, negatives }
    }

    /// Positive terms in clause order, duplicates included.
    pub fn positive_terms(&self) -> impl Iterator<Item = &str> {
        self.clauses.iter().flatten().map(String::as_str)
    }

    pub fn has_terms(&self) -> bool {
        !self.clauses.is_empty() || !self.negatives.is_empty()
    }

    /// The query as echoed back in responses.
    pub fn display(&self) -> String {
        self.tokens.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// `"a,b|c"` is `[["a", "b"], ["c"]]`.
    fn clauses(encoded: &str) -> Vec<Vec<String>> {
        encoded
            .split('|')
            .filter(|c| !c.is_empty())
            .map(|c| c.split(',').map(str::to_string).collect())
            .collect()
    }

    fn terms(encoded: &str) -> Vec<String> {
        encoded.split(',').filter(|t| !t.is_empty()).map(str::to_string).collect()
    }

    #[rstest]
    #[case::and_or_not("a b OR c -d", "a,b|c", "d")]
    #[case::keyword_not("Rust NOT python", "rust", "python")]
    #[case::lowercase_operators("x or y not z", "x|y", "z")]
    #[case::quoted_phrase(r#""Hello World" tips"#, "hello world,tips", "")]
    #[case::empty_clauses_dropped("OR OR a OR", "a", "")]
    #[case::trailing_not_ignored("a NOT", "a", "")]
    #[case::bare_dash_is_term("a - b", "a,-,b", "")]
    #[case::only_negatives("-draft -old", "", "draft,old")]
    #[case::not_consumes_operator("NOT OR a", "a", "or")]
    #[case::unterminated_quote(r#""open phrase"#, "\"open,phrase", "")]
    fn test_parse(#[case] input: &str, #[case] expected: &str, #[case] negatives: &str) {
        let parsed = ParsedQuery::parse(input);
        assert_eq!(parsed.clauses, clauses(expected));
        assert_eq!(parsed.negatives, terms(negatives));
    }

    #[test]
    fn test_tokenize_strips_quotes() {
        assert_eq!(tokenize(r#"say "two words"  here"#), vec!["say", "two words", "here"]);
    }

    #[test]
    fn test_display_joins_tokens() {
        let parsed = ParsedQuery::parse(r#"  "a  b"   c "#);
        assert_eq!(parsed.display(), "a  b c");
        assert!(parsed.has_terms());
        assert!(!ParsedQuery::parse("   ").has_terms());
    }
}
