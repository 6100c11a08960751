//! Text pattern recognizers: link-shaped tokens and list markers.
//!
//! Pure string functions. The cursor-relative plumbing that decides which
//! string to feed in lives in the features; these functions only answer
//! "is this a link / a list marker, and what does it normalize to".

use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;
use url::Url;

use crate::host::ListKind;

/// Candidates shorter than this (in chars) are not worth matching. Enforced
/// by callers before `match_link` is attempted.
pub const MINIMUM_LINK_CANDIDATE_LEN: usize = 5;

/// Bracket pairs whose unbalanced closing character is dropped from the end
/// of a candidate, in the order they are checked.
const BRACKET_PAIRS: [(char, char); 3] = [('(', ')'), ('{', '}'), ('[', ']')];

/// A recognized link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    /// The text as it appears in the document, after trailing punctuation and
    /// unbalanced closing brackets were trimmed. This is the text that gets
    /// replaced by the link.
    pub original_text: SmolStr,
    /// Scheme-qualified form, always a parseable absolute URL.
    pub normalized_url: SmolStr,
}

/// Result of matching the text right before the cursor against the list
/// shortcut markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    None,
    Bullet,
    Numbered,
}

impl ListMarker {
    /// The list type the marker toggles on.
    pub fn list_kind(self) -> Option<ListKind> {
        match self {
            ListMarker::None => None,
            ListMarker::Bullet => Some(ListKind::Bullet),
            ListMarker::Numbered => Some(ListKind::Numbered),
        }
    }
}

struct LinkRule {
    pattern: Regex,
    normalize: fn(&str) -> String,
}

impl LinkRule {
    fn new(pattern: &str, normalize: fn(&str) -> String) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("link rule regex should compile"),
            normalize,
        }
    }
}

fn keep(text: &str) -> String {
    text.to_string()
}

fn with_http(text: &str) -> String {
    format!("http://{text}")
}

fn with_ftp(text: &str) -> String {
    format!("ftp://{text}")
}

fn with_mailto(text: &str) -> String {
    format!("mailto:{text}")
}

/// Recognition rules, tried in order. Every pattern is anchored at both ends:
/// the whole trimmed candidate has to be the link.
static LINK_RULES: LazyLock<Vec<LinkRule>> = LazyLock::new(|| {
    vec![
        LinkRule::new(r"(?i)^(?:microsoft-edge:)?https?://\S+$", keep),
        LinkRule::new(r"(?i)^www\.\S+$", with_http),
        LinkRule::new(r"(?i)^ftp://\S+$", keep),
        LinkRule::new(r"(?i)^ftp\.\S+$", with_ftp),
        LinkRule::new(r"(?i)^mailto:\S+@\S+\.\S+$", keep),
        LinkRule::new(
            r"(?i)^[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}$",
            with_mailto,
        ),
        LinkRule::new(r"(?i)^(?:file|notes|gopher|wais)://\S+$", keep),
        LinkRule::new(r"(?i)^(?:news|telnet):\S+$", keep),
        LinkRule::new(
            r"(?i)^[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*\.[a-z]{2,63}(?::\d{1,5})?(?:[/?#]\S*)?$",
            with_http,
        ),
    ]
});

/// Characters users commonly type right after a URL.
fn is_trailing_punctuation(c: char) -> bool {
    matches!(c, '.' | '+' | '=' | ':' | ';' | '"' | '\'' | ',' | '>') || c.is_whitespace()
}

/// Strip the trailing punctuation run, then any unbalanced closing bracket.
///
/// A closing bracket is only dropped when the candidate contains no matching
/// opening bracket, so `(example.com)` keeps its parenthesis while
/// `example.com)` loses it.
pub fn trim_link_candidate(candidate: &str) -> &str {
    let mut trimmed = candidate.trim_end_matches(is_trailing_punctuation);
    for (open, close) in BRACKET_PAIRS {
        if trimmed.ends_with(close) && !trimmed.contains(open) {
            trimmed = &trimmed[..trimmed.len() - close.len_utf8()];
        }
    }
    trimmed
}

/// Recognize a link in `candidate`.
///
/// Returns `None` for empty input, for input that is nothing but trailing
/// punctuation, and for anything no link rule accepts.
pub fn match_link(candidate: &str) -> Option<LinkMatch> {
    let text = trim_link_candidate(candidate);
    if text.is_empty() {
        return None;
    }

    let rule = LINK_RULES.iter().find(|rule| rule.pattern.is_match(text))?;
    let normalized = (rule.normalize)(text);
    if let Err(err) = Url::parse(&normalized) {
        tracing::trace!(candidate = text, %err, "link candidate does not normalize to a valid url");
        return None;
    }

    Some(LinkMatch {
        original_text: SmolStr::new(text),
        normalized_url: SmolStr::new(normalized),
    })
}

/// Match the characters immediately before the cursor against the list
/// shortcut markers. Exact, case-sensitive comparison with no whitespace
/// tolerance.
pub fn match_list_marker(prefix: &str) -> ListMarker {
    match prefix {
        "*" | "-" => ListMarker::Bullet,
        "1." => ListMarker::Numbered,
        _ => ListMarker::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_of(candidate: &str) -> Option<String> {
        match_link(candidate).map(|m| m.normalized_url.to_string())
    }

    #[test]
    fn test_trims_maximal_trailing_punctuation_run() {
        for suffix in [
            ".", ",", ";", ":", "=", "+", "\"", "'", ">", " ", ".,;:", ".\t\n", "'.\"",
        ] {
            let candidate = format!("www.example.com{suffix}");
            let link = match_link(&candidate).unwrap();
            assert_eq!(link.original_text, "www.example.com", "suffix {suffix:?}");
            assert_eq!(link.normalized_url, "http://www.example.com");
        }
    }

    #[test]
    fn test_punctuation_inside_url_is_kept() {
        let link = match_link("https://example.com/a.b?c=d,e").unwrap();
        assert_eq!(link.original_text, "https://example.com/a.b?c=d,e");
    }

    #[test]
    fn test_unbalanced_closing_paren_after_period() {
        let link = match_link("example.com).").unwrap();
        assert_eq!(link.original_text, "example.com");
        assert_eq!(link.normalized_url, "http://example.com");
    }

    #[test]
    fn test_balanced_parens_are_kept_but_not_a_link() {
        // The closing paren is balanced so it is not trimmed, and no rule
        // accepts a candidate that starts with `(`.
        assert_eq!(trim_link_candidate("(example.com)"), "(example.com)");
        assert_eq!(match_link("(example.com)"), None);
    }

    #[test]
    fn test_balanced_parens_inside_url() {
        let link = match_link("www.example.com/wiki/Rust_(language)").unwrap();
        assert_eq!(link.original_text, "www.example.com/wiki/Rust_(language)");
        assert_eq!(
            link.normalized_url,
            "http://www.example.com/wiki/Rust_(language)"
        );
    }

    #[test]
    fn test_bracket_pairs_checked_in_order() {
        assert_eq!(trim_link_candidate("example.com]"), "example.com");
        assert_eq!(trim_link_candidate("example.com}"), "example.com");
        // `)` is not last when the paren pair is checked, so only `]` goes.
        assert_eq!(trim_link_candidate("example.com)]"), "example.com)");
    }

    #[test]
    fn test_scheme_handling() {
        assert_eq!(url_of("http://example.com").as_deref(), Some("http://example.com"));
        assert_eq!(url_of("HTTPS://Example.com/x").as_deref(), Some("HTTPS://Example.com/x"));
        assert_eq!(url_of("www.rust-lang.org").as_deref(), Some("http://www.rust-lang.org"));
        assert_eq!(url_of("ftp.example.com").as_deref(), Some("ftp://ftp.example.com"));
        assert_eq!(url_of("ftp://files.example.com/a").as_deref(), Some("ftp://files.example.com/a"));
        assert_eq!(url_of("mailto:someone@example.com").as_deref(), Some("mailto:someone@example.com"));
        assert_eq!(url_of("someone@example.com").as_deref(), Some("mailto:someone@example.com"));
        assert_eq!(url_of("file://server/share").as_deref(), Some("file://server/share"));
        assert_eq!(url_of("news:comp.lang.rust").as_deref(), Some("news:comp.lang.rust"));
        assert_eq!(url_of("telnet:bbs.example.com").as_deref(), Some("telnet:bbs.example.com"));
        assert_eq!(url_of("notes://server/db.nsf").as_deref(), Some("notes://server/db.nsf"));
        assert_eq!(url_of("gopher://gopher.example.com/1").as_deref(), Some("gopher://gopher.example.com/1"));
        assert_eq!(url_of("wais://wais.example.com/db").as_deref(), Some("wais://wais.example.com/db"));
        assert_eq!(
            url_of("microsoft-edge:https://example.com/a").as_deref(),
            Some("microsoft-edge:https://example.com/a")
        );
    }

    #[test]
    fn test_bare_domains() {
        assert_eq!(url_of("example.com").as_deref(), Some("http://example.com"));
        assert_eq!(url_of("docs.rs/regex").as_deref(), Some("http://docs.rs/regex"));
        assert_eq!(url_of("localhost.dev:8080/x").as_deref(), Some("http://localhost.dev:8080/x"));
    }

    #[test]
    fn test_rejects_non_links() {
        assert_eq!(match_link(""), None);
        assert_eq!(match_link("...,"), None);
        assert_eq!(match_link("ab"), None);
        assert_eq!(match_link("hello"), None);
        assert_eq!(match_link("e.g."), None);
        assert_eq!(match_link("3.1415"), None);
        assert_eq!(match_link("http://"), None);
        assert_eq!(match_link("-example.com"), None);
    }

    #[test]
    fn test_list_markers() {
        assert_eq!(match_list_marker("1."), ListMarker::Numbered);
        assert_eq!(match_list_marker("-"), ListMarker::Bullet);
        assert_eq!(match_list_marker("*"), ListMarker::Bullet);
        assert_eq!(match_list_marker("1,"), ListMarker::None);
        assert_eq!(match_list_marker("2."), ListMarker::None);
        assert_eq!(match_list_marker(" -"), ListMarker::None);
        assert_eq!(match_list_marker("- "), ListMarker::None);
        assert_eq!(match_list_marker(""), ListMarker::None);
    }

    #[test]
    fn test_marker_list_kind() {
        assert_eq!(ListMarker::Bullet.list_kind(), Some(ListKind::Bullet));
        assert_eq!(ListMarker::Numbered.list_kind(), Some(ListKind::Numbered));
        assert_eq!(ListMarker::None.list_kind(), None);
    }
}
