//! Operator-name normalization.
//!
//! Three forms are derived from a raw operator name:
//!
//! - [`normalize_key`] produces the canonical key used by the record store.
//!   It lowercases and collapses whitespace and nothing else: snapshot keys
//!   keep `&`, `-`, `.`, `'` and `#` verbatim, so exact lookup only works if
//!   the query side keeps them too.
//! - [`match_form`] is a looser form for fuzzy comparison only. It drops
//!   periods and apostrophes (`l.l.c.` and `llc` compare equal) and turns
//!   bracketing punctuation into token breaks.
//! - [`split_aliases`] splits "doing business as" clauses off a name or a
//!   query, and [`alias_keys`] turns the parts and `(the)` suffixes into
//!   alternative keys for the alias index.
//!
//! Both `normalize_key` and `match_form` are idempotent.

use regex::Regex;
use std::sync::LazyLock;

/// Entity designators and articles. They take part in matching but carry
/// less weight than distinctive name tokens.
const DESIGNATORS: &[&str] = &[
    "co",
    "company",
    "corp",
    "corporation",
    "inc",
    "incorporated",
    "limited",
    "llc",
    "lllp",
    "llp",
    "lp",
    "ltd",
    "pc",
    "plc",
    "pllc",
    "the",
];

/// DBA markers as they appear in an already-normalized key.
static DBA_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*,?\s+(?:d\s?/\s?b\s?/\s?a|d\.b\.a\.?|dba|doing business as):?\s+")
        .expect("DBA marker pattern is valid")
});

/// Marker used when the parts of a DBA name are joined back together
const DBA_JOIN: &str = " dba ";

const THE_SUFFIX: &str = " (the)";

/// Canonical key form: Unicode lowercase, whitespace runs collapsed to a
/// single space, trimmed. Empty or whitespace-only input yields `""`.
pub fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        if word.is_ascii() {
            out.push_str(&word.to_ascii_lowercase());
        } else {
            for ch in word.chars() {
                out.extend(ch.to_lowercase());
            }
        }
    }
    out
}

/// Loose comparison form used by the fuzzy finder
pub fn match_form(raw: &str) -> String {
    let key = normalize_key(raw);
    let mut out = String::with_capacity(key.len());
    let mut pending_break = false;

    for ch in key.chars() {
        match ch {
            '.' | '\'' | '\u{2019}' | '`' => {}
            ' ' | ',' | '(' | ')' | '[' | ']' | '"' | ';' | ':' => pending_break = true,
            _ => {
                if pending_break && !out.is_empty() {
                    out.push(' ');
                }
                pending_break = false;
                out.push(ch);
            }
        }
    }

    out
}

/// Whitespace tokens of a normalized form.
///
/// Single-character and digit-leading tokens are kept: `3-b oil co llc`
/// yields `3-b`, `oil`, `co`, `llc`.
pub fn tokens(form: &str) -> impl Iterator<Item = &str> {
    form.split(' ').filter(|t| !t.is_empty())
}

/// Tokens sorted and re-joined, so word order does not affect distance
pub fn sorted_form(form: &str) -> String {
    let mut toks: Vec<&str> = tokens(form).collect();
    toks.sort_unstable();
    toks.join(" ")
}

/// Whether a match-form token is an entity designator or article
pub fn is_designator(token: &str) -> bool {
    DESIGNATORS.binary_search(&token).is_ok()
}

/// A normalized name split at its DBA markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    /// Registered (legal) name part
    pub legal: String,
    /// Names following each DBA marker
    pub aliases: Vec<String>,
}

impl NameParts {
    /// The parts joined with a plain `dba` marker, so names written with
    /// `d/b/a`, `d.b.a.` or `doing business as` share one key
    pub fn joined(&self) -> String {
        let mut out = self.legal.clone();
        for alias in &self.aliases {
            out.push_str(DBA_JOIN);
            out.push_str(alias);
        }
        out
    }
}

/// Split a name into its legal part and its DBA aliases
pub fn split_aliases(raw: &str) -> NameParts {
    let key = normalize_key(raw);

    let mut parts = DBA_MARKER
        .split(&key)
        .map(clean_part)
        .filter(|p| !p.is_empty());
    let legal = parts.next().unwrap_or_default();
    NameParts {
        legal,
        aliases: parts.collect(),
    }
}

/// Alternative keys under which a name should also be found.
///
/// Covers the `dba`-joined form of a DBA name, its legal part, each alias,
/// and both readings of a trailing `(the)`. The primary key itself is never
/// included.
pub fn alias_keys(primary_key: &str, name: &str) -> Vec<String> {
    let parts = split_aliases(name);
    let mut out: Vec<String> = Vec::new();

    let mut push = |candidate: String| {
        if !candidate.is_empty() && candidate != primary_key && !out.contains(&candidate) {
            out.push(candidate);
        }
    };

    if !parts.aliases.is_empty() {
        push(parts.joined());
    }

    for part in std::iter::once(parts.legal).chain(parts.aliases) {
        if let Some(stem) = part.strip_suffix(THE_SUFFIX) {
            push(format!("the {}", stem));
            push(stem.to_string());
        }
        push(part);
    }

    // The primary key can carry its own "(the)" even when the name does not
    if let Some(stem) = primary_key.strip_suffix(THE_SUFFIX) {
        push(format!("the {}", stem));
        push(stem.to_string());
    }

    out
}

fn clean_part(part: &str) -> String {
    normalize_key(part.trim_matches(|c: char| c == ',' || c.is_whitespace()))
}
