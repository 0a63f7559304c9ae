//! Citation records parsed from BibTeX embedded in profile works.
//!
//! [`BibtexParser`] handles the single-entry citations ORCID stores: braced,
//! quoted and bare values, `#` concatenation, nested braces, and the LaTeX
//! accent escapes that show up in author names. Values come out as NFC
//! Unicode with grouping braces removed.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

use crate::error::{CitationError, CitationResult};

use super::non_empty;

/// A parsed citation: entry type, flat fields, and pre-split name lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationRecord {
    /// Lower-cased entry type, e.g. `article`.
    pub entry_type: String,
    pub key: String,
    /// Field values keyed by lower-cased field name.
    pub fields: BTreeMap<String, String>,
    /// Author display names, in citation order.
    pub authors: Vec<String>,
    pub editors: Vec<String>,
}

impl CitationRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| non_empty(v))
    }
}

/// Turns a raw citation string into a [`CitationRecord`].
pub trait CitationParser: Send + Sync {
    fn parse(&self, raw: &str) -> CitationResult<CitationRecord>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BibtexParser;

impl CitationParser for BibtexParser {
    fn parse(&self, raw: &str) -> CitationResult<CitationRecord> {
        let entry = Cursor::new(raw).entry()?;
        let mut record = CitationRecord {
            entry_type: entry.entry_type.to_lowercase(),
            key: entry.key,
            ..Default::default()
        };
        for (name, value) in entry.fields {
            match name.as_str() {
                "author" => record.authors = split_names(&value),
                "editor" => record.editors = split_names(&value),
                _ => {}
            }
            record.fields.insert(name, clean_value(&value));
        }
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Entry grammar
// ---------------------------------------------------------------------------

struct RawEntry {
    entry_type: String,
    key: String,
    fields: Vec<(String, String)>,
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn entry(&mut self) -> CitationResult<RawEntry> {
        let at = self.src.find('@').ok_or(CitationError::NoEntry)?;
        self.pos = at + 1;
        let entry_type = self.take_while(|c| c.is_alphanumeric()).to_string();
        self.skip_ws();
        let close = match self.bump() {
            Some('{') => '}',
            Some('(') => ')',
            _ => return Err(CitationError::NoEntry),
        };
        if entry_type.is_empty() {
            return Err(CitationError::NoEntry);
        }
        self.skip_ws();
        let key = self
            .take_while(|c| c != ',' && c != close)
            .trim()
            .to_string();

        let mut fields = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(CitationError::Unbalanced { offset: self.pos }),
                Some(c) if c == close => break,
                Some(',') => {
                    self.bump();
                    continue;
                }
                Some(_) => {}
            }
            let name = self
                .take_while(|c| c != '=' && c != ',' && c != close)
                .trim()
                .to_lowercase();
            if self.peek() != Some('=') {
                // Stray token without a value.
                continue;
            }
            self.bump();
            let value = self.value(close)?;
            if !name.is_empty() {
                fields.push((name, value));
            }
        }
        Ok(RawEntry {
            entry_type,
            key,
            fields,
        })
    }

    /// A value: one or more parts joined by `#`.
    fn value(&mut self, close: char) -> CitationResult<String> {
        let mut out = String::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('{') => {
                    self.bump();
                    out.push_str(self.balanced('}')?);
                }
                Some('"') => {
                    self.bump();
                    out.push_str(self.balanced('"')?);
                }
                Some(_) => {
                    out.push_str(
                        self.take_while(|c| c != ',' && c != '#' && c != close && !c.is_whitespace()),
                    );
                }
                None => return Err(CitationError::Unbalanced { offset: self.pos }),
            }
            self.skip_ws();
            if self.peek() == Some('#') {
                self.bump();
            } else {
                return Ok(out);
            }
        }
    }

    /// Content up to the `end` delimiter at brace depth zero; nested braces
    /// are kept verbatim. Consumes the delimiter.
    fn balanced(&mut self, end: char) -> CitationResult<&'a str> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            if depth == 0 && c == end {
                let content = &self.src[start..self.pos];
                self.bump();
                return Ok(content);
            }
            match c {
                '\\' => {
                    // Escaped character, e.g. \" or \{.
                    self.bump();
                }
                '{' => depth += 1,
                '}' if depth == 0 => return Err(CitationError::Unbalanced { offset: self.pos }),
                '}' => depth -= 1,
                _ => {}
            }
            self.bump();
        }
        Err(CitationError::Unbalanced { offset: start })
    }
}

// ---------------------------------------------------------------------------
// Value cleanup
// ---------------------------------------------------------------------------

static ACCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\\([`'^"~=.])(?:\s*\{\s*(\\i|[A-Za-z])\s*\}|\s*(\\i|[A-Za-z]))"#).unwrap()
});
static LETTER_ACCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\([uvHckr])(?:\s*\{\s*(\\i|[A-Za-z])\s*\}|\s+([A-Za-z]))").unwrap()
});
static SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\(ss|aa|AA|ae|AE|oe|OE|o|O|l|L|i)\b(?:\{\}|\s)?").unwrap());
static ESCAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\([&%$#_{}])").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

fn combining_mark(command: &str) -> Option<char> {
    Some(match command {
        "`" => '\u{0300}',
        "'" => '\u{0301}',
        "^" => '\u{0302}',
        "~" => '\u{0303}',
        "=" => '\u{0304}',
        "u" => '\u{0306}',
        "." => '\u{0307}',
        "\"" => '\u{0308}',
        "r" => '\u{030A}',
        "H" => '\u{030B}',
        "v" => '\u{030C}',
        "c" => '\u{0327}',
        "k" => '\u{0328}',
        _ => return None,
    })
}

/// The accented letter, from either the braced or the bare alternative.
fn braced_base<'c>(c: &'c Captures) -> &'c str {
    c.get(2).or_else(|| c.get(3)).map_or("", |m| m.as_str())
}

fn accented(command: &str, base: &str) -> String {
    let base = if base == "\\i" { "i" } else { base };
    match combining_mark(command) {
        Some(mark) => format!("{base}{mark}"),
        None => base.to_string(),
    }
}

/// Replace LaTeX accent and symbol escapes with Unicode (NFC).
pub fn latex_to_unicode(value: &str) -> String {
    if !value.contains('\\') {
        return value.nfc().collect();
    }
    let value = ACCENT.replace_all(value, |c: &Captures| accented(&c[1], braced_base(c)));
    let value = LETTER_ACCENT.replace_all(&value, |c: &Captures| accented(&c[1], braced_base(c)));
    let value = SYMBOL.replace_all(&value, |c: &Captures| {
        match &c[1] {
            "ss" => "ß",
            "aa" => "å",
            "AA" => "Å",
            "ae" => "æ",
            "AE" => "Æ",
            "oe" => "œ",
            "OE" => "Œ",
            "o" => "ø",
            "O" => "Ø",
            "l" => "ł",
            "L" => "Ł",
            _ => "ı",
        }
        .to_string()
    });
    let value = ESCAPE.replace_all(&value, "$1");
    value.nfc().collect()
}

/// Convert escapes, drop grouping braces and collapse whitespace.
fn clean_value(raw: &str) -> String {
    let converted = latex_to_unicode(raw);
    let unbraced: String = converted.chars().filter(|c| *c != '{' && *c != '}').collect();
    WHITESPACE.replace_all(unbraced.trim(), " ").into_owned()
}

/// Split a BibTeX name list on `and` at brace depth zero. A name wrapped in
/// braces as a whole (a corporate author) is kept as one family name.
fn split_names(raw: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut depth = 0i32;
    for token in raw.split_whitespace() {
        if depth == 0 && token.eq_ignore_ascii_case("and") {
            names.push(current.join(" "));
            current.clear();
            continue;
        }
        depth += token.matches('{').count() as i32 - token.matches('}').count() as i32;
        current.push(token);
    }
    names.push(current.join(" "));

    names
        .into_iter()
        .filter_map(|name| {
            let cleaned = clean_value(&name);
            (!cleaned.is_empty()).then(|| {
                if is_fully_braced(&name) {
                    format!("{{{cleaned}}}")
                } else {
                    cleaned
                }
            })
        })
        .collect()
}

fn is_fully_braced(name: &str) -> bool {
    let name = name.trim();
    if !(name.starts_with('{') && name.ends_with('}')) {
        return false;
    }
    let mut depth = 0i32;
    for (i, c) in name.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 && i + 1 < name.len() {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

/// Split a display name into `(given, family)`.
///
/// Accepts `"Family, Given"` and `"Given Family"`. Lower-case particles
/// (`van`, `de la`) stay with the family name. A braced corporate name
/// (`"{World Health Organization}"`) is all family name.
pub fn normalize_name(name: &str) -> Option<(Option<String>, String)> {
    let name = name.trim();
    if name.starts_with('{') && name.ends_with('}') && name.len() >= 2 {
        let inner = non_empty(&name[1..name.len() - 1])?;
        return Some((None, inner.to_string()));
    }
    let name = WHITESPACE.replace_all(name, " ");
    let name = non_empty(&name)?.to_string();

    if let Some((family, given)) = name.split_once(',') {
        let family = non_empty(family)?.to_string();
        return Some((non_empty(given).map(str::to_string), family));
    }

    let tokens: Vec<&str> = name.split(' ').collect();
    if tokens.len() == 1 {
        return Some((None, name));
    }
    let family_start = tokens
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, t)| t.chars().next().is_some_and(char::is_lowercase))
        .map_or(tokens.len() - 1, |(i, _)| i);
    let given = tokens[..family_start].join(" ");
    let family = tokens[family_start..].join(" ");
    Some((non_empty(&given).map(str::to_string), family))
}
