//! Statement and member splitting
//!
//! Everything here is a single left-to-right scan that tracks quote state and,
//! where it matters, parenthesis depth. Quote tracking is one flag plus the
//! active quote character: doubled or backslash-escaped quotes inside a literal
//! are not recognised, so `'it''s'` toggles the state twice and still ends up
//! balanced, while `'it\'s'` does not.

/// Closing character for a quote opener.
///
/// String literals use `'` and `"`; identifier quoting (`` ` `` and `[...]`)
/// is only honoured when `identifiers` is set.
fn quote_close(ch: char, identifiers: bool) -> Option<char> {
    match ch {
        '\'' | '"' => Some(ch),
        '`' if identifiers => Some('`'),
        '[' if identifiers => Some(']'),
        _ => None,
    }
}

/// Strip comments and collapse whitespace runs to a single space.
///
/// `--` line comments and `/* */` block comments are removed (each counts as
/// whitespace). Text inside quoted literals is copied untouched, so a default
/// such as `'a  -- b'` survives normalisation.
pub fn normalize_sql(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;
    let mut pending_space = false;

    while let Some(ch) = chars.next() {
        if let Some(close) = quote {
            out.push(ch);
            if ch == close {
                quote = None;
            }
            continue;
        }

        match ch {
            '-' if chars.peek() == Some(&'-') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
                pending_space = true;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
                pending_space = true;
            }
            c if c.is_whitespace() => pending_space = true,
            c => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                if let Some(close) = quote_close(c, false) {
                    quote = Some(close);
                }
                out.push(c);
            }
        }
    }

    out
}

/// Split a (normalised) document into top-level statements.
pub fn split_statements(sql: &str) -> Statements<'_> {
    Statements { rest: sql }
}

/// Lazy iterator over the statements of a DDL document.
///
/// Yields trimmed, non-empty statement texts in document order. Trailing text
/// after the last `;` is yielded as a final statement.
#[derive(Debug, Clone)]
pub struct Statements<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Statements<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let mut quote: Option<char> = None;
            let mut boundary = None;

            for (i, ch) in self.rest.char_indices() {
                match quote {
                    Some(close) if ch == close => quote = None,
                    Some(_) => {}
                    None if ch == ';' => {
                        boundary = Some(i);
                        break;
                    }
                    None => quote = quote_close(ch, false),
                }
            }

            let statement = match boundary {
                Some(i) => {
                    let statement = &self.rest[..i];
                    self.rest = &self.rest[i + 1..];
                    statement
                }
                None => std::mem::take(&mut self.rest),
            };

            let statement = statement.trim();
            if !statement.is_empty() {
                return Some(statement);
            }
        }
        None
    }
}

/// Split a parenthesised body on commas at depth 0.
///
/// Used for CREATE TABLE bodies and for column lists, so `NUMERIC(10,2)` or
/// `CHECK (a IN (1, 2))` stay in one piece. Members are trimmed and empty
/// members dropped.
pub fn split_definitions(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in body.char_indices() {
        if let Some(close) = quote {
            if ch == close {
                quote = None;
            }
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth <= 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            c => quote = quote_close(c, false),
        }
    }
    parts.push(&body[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Byte index of the `)` closing the `(` at `open`, quote-aware.
pub fn find_matching_paren(text: &str, open: usize) -> Option<usize> {
    if !text[open..].starts_with('(') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (offset, ch) in text[open..].char_indices() {
        if let Some(close) = quote {
            if ch == close {
                quote = None;
            }
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            c => quote = quote_close(c, false),
        }
    }
    None
}

/// A whitespace-delimited word with its byte span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl<'a> Word<'a> {
    /// Case-insensitive keyword comparison
    pub fn is(&self, keyword: &str) -> bool {
        self.text.eq_ignore_ascii_case(keyword)
    }

    /// True when the word is a quoted literal or quoted identifier
    pub fn is_quoted(&self) -> bool {
        self.text
            .chars()
            .next()
            .is_some_and(|c| quote_close(c, true).is_some())
    }
}

/// Split text into words on whitespace at depth 0 outside quotes.
///
/// Parenthesised groups and quoted literals stay attached to the word they
/// start in, so `NOW()`, `(price > 0)` and `'a b'` are single words.
pub fn split_words(text: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;

    for (i, ch) in text.char_indices() {
        if let Some(close) = quote {
            if ch == close {
                quote = None;
            }
            continue;
        }

        if ch.is_whitespace() && depth <= 0 {
            if let Some(s) = start.take() {
                words.push(Word {
                    text: &text[s..i],
                    start: s,
                    end: i,
                });
            }
            continue;
        }

        if start.is_none() {
            start = Some(i);
        }
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            c => quote = quote_close(c, true),
        }
    }

    if let Some(s) = start {
        words.push(Word {
            text: &text[s..],
            start: s,
            end: text.len(),
        });
    }

    words
}

/// Remove identifier quoting (`"x"`, `` `x` ``, `[x]`, `'x'`) from a name
pub fn unquote_identifier(name: &str) -> String {
    name.trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '[' | ']'))
        .to_string()
}
