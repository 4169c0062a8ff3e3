//! Inline stages: links, bold, italic, line breaks.
//!
//! Links and emphasis are matched over a flat sequence of units where raw characters are
//! visible and every previously produced token is a single opaque unit. Delimiters inside
//! produced markup or code therefore never match, while emphasis may still wrap a link.

use super::Token;
use super::escape::escape_html;

#[derive(Debug, Clone)]
enum Unit {
    Char(char),
    Opaque(Token),
}

impl Unit {
    fn is(&self, c: char) -> bool {
        matches!(self, Unit::Char(x) if *x == c)
    }
}

fn to_units(tokens: Vec<Token>) -> Vec<Unit> {
    let mut units = Vec::new();
    for token in tokens {
        match token {
            Token::Text(text) => units.extend(text.chars().map(Unit::Char)),
            other => units.push(Unit::Opaque(other)),
        }
    }
    units
}

fn from_units(units: Vec<Unit>) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    for unit in units {
        match unit {
            Unit::Char(c) => text.push(c),
            Unit::Opaque(token) => {
                if !text.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut text)));
                }
                tokens.push(token);
            }
        }
    }
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

fn html(s: impl Into<String>) -> Unit {
    Unit::Opaque(Token::Html(s.into()))
}

/// Index of the first `c` at or after `from`.
fn find(units: &[Unit], from: usize, c: char) -> Option<usize> {
    units
        .get(from..)?
        .iter()
        .position(|u| u.is(c))
        .map(|p| p + from)
}

/// `[label](url)` -> anchor opening in a new browsing context. The label stays raw text.
pub(super) fn links(tokens: Vec<Token>) -> Vec<Token> {
    let units = to_units(tokens);
    let mut out = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        if units[i].is('[')
            && let Some((label_end, url, next)) = match_link(&units, i)
        {
            out.push(html(format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">",
                escape_html(&url)
            )));
            out.extend_from_slice(&units[i + 1..label_end]);
            out.push(html("</a>"));
            i = next;
            continue;
        }
        out.push(units[i].clone());
        i += 1;
    }
    from_units(out)
}

/// Returns (index of `]`, url, index after `)`) for a link opening at `open`.
fn match_link(units: &[Unit], open: usize) -> Option<(usize, String, usize)> {
    let close = find(units, open + 1, ']')?;
    if close == open + 1 || !units.get(close + 1)?.is('(') {
        return None;
    }
    let url_start = close + 2;
    let url_end = find(units, url_start, ')')?;
    if url_end == url_start {
        return None;
    }
    let url = units[url_start..url_end]
        .iter()
        .map(|u| match u {
            Unit::Char(c) => Some(*c),
            Unit::Opaque(_) => None,
        })
        .collect::<Option<String>>()?;
    Some((close, url, url_end + 1))
}

/// `**text**` -> `<strong>`.
pub(super) fn bold(tokens: Vec<Token>) -> Vec<Token> {
    emphasis(tokens, 2, "strong")
}

/// `*text*` -> `<em>`. Must run after [`bold`].
pub(super) fn italic(tokens: Vec<Token>) -> Vec<Token> {
    emphasis(tokens, 1, "em")
}

/// Leftmost, non-overlapping `*{n}content*{n}` where content is non-empty and has no `*`.
fn emphasis(tokens: Vec<Token>, n: usize, tag: &str) -> Vec<Token> {
    let units = to_units(tokens);
    let delim_at = |at: usize| at + n <= units.len() && units[at..at + n].iter().all(|u| u.is('*'));
    let mut out = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        if delim_at(i) {
            let start = i + n;
            if let Some(end) = find(&units, start, '*')
                && end > start
                && delim_at(end)
            {
                out.push(html(format!("<{tag}>")));
                out.extend_from_slice(&units[start..end]);
                out.push(html(format!("</{tag}>")));
                i = end + n;
                continue;
            }
        }
        out.push(units[i].clone());
        i += 1;
    }
    from_units(out)
}

/// Each newline left in raw text becomes `<br>`. Code keeps its newlines.
pub(super) fn line_breaks(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .map(|token| match token {
            Token::Text(text) if text.contains('\n') => Token::Html(text.replace('\n', "<br>")),
            other => other,
        })
        .collect()
}
