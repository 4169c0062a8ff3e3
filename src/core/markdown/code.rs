//! Code stages: fenced blocks first, then inline code spans.
//!
//! Both stages only split `Token::Text`; everything they produce is opaque to later stages.

use std::sync::OnceLock;

use regex::Regex;

use super::escape::escape_html;
use super::{CodeBlock, Token};

/// Language tag used when a fence carries none.
pub const DEFAULT_LANG: &str = "text";

static FENCE_RE: OnceLock<Regex> = OnceLock::new();
static INLINE_CODE_RE: OnceLock<Regex> = OnceLock::new();

/// ```` ```lang\n ... ``` ````: tag is word characters glued to the fence, then a newline.
/// Non-greedy body, so the first closing fence wins.
fn fence_re() -> &'static Regex {
    FENCE_RE.get_or_init(|| Regex::new(r"(?s)```([A-Za-z0-9_]*)\n(.*?)```").expect("valid regex"))
}

fn inline_code_re() -> &'static Regex {
    INLINE_CODE_RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("valid regex"))
}

/// Split raw text into text and fenced code block tokens.
pub(super) fn fenced_blocks(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in fence_re().captures_iter(raw) {
        let (Some(whole), Some(lang), Some(code)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(Token::Text(raw[last..whole.start()].to_string()));
        }
        let lang = if lang.as_str().is_empty() {
            DEFAULT_LANG
        } else {
            lang.as_str()
        };
        tokens.push(Token::Code(CodeBlock::new(lang, code.as_str())));
        last = whole.end();
    }
    if last < raw.len() {
        tokens.push(Token::Text(raw[last..].to_string()));
    }
    tokens
}

/// Wrap `` `code` `` spans found in text tokens. Span content is entity-escaped.
pub(super) fn inline_code(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        let Token::Text(text) = token else {
            out.push(token);
            continue;
        };
        let mut last = 0;
        for caps in inline_code_re().captures_iter(&text) {
            let (Some(whole), Some(code)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                out.push(Token::Text(text[last..whole.start()].to_string()));
            }
            out.push(Token::Html(format!(
                "<code>{}</code>",
                escape_html(code.as_str())
            )));
            last = whole.end();
        }
        if last < text.len() {
            out.push(Token::Text(text[last..].to_string()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_without_newline_after_tag_is_not_a_block() {
        let tokens = fenced_blocks("```js const a```");
        assert!(matches!(&tokens[..], [Token::Text(t)] if t == "```js const a```"));
    }

    #[test]
    fn unclosed_fence_stays_text() {
        let tokens = fenced_blocks("```rust\nfn main() {");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(&tokens[0], Token::Text(_)));
    }

    #[test]
    fn first_closing_fence_ends_the_block() {
        let tokens = fenced_blocks("```a\n1\n```x```b\n2\n```");
        let blocks: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Code(b) => Some((b.lang.as_str(), b.code.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(blocks, [("a", "1\n"), ("b", "2\n")]);
        assert!(matches!(&tokens[1], Token::Text(t) if t == "x"));
    }

    #[test]
    fn inline_code_leaves_code_blocks_alone() {
        let tokens = inline_code(vec![Token::Code(CodeBlock::new("text", "`a`"))]);
        assert!(matches!(&tokens[..], [Token::Code(b)] if b.code == "`a`"));
    }

    #[test]
    fn empty_backtick_pair_is_not_a_span() {
        let tokens = inline_code(vec![Token::Text("a `` b".to_string())]);
        assert!(matches!(&tokens[..], [Token::Text(t)] if t == "a `` b"));
    }
}
