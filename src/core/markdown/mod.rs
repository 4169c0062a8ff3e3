//! Markdown to display-ready HTML for assistant answers.
//!
//! A fixed pipeline of stages over a token list:
//!
//! 1. fenced code blocks (escaped, tagged with a language)
//! 2. inline code spans (escaped)
//! 3. links
//! 4. bold
//! 5. italic
//! 6. line breaks
//!
//! Every stage only rewrites raw `Text` tokens, so markup produced by an earlier stage and
//! code content are never matched again. Rendering is total: anything that does not match
//! passes through unchanged.

mod code;
mod escape;
mod inline;

use std::fmt;

#[allow(unused_imports)]
pub use code::DEFAULT_LANG;
pub use escape::escape_html;

/// A fenced code block. `code` is the raw text; it is escaped only when written as HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub lang: String,
    pub code: String,
}

impl CodeBlock {
    pub fn new(lang: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            code: code.into(),
        }
    }

    /// `<code class="language-..">escaped</code>`, without the `<pre>` container.
    pub fn code_html(&self) -> String {
        format!(
            "<code class=\"language-{}\">{}</code>",
            self.lang,
            escape_html(&self.code)
        )
    }

    pub fn to_html(&self) -> String {
        format!("<pre>{}</pre>", self.code_html())
    }
}

/// One piece of rendered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupPart {
    Html(String),
    CodeBlock(CodeBlock),
}

/// Rendered content that keeps its code blocks addressable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    parts: Vec<MarkupPart>,
}

impl Markup {
    /// Plain text shown as-is: entity-escaped, newlines as `<br>`.
    pub fn text(s: &str) -> Self {
        let html = escape_html(s).replace('\n', "<br>");
        Self {
            parts: vec![MarkupPart::Html(html)],
        }
    }

    pub fn parts(&self) -> &[MarkupPart] {
        &self.parts
    }

    pub fn code_blocks(&self) -> impl Iterator<Item = &CodeBlock> {
        self.parts.iter().filter_map(|p| match p {
            MarkupPart::CodeBlock(b) => Some(b),
            MarkupPart::Html(_) => None,
        })
    }

    pub fn code_block_count(&self) -> usize {
        self.code_blocks().count()
    }

    pub fn to_html(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                MarkupPart::Html(s) => f.write_str(s)?,
                MarkupPart::CodeBlock(b) => f.write_str(&b.to_html())?,
            }
        }
        Ok(())
    }
}

/// Intermediate token. `Text` is raw input still eligible for later stages.
#[derive(Debug, Clone)]
enum Token {
    Text(String),
    Html(String),
    Code(CodeBlock),
}

/// Render raw answer text to an HTML string.
pub fn render(raw: &str) -> String {
    render_markup(raw).to_html()
}

/// Render raw answer text, keeping code blocks as structured parts.
pub fn render_markup(raw: &str) -> Markup {
    let tokens = code::fenced_blocks(raw);
    let tokens = code::inline_code(tokens);
    let tokens = inline::links(tokens);
    let tokens = inline::bold(tokens);
    let tokens = inline::italic(tokens);
    let tokens = inline::line_breaks(tokens);

    let mut parts: Vec<MarkupPart> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token {
            Token::Text(s) | Token::Html(s) => match parts.last_mut() {
                Some(MarkupPart::Html(prev)) => prev.push_str(&s),
                _ => parts.push(MarkupPart::Html(s)),
            },
            Token::Code(block) => parts.push(MarkupPart::CodeBlock(block)),
        }
    }
    Markup { parts }
}

#[cfg(test)]
mod tests;
