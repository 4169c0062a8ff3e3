use super::{CodeBlock, DEFAULT_LANG, Markup, MarkupPart, render, render_markup};

const RESERVED: [char; 5] = ['&', '<', '>', '"', '\''];

#[test]
fn plain_text_only_gets_line_breaks() {
    for s in [
        "",
        "hello",
        "line one\nline two",
        "a < b && c > d",
        "no markdown here, just \"quotes\" and 'apostrophes'\n\n",
    ] {
        assert_eq!(render(s), s.replace('\n', "<br>"), "input: {:?}", s);
    }
}

#[test]
fn fenced_block_with_language_is_escaped() {
    let out = render("```js\nconst a = \"<x>\";\n```");
    assert_eq!(
        out,
        "<pre><code class=\"language-js\">const a = &quot;&lt;x&gt;&quot;;\n</code></pre>"
    );
}

#[test]
fn fenced_block_without_language_defaults_to_text() {
    let markup = render_markup("```\nls -la\n```");
    let blocks: Vec<_> = markup.code_blocks().collect();
    assert_eq!(blocks, [&CodeBlock::new(DEFAULT_LANG, "ls -la\n")]);
    assert!(markup.to_html().contains("class=\"language-text\""));
}

#[test]
fn reserved_characters_never_appear_unescaped_in_code() {
    let inputs = [
        "```\n<script>alert('x')</script> & \"y\"\n```",
        "```html\n<a href='#'>&amp;</a>\n```",
        "before\n```sh\necho \"$HOME\" > out && cat <in\n```\nafter",
    ];
    for input in inputs {
        let markup = render_markup(input);
        assert_eq!(markup.code_block_count(), 1);
        for part in markup.parts() {
            if let MarkupPart::CodeBlock(block) = part {
                let html = block.code_html();
                let inner = html
                    .strip_prefix(&format!("<code class=\"language-{}\">", block.lang))
                    .and_then(|s| s.strip_suffix("</code>"))
                    .unwrap();
                assert!(
                    !inner.contains(|c: char| RESERVED[1..].contains(&c)),
                    "unescaped in {:?}",
                    inner
                );
            }
        }
    }
}

#[test]
fn code_block_content_is_not_formatted() {
    let out = render("```py\nx = a * b * c  # **not bold** [x](y) `z`\n```");
    assert!(!out.contains("<em>"));
    assert!(!out.contains("<strong>"));
    assert!(!out.contains("<a "));
    assert!(out.contains("`z`"));
    assert!(!out.contains("<br>"));
}

#[test]
fn inline_code_is_wrapped_and_escaped() {
    assert_eq!(
        render("Use `Vec<u8>` here"),
        "Use <code>Vec&lt;u8&gt;</code> here"
    );
}

#[test]
fn inline_code_is_not_formatted() {
    assert_eq!(render("`*a*` and `**b**`"), "<code>*a*</code> and <code>**b**</code>");
}

#[test]
fn link_becomes_new_context_anchor() {
    assert_eq!(
        render("[x](http://e)"),
        "<a href=\"http://e\" target=\"_blank\" rel=\"noopener noreferrer\">x</a>"
    );
}

#[test]
fn link_label_is_still_formatted() {
    assert_eq!(
        render("[**docs**](https://example.com)"),
        "<a href=\"https://example.com\" target=\"_blank\" rel=\"noopener noreferrer\"><strong>docs</strong></a>"
    );
}

#[test]
fn bold_and_italic() {
    assert_eq!(render("**a**"), "<strong>a</strong>");
    assert_eq!(render("*a*"), "<em>a</em>");
}

#[test]
fn bold_content_is_not_emphasised() {
    assert_eq!(render("**a** *b*"), "<strong>a</strong> <em>b</em>");
}

#[test]
fn emphasis_may_wrap_a_link() {
    assert_eq!(
        render("**see [x](u)**"),
        "<strong>see <a href=\"u\" target=\"_blank\" rel=\"noopener noreferrer\">x</a></strong>"
    );
}

#[test]
fn mixed_answer() {
    let raw = "Here is **the fix**:\n```rust\nlet x = 1;\n```\nSee *docs*.";
    let markup = render_markup(raw);
    assert_eq!(markup.code_block_count(), 1);
    assert_eq!(
        markup.to_html(),
        "Here is <strong>the fix</strong>:<br>\
         <pre><code class=\"language-rust\">let x = 1;\n</code></pre>\
         <br>See <em>docs</em>."
    );
}

#[test]
fn multiple_code_blocks_are_kept_in_order() {
    let markup = render_markup("```a\n1\n```\n\n```b\n2\n```");
    let langs: Vec<_> = markup.code_blocks().map(|b| b.lang.as_str()).collect();
    assert_eq!(langs, ["a", "b"]);
}

#[test]
fn malformed_markdown_degrades_gracefully() {
    assert_eq!(render("**unclosed"), "**unclosed");
    assert_eq!(render("`unclosed"), "`unclosed");
    assert_eq!(render("[label](unclosed"), "[label](unclosed");
    assert_eq!(render("```js\nunclosed"), "```js<br>unclosed");
}

#[test]
fn text_markup_escapes_everything() {
    let markup = Markup::text("<b>hi</b>\nthere");
    assert_eq!(markup.to_html(), "&lt;b&gt;hi&lt;/b&gt;<br>there");
    assert_eq!(markup.code_block_count(), 0);
}
