//! HTML minification and tag injection helpers.

use std::sync::LazyLock;

use regex::Regex;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex is valid"));

static RAW_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(pre|textarea|script|style)\b.*?</(pre|textarea|script|style)\s*>")
        .expect("raw text regex is valid")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinifyHtml {
    pub remove_comments: bool,
    pub collapse_whitespace: bool,
}

impl MinifyHtml {
    pub fn all() -> Self {
        Self {
            remove_comments: true,
            collapse_whitespace: true,
        }
    }
}

/// Minify markup.
///
/// Conditional comments (`<!--[if IE]>`) survive comment removal. Whitespace
/// inside `pre`, `textarea`, `script` and `style` elements is preserved.
pub fn minify(html: &str, options: MinifyHtml) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for raw in RAW_TEXT.find_iter(html) {
        out.push_str(&minify_text(&html[last..raw.start()], options));
        out.push_str(raw.as_str());
        last = raw.end();
    }
    out.push_str(&minify_text(&html[last..], options));

    if options.collapse_whitespace {
        out.trim().to_string()
    } else {
        out
    }
}

fn minify_text(text: &str, options: MinifyHtml) -> String {
    let mut text = if options.remove_comments {
        COMMENT
            .replace_all(text, |caps: &regex::Captures<'_>| {
                if caps[0].starts_with("<!--[if") {
                    caps[0].to_string()
                } else {
                    String::new()
                }
            })
            .into_owned()
    } else {
        text.to_string()
    };

    if options.collapse_whitespace {
        text = collapse(&text);
    }
    text
}

/// Drop whitespace between tags and squeeze other runs to one space.
fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let after_tag = out.ends_with('>') || out.is_empty();
            if !(after_tag && ch == '<') {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(ch);
    }
    if pending_space && !out.is_empty() && !out.ends_with('>') {
        out.push(' ');
    }
    out
}

/// Insert `snippet` right before the closing `tag`, or append it.
pub fn insert_before_close(html: &mut String, tag: &str, snippet: &str) {
    let needle = format!("</{tag}>");
    let lower = html.to_ascii_lowercase();
    match lower.rfind(&needle) {
        Some(pos) => html.insert_str(pos, snippet),
        None => html.push_str(snippet),
    }
}

/// Escape text for an attribute value or element body.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_removed_except_conditionals() {
        let html = "<p>a</p><!-- note --><!--[if IE]><p>ie</p><![endif]-->";
        let out = minify(
            html,
            MinifyHtml {
                remove_comments: true,
                collapse_whitespace: false,
            },
        );
        assert_eq!(out, "<p>a</p><!--[if IE]><p>ie</p><![endif]-->");
    }

    #[test]
    fn whitespace_between_tags_is_dropped() {
        let html = "<ul>\n  <li>one   two</li>\n  <li>three</li>\n</ul>\n";
        assert_eq!(minify(html, MinifyHtml::all()), "<ul><li>one two</li><li>three</li></ul>");
    }

    #[test]
    fn pre_and_script_keep_whitespace() {
        let html = "<div>\n  <pre>  a\n  b</pre>\n  <script>\n var x = 1;\n</script>\n</div>";
        let out = minify(html, MinifyHtml::all());
        assert!(out.contains("<pre>  a\n  b</pre>"));
        assert!(out.contains("<script>\n var x = 1;\n</script>"));
    }

    #[test]
    fn no_options_is_identity() {
        let html = "<p>\n  <!-- x -->\n</p>";
        assert_eq!(minify(html, MinifyHtml::default()), html);
    }

    #[test]
    fn insert_before_closing_tag() {
        let mut html = "<html><body><p>x</p></BODY></html>".to_string();
        insert_before_close(&mut html, "body", "<script></script>");
        assert_eq!(html, "<html><body><p>x</p><script></script></BODY></html>");

        let mut fragment = "<p>x</p>".to_string();
        insert_before_close(&mut fragment, "head", "<link>");
        assert_eq!(fragment, "<p>x</p><link>");
    }
}
