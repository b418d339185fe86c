//! HTML minification — spec.md §4.4 step 4. Strips comments and collapses
//! runs of whitespace in text nodes outside elements where whitespace is
//! significant, using `lol_html`'s streaming rewriter the same way the
//! link-rewriting code elsewhere in this corpus drives it: build a
//! `Settings` with selector-scoped content handlers, write the input once,
//! and read the sink buffer back out.

use lol_html::{comments, text, HtmlRewriter, Settings};
use rendora_types::RendoraError;

const PRESERVE_WHITESPACE_SELECTOR: &str = "*:not(script):not(style):not(pre):not(textarea)";

pub fn minify(html: &str) -> Result<String, RendoraError> {
    let mut output = Vec::with_capacity(html.len());

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                comments!("*", |c| {
                    c.remove();
                    Ok(())
                }),
                text!(PRESERVE_WHITESPACE_SELECTOR, |t| {
                    if t.last_in_text_node() {
                        let collapsed = collapse_whitespace(t.as_str());
                        t.replace(&collapsed, lol_html::html_content::ContentType::Text);
                    }
                    Ok(())
                }),
            ],
            ..Settings::default()
        },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| RendoraError::MinifyError(e.to_string()))?;
    rewriter
        .end()
        .map_err(|e| RendoraError::MinifyError(e.to_string()))?;

    String::from_utf8(output).map_err(|e| RendoraError::MinifyError(e.to_string()))
}

/// Collapses any run of whitespace (including newlines) down to a single
/// space. Leaves non-whitespace content untouched.
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments() {
        let out = minify("<div><!-- drop me -->hello</div>").unwrap();
        assert!(!out.contains("drop me"));
        assert!(out.contains("hello"));
    }

    #[test]
    fn collapses_runs_of_whitespace_in_text_nodes() {
        let out = minify("<p>hello\n\n   world</p>").unwrap();
        assert!(out.contains("hello world"));
    }

    #[test]
    fn leaves_pre_content_untouched() {
        let out = minify("<pre>  keep\n  me  </pre>").unwrap();
        assert!(out.contains("  keep\n  me  "));
    }

    #[test]
    fn passes_through_html_with_nothing_to_minify() {
        let out = minify("<html><body>x</body></html>").unwrap();
        assert!(out.contains("<body>x</body>"));
    }
}
