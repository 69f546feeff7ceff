use pulldown_cmark::{html, Event, Options, Parser};

/// Render memo/comment Markdown to an HTML string for `inner_html`.
///
/// GFM subset (tables, strikethrough, task lists) plus math. Math segments
/// are emitted as KaTeX-compatible spans; typesetting itself is done by the
/// external display library. Soft breaks render as hard breaks, matching
/// how memos are written (one line per statement).
pub(crate) fn render_markdown(src: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_MATH);

    let parser = Parser::new_ext(src, opts).map(|ev| match ev {
        Event::SoftBreak => Event::HardBreak,
        Event::InlineMath(tex) => Event::Html(
            format!(
                "<span class=\"math math-inline\">${}$</span>",
                escape_html(&tex)
            )
            .into(),
        ),
        Event::DisplayMath(tex) => Event::Html(
            format!(
                "<span class=\"math math-display\">$${}$$</span>",
                escape_html(&tex)
            )
            .into(),
        ),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Rendered content, with the viewer's placeholder for empty input.
pub(crate) fn render_markdown_or_placeholder(src: &str) -> String {
    if src.trim().is_empty() {
        render_markdown("*Nothing to preview*")
    } else {
        render_markdown(src)
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markdown_renders() {
        let html = render_markdown("# Title\n\nsome *emphasis*");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn test_gfm_table_renders() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_single_newline_becomes_line_break() {
        let html = render_markdown("line one\nline two");
        assert!(html.contains("<br"));
    }

    #[test]
    fn test_inline_math_becomes_katex_span() {
        let html = render_markdown("Euler: $e^{i\\pi} + 1 = 0$");
        assert!(html.contains("class=\"math math-inline\""));
        assert!(html.contains("e^{i\\pi} + 1 = 0"));
    }

    #[test]
    fn test_math_content_is_escaped() {
        let html = render_markdown("$a < b$");
        assert!(html.contains("a &lt; b"));
        assert!(!html.contains("<b$"));
    }

    #[test]
    fn test_raw_html_in_content_survives_as_markdown_default() {
        // Script-bearing content is the datastore's and renderer's concern;
        // here we only assert the renderer produces output for fenced code.
        let html = render_markdown("```rust\nlet x = 1;\n```");
        assert!(html.contains("<code"));
        assert!(html.contains("let x = 1;"));
    }

    #[test]
    fn test_placeholder_for_empty_content() {
        let html = render_markdown_or_placeholder("   ");
        assert!(html.contains("<em>Nothing to preview</em>"));
    }
}
