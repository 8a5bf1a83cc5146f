//! Column-based word wrapping for box labels.
//!
//! Graphviz does not reflow text inside fixed-size boxes, so labels are wrapped before they are
//! embedded. Widths are display columns (`unicode-width`), lines break only at whitespace, and a
//! word wider than the limit is kept whole on its own line.

use unicode_width::UnicodeWidthStr;

/// Greedy word wrap of a single paragraph. Internal whitespace runs collapse to one space.
pub fn wrap_paragraph(text: &str, width: usize) -> Vec<String> {
    wrap_words(text.split_whitespace(), width)
}

/// Wraps `text` followed by `unit`, where `unit` (e.g. `(n = 12)`) is never broken.
pub fn wrap_with_unit(text: &str, unit: &str, width: usize) -> String {
    wrap_words(text.split_whitespace().chain(std::iter::once(unit)), width).join("\n")
}

fn wrap_words<'a>(words: impl Iterator<Item = &'a str>, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    let mut cur_width = 0usize;

    for word in words {
        let w = UnicodeWidthStr::width(word);
        if cur.is_empty() {
            cur.push_str(word);
            cur_width = w;
            continue;
        }
        if cur_width + 1 + w <= width {
            cur.push(' ');
            cur.push_str(word);
            cur_width += 1 + w;
        } else {
            lines.push(std::mem::take(&mut cur));
            cur.push_str(word);
            cur_width = w;
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Wraps each `\n`-separated paragraph independently and joins the result with `\n`.
pub fn wrap(text: &str, width: usize) -> String {
    text.split('\n')
        .map(|para| wrap_paragraph(para, width).join("\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn line_count(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        text.split('\n').count()
    }
}
