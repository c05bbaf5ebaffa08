use crate::bookmarks::MatchSpan;

/// Sorts spans by start and folds every span that overlaps or touches the
/// previous merged one into it.
pub fn merge_spans(spans: &[MatchSpan]) -> Vec<(usize, usize)> {
    let mut sorted: Vec<(usize, usize)> = spans.iter().map(|s| (s.start, s.end)).collect();
    sorted.sort_by_key(|&(start, _)| start);

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(sorted.len());
    for (start, end) in sorted {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Renders `text` as HTML with every merged span wrapped in `<mark>`.
/// Spans that do not fall on character boundaries are ignored.
pub fn highlight(text: &str, spans: &[MatchSpan]) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * 13);
    let mut cursor = 0;

    for (start, end) in merge_spans(spans) {
        if start < cursor
            || end > text.len()
            || !text.is_char_boundary(start)
            || !text.is_char_boundary(end)
        {
            continue;
        }
        out.push_str(&escape_html(&text[cursor..start]));
        out.push_str("<mark>");
        out.push_str(&escape_html(&text[start..end]));
        out.push_str("</mark>");
        cursor = end;
    }
    out.push_str(&escape_html(&text[cursor..]));

    out
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
