/// Replace the given byte spans with a fixed token.
///
/// Spans are applied in reverse position order so earlier replacements do not
/// shift later offsets. Overlapping spans are collapsed into the first one
/// processed.
pub fn mask_spans(text: &str, spans: &[(usize, usize)], token: &str) -> String {
    if spans.is_empty() {
        return text.to_string();
    }

    let mut sorted: Vec<(usize, usize)> = spans.to_vec();
    sorted.sort_by(|a, b| b.0.cmp(&a.0));

    let mut result = text.to_string();
    let mut last_start = usize::MAX;

    for (start, end) in sorted {
        if end > last_start {
            continue;
        }
        result.replace_range(start..end, token);
        last_start = start;
    }

    result
}
