const MARKUP_CHARS: [char; 5] = ['*', '_', '>', '`', '#'];

/// Strip markdown structure for chat display: markup characters removed,
/// runs of three or more newlines collapsed to two, surrounding whitespace
/// trimmed. The transformation is one-way; history stores the cleaned text.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0usize;
    for c in text.chars() {
        if MARKUP_CHARS.contains(&c) {
            continue;
        }
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(c);
    }
    out.trim().to_string()
}

/// First `max_chars` characters with newlines flattened to spaces, for
/// one-line source listings.
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .take(max_chars)
        .collect()
}
