//! Lightweight sentence splitter.
//!
//! A boundary is a `.`, `!` or `?` followed by at least one whitespace
//! character. Punctuation stays with the preceding sentence and the
//! whitespace run is dropped.

/// Split `text` into trimmed, non-empty sentences.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev_terminal = false;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if prev_terminal && c.is_whitespace() {
            push_trimmed(&mut sentences, &text[start..i]);
            // Swallow the rest of the whitespace run.
            let mut end = i + c.len_utf8();
            while let Some(&(j, w)) = chars.peek() {
                if !w.is_whitespace() {
                    break;
                }
                end = j + w.len_utf8();
                chars.next();
            }
            start = end;
            prev_terminal = false;
            continue;
        }
        prev_terminal = matches!(c, '.' | '!' | '?');
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece);
    }
}
