//! Sentence-aware chunking for résumé and job-description text.

/// Splits text into sentences at runs of whitespace that follow `.`, `!` or `?`.
/// Terminal punctuation stays attached to its sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, ch)) = iter.next() {
        if ch.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            sentences.push(&text[start..idx]);
            // swallow the whole whitespace run
            let mut next_start = idx + ch.len_utf8();
            while let Some(&(next_idx, next_ch)) = iter.peek() {
                if !next_ch.is_whitespace() {
                    break;
                }
                next_start = next_idx + next_ch.len_utf8();
                iter.next();
            }
            start = next_start;
            prev = None;
            continue;
        }
        prev = Some(ch);
    }

    if start < text.len() || sentences.is_empty() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Packs sentences greedily into chunks of at most `max_chunk_size` characters.
///
/// A single sentence longer than the limit becomes its own chunk. Chunks are
/// trimmed; empty input yields no chunks.
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        if current.chars().count() + sentence.chars().count() <= max_chunk_size {
            current.push_str(sentence);
            current.push(' ');
        } else {
            if !current.is_empty() {
                chunks.push(current.trim().to_string());
            }
            current = format!("{sentence} ");
        }
    }

    if !current.is_empty() {
        chunks.push(current.trim().to_string());
    }

    tracing::debug!("Created {} chunks", chunks.len());
    chunks
}
