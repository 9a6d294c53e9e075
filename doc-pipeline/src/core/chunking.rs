//! Chunking module: splits long descriptions into sentence-aligned chunks.
//!
//! Strategy:
//! - Split the text into sentences (`.`, `!`, `?` plus trailing closing
//!   quotes/brackets, followed by whitespace or end of text);
//! - Greedily pack sentences, joined by one space, while the chunk stays
//!   within `max_length` chars;
//! - A sentence longer than `max_length` gets a chunk of its own and is
//!   never cut.

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk max length must be greater than 0, got {0}")]
    InvalidMaxLength(usize),
}

/// Split `text` into chunks of at most `max_length` chars (see module docs).
///
/// Whitespace-only text yields no chunks.
///
/// # Example
/// ```
/// use doc_pipeline::core::chunking::chunk_text;
///
/// let chunks = chunk_text("Adds numbers. Returns the sum.", 16).unwrap();
/// assert_eq!(chunks, vec!["Adds numbers.", "Returns the sum."]);
/// ```
pub fn chunk_text(text: &str, max_length: usize) -> Result<Vec<String>, ChunkError> {
    if max_length == 0 {
        return Err(ChunkError::InvalidMaxLength(max_length));
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in split_sentences(text) {
        let len = sentence.chars().count();
        if current.is_empty() {
            current.push_str(sentence);
            current_len = len;
        } else if current_len + len + 1 <= max_length {
            current.push(' ');
            current.push_str(sentence);
            current_len += len + 1;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(sentence);
            current_len = len;
        }
        if len > max_length {
            debug!(len, max_length, "chunking: sentence exceeds max length, kept whole");
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    Ok(chunks)
}

/// Trimmed, non-empty sentences of `text` in order.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        // Swallow runs like "?!", "..." and closing quotes/brackets.
        while let Some(&(_, next)) = chars.peek() {
            if matches!(next, '.' | '!' | '?' | '"' | '\'' | ')' | ']' | '}' | '”' | '’' | '»') {
                chars.next();
            } else {
                break;
            }
        }
        let end = chars.peek().map_or(text.len(), |&(i, _)| i);
        let at_boundary = chars.peek().is_none_or(|&(_, next)| next.is_whitespace());
        if at_boundary {
            push_trimmed(&mut out, &text[start..end]);
            start = end;
        }
    }
    push_trimmed(&mut out, &text[start..]);
    out
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, s: &'a str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_max_length_is_rejected() {
        assert_eq!(chunk_text("Hi.", 0), Err(ChunkError::InvalidMaxLength(0)));
    }

    #[test]
    fn whitespace_only_yields_nothing() {
        assert!(chunk_text("  \n\t ", 10).unwrap().is_empty());
    }

    #[test]
    fn sentences_respect_terminators_and_closers() {
        let s = split_sentences("He said \"stop.\" Then (he left!) Version 1.2 is out? Yes");
        assert_eq!(
            s,
            vec!["He said \"stop.\"", "Then (he left!)", "Version 1.2 is out?", "Yes"]
        );
    }

    #[test]
    fn packs_greedily_and_keeps_long_sentences_whole() {
        let text = "Short one. Another short. This sentence is definitely longer than twenty chars. End.";
        let chunks = chunk_text(text, 25).unwrap();
        assert_eq!(
            chunks,
            vec![
                "Short one. Another short.",
                "This sentence is definitely longer than twenty chars.",
                "End.",
            ]
        );
    }

    #[test]
    fn overlong_first_sentence_never_leaves_an_empty_chunk() {
        let chunks = chunk_text("Supercalifragilistic sentence here. Ok.", 5).unwrap();
        assert_eq!(chunks, vec!["Supercalifragilistic sentence here.", "Ok."]);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn bound_and_reassembly_hold() {
        let text = "Loads the config. Validates every field! Falls back to defaults? \
                    Returns the merged value. Logs a warning when the file is missing.";
        for max in [1, 10, 30, 60, 200] {
            let chunks = chunk_text(text, max).unwrap();
            for c in &chunks {
                let fits = c.chars().count() <= max;
                let single = split_sentences(c).len() == 1;
                assert!(fits || single, "chunk {c:?} breaks the bound for {max}");
            }
            assert_eq!(chunks.join(" "), split_sentences(text).join(" "));
        }
    }

    #[test]
    fn lengths_count_chars_not_bytes() {
        let chunks = chunk_text("Größe prüfen. Ändern.", 21).unwrap();
        assert_eq!(chunks, vec!["Größe prüfen. Ändern."]);
    }
}
