use regex::Regex;

#[derive(Debug)]
pub enum ChunkerError {
    InvalidConfiguration(String),
}

impl std::fmt::Display for ChunkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkerError::InvalidConfiguration(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for ChunkerError {}

/// A chunk boundary decision before embedding: the text segment and its fixed
/// position within the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSpan {
    pub text: String,
    pub ordinal: i32,
}

/// Splits text into overlapping segments, preferring sentence boundaries,
/// then whitespace, then hard character cuts. Sizes are in characters.
/// Identical input and configuration always produce identical spans, which is
/// what makes reprocessing idempotent.
#[derive(Debug, Clone)]
pub struct Chunker {
    sentence_end: Regex,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            // Sentence-ending punctuation, optional closing quote/bracket,
            // then whitespace. The cut lands after the whitespace run.
            sentence_end: Regex::new(r#"[.!?]["')\]]*\s+"#)
                .expect("sentence boundary pattern is valid"),
        }
    }
}

impl Chunker {
    pub fn validate(chunk_size: usize, overlap: usize) -> Result<(), ChunkerError> {
        if chunk_size == 0 {
            return Err(ChunkerError::InvalidConfiguration(
                "Chunk size must be positive".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(ChunkerError::InvalidConfiguration(format!(
                "Overlap must be smaller than chunk size ({} >= {})",
                overlap, chunk_size
            )));
        }
        Ok(())
    }

    pub fn chunk(
        &self,
        text: &str,
        chunk_size: usize,
        overlap: usize,
    ) -> Result<Vec<ChunkSpan>, ChunkerError> {
        Self::validate(chunk_size, overlap)?;

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        // Byte offset of every char, plus the end sentinel; all window
        // arithmetic below is in char positions so multi-byte text can never
        // be cut mid-character.
        let char_pos: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total_chars = char_pos.len() - 1;

        let sentence_breaks = self.sentence_break_positions(text, &char_pos);
        let whitespace_breaks = whitespace_break_positions(text);

        let mut spans = Vec::new();
        let mut start = 0usize;
        let mut ordinal = 0i32;

        while start < total_chars {
            let window_end = (start + chunk_size).min(total_chars);

            let cut = if window_end == total_chars {
                total_chars
            } else {
                // The earliest admissible cut must clear the overlap (or the
                // window would stop advancing) and half the window (or a
                // boundary-dense text would degrade into slivers).
                let floor = start + (chunk_size / 2).max(overlap + 1);
                last_break_in(&sentence_breaks, floor, window_end)
                    .or_else(|| last_break_in(&whitespace_breaks, floor, window_end))
                    .unwrap_or(window_end)
            };

            spans.push(ChunkSpan {
                text: text[char_pos[start]..char_pos[cut]].to_string(),
                ordinal,
            });
            ordinal += 1;

            if cut == total_chars {
                break;
            }
            start = cut - overlap;
        }

        Ok(spans)
    }

    /// Char positions immediately after a sentence end, ascending.
    fn sentence_break_positions(&self, text: &str, char_pos: &[usize]) -> Vec<usize> {
        self.sentence_end
            .find_iter(text)
            .map(|m| byte_to_char_index(char_pos, m.end()))
            .collect()
    }
}

/// Char positions immediately after a whitespace char, ascending.
fn whitespace_break_positions(text: &str) -> Vec<usize> {
    text.chars()
        .enumerate()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i + 1)
        .collect()
}

fn byte_to_char_index(char_pos: &[usize], byte_offset: usize) -> usize {
    char_pos.partition_point(|&p| p < byte_offset)
}

/// Largest break position b with floor < b <= end, if any.
fn last_break_in(breaks: &[usize], floor: usize, end: usize) -> Option<usize> {
    let idx = breaks.partition_point(|&b| b <= end);
    if idx == 0 {
        return None;
    }
    let candidate = breaks[idx - 1];
    (candidate > floor).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_rejected() {
        let chunker = Chunker::default();

        assert!(chunker.chunk("some text", 100, 100).is_err());
        assert!(chunker.chunk("some text", 100, 150).is_err());
        assert!(chunker.chunk("some text", 0, 0).is_err());
    }

    #[test]
    fn test_empty_input_yields_empty_sequence() {
        let chunker = Chunker::default();

        assert!(chunker.chunk("", 100, 10).unwrap().is_empty());
        assert!(chunker.chunk("   \n\t  ", 100, 10).unwrap().is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunker = Chunker::default();
        let spans = chunker.chunk("A short note.", 100, 10).unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "A short note.");
        assert_eq!(spans[0].ordinal, 0);
    }

    #[test]
    fn test_deterministic_boundaries() {
        let chunker = Chunker::default();
        let text = "First sentence here. Second sentence follows. Third one closes. ".repeat(20);

        let first = chunker.chunk(&text, 120, 20).unwrap();
        let second = chunker.chunk(&text, 120, 20).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_ordinals_are_contiguous_from_zero() {
        let chunker = Chunker::default();
        let text = "word. ".repeat(300);
        let spans = chunker.chunk(&text, 100, 10).unwrap();

        for (i, span) in spans.iter().enumerate() {
            assert_eq!(span.ordinal, i as i32);
        }
    }

    #[test]
    fn test_1200_chars_at_500_50_gives_three_chunks() {
        let chunker = Chunker::default();
        let text = "word. ".repeat(200);
        assert_eq!(text.chars().count(), 1200);

        let spans = chunker.chunk(&text, 500, 50).unwrap();

        assert_eq!(spans.len(), 3);
        for span in &spans {
            assert!(span.text.chars().count() <= 500);
        }
    }

    #[test]
    fn test_overlap_carries_previous_tail() {
        let chunker = Chunker::default();
        let overlap = 50;
        let text = "word. ".repeat(200);
        let spans = chunker.chunk(&text, 500, overlap).unwrap();

        assert!(spans.len() > 1);
        for pair in spans.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let tail: String = prev[prev.len() - overlap..].iter().collect();
            let head: String = pair[1].text.chars().take(overlap).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_whitespace_fallback_without_punctuation() {
        let chunker = Chunker::default();
        let text = "alpha beta gamma delta ".repeat(50);
        let spans = chunker.chunk(&text, 100, 10).unwrap();

        assert!(spans.len() > 1);
        for span in &spans {
            assert!(span.text.chars().count() <= 100);
            // Every cut landed after a whitespace run
            assert!(span.text.ends_with(' ') || span.ordinal == spans.len() as i32 - 1);
        }
    }

    #[test]
    fn test_hard_cut_is_char_boundary_safe() {
        let chunker = Chunker::default();
        let text = "é".repeat(250);
        let spans = chunker.chunk(&text, 100, 10).unwrap();

        assert!(spans.len() > 1);
        let reassembled_chars: usize = spans.iter().map(|s| s.text.chars().count()).sum();
        // Overlapping regions are counted once per span they appear in
        assert!(reassembled_chars >= 250);
    }
}
