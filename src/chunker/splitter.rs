use super::overlap::{byte_offset_of_char, compute_overlap, tail_chars};
use crate::config::ChunkerConfig;
use crate::parser::{
    Boundary, FormulaSpan, advance_past_formula, detect_formula_spans, is_safe_cut,
    retreat_from_formula,
};
use tracing::debug;

/// A sub-chunk of a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Piece {
    /// Overlap prefix followed by `section[start..end]`
    pub content: String,
    pub token_count: usize,
    /// Section-relative byte offset (start), overlap excluded
    pub start: usize,
    /// Section-relative byte offset (end)
    pub end: usize,
}

/// Run of consecutive units being accumulated into one piece
struct Buffer {
    prefix: String,
    start: usize,
    end: usize,
    /// Characters in prefix plus source slice
    chars: usize,
}

/// Split an oversized section into pieces of at most `max_chunk_size` tokens
///
/// Tries paragraph boundaries, then sentence boundaries, then fixed-width
/// windows, never cutting strictly inside a detected formula. Every piece
/// after the first is seeded with overlap from the piece before it. A unit
/// that cannot be reduced further is emitted on its own even if oversized.
pub(crate) fn split_section(text: &str, config: &ChunkerConfig) -> Vec<Piece> {
    let mut splitter = SectionSplitter {
        text,
        spans: detect_formula_spans(text),
        config,
        pieces: Vec::new(),
    };
    splitter.split_range(0, text.len(), 0);
    splitter.pieces
}

struct SectionSplitter<'a> {
    text: &'a str,
    spans: Vec<FormulaSpan>,
    config: &'a ChunkerConfig,
    pieces: Vec<Piece>,
}

impl SectionSplitter<'_> {
    /// Split `text[start..end]` using strategy `depth` and finer ones
    fn split_range(&mut self, start: usize, end: usize, depth: usize) {
        let Some(&boundary) = Boundary::ORDERED.get(depth) else {
            self.split_fixed(start, end);
            return;
        };

        let mut bounds = vec![start];
        bounds.extend(
            boundary
                .cut_points(&self.text[start..end])
                .map(|p| start + p)
                .filter(|&p| p < end && is_safe_cut(&self.spans, p)),
        );
        bounds.push(end);

        if bounds.len() <= 2 {
            self.split_range(start, end, depth + 1);
            return;
        }

        debug!(?boundary, units = bounds.len() - 1, "splitting range");

        let max_tokens = self.config.max_chunk_size;
        let mut buffer: Option<Buffer> = None;

        for unit in bounds.windows(2) {
            let (unit_start, unit_end) = (unit[0], unit[1]);
            let unit_chars = self.text[unit_start..unit_end].chars().count();

            // Too big on its own: hand it to the next strategy
            if unit_chars / 4 > max_tokens {
                if let Some(buf) = buffer.take() {
                    self.emit(buf);
                }
                self.split_range(unit_start, unit_end, depth + 1);
                continue;
            }

            buffer = match buffer.take() {
                Some(mut buf) if (buf.chars + unit_chars) / 4 <= max_tokens => {
                    buf.end = unit_end;
                    buf.chars += unit_chars;
                    Some(buf)
                }
                Some(buf) => {
                    self.emit(buf);
                    Some(self.open_buffer(unit_start, unit_end, unit_chars))
                }
                None => Some(self.open_buffer(unit_start, unit_end, unit_chars)),
            };
        }

        if let Some(buf) = buffer {
            self.emit(buf);
        }
    }

    /// Start a buffer, seeded with overlap when it still fits
    fn open_buffer(&self, start: usize, end: usize, unit_chars: usize) -> Buffer {
        let prefix = self
            .pieces
            .last()
            .map(|p| compute_overlap(&p.content, self.config.overlap_chars()))
            .unwrap_or_default();
        let prefix_chars = prefix.chars().count();

        if (prefix_chars + unit_chars) / 4 <= self.config.max_chunk_size {
            Buffer {
                prefix,
                start,
                end,
                chars: prefix_chars + unit_chars,
            }
        } else {
            Buffer {
                prefix: String::new(),
                start,
                end,
                chars: unit_chars,
            }
        }
    }

    /// Last resort: fixed character windows with a formula-safe overlap tail
    fn split_fixed(&mut self, start: usize, end: usize) {
        debug!(bytes = end - start, "falling back to fixed-width windows");

        let mut pos = start;
        while pos < end {
            let mut prefix = self.fixed_prefix();
            let mut prefix_chars = prefix.chars().count();
            if prefix_chars >= self.config.max_chars() {
                prefix.clear();
                prefix_chars = 0;
            }
            let budget = self.config.max_chars() - prefix_chars;

            let mut cut = pos + byte_offset_of_char(&self.text[pos..end], budget);
            if cut < end && !is_safe_cut(&self.spans, cut) {
                let back = retreat_from_formula(&self.spans, cut);
                cut = if back > pos {
                    back
                } else {
                    advance_past_formula(&self.spans, cut).min(end)
                };
            }

            let chars = prefix_chars + self.text[pos..cut].chars().count();
            self.emit(Buffer {
                prefix,
                start: pos,
                end: cut,
                chars,
            });
            pos = cut;
        }
    }

    /// Raw tail of the previous piece, widened to the start of any formula it cuts into
    fn fixed_prefix(&self) -> String {
        let Some(last) = self.pieces.last() else {
            return String::new();
        };
        let tail = tail_chars(&last.content, self.config.overlap_chars());
        let tail_start = last.content.len() - tail.len();
        let spans = detect_formula_spans(&last.content);
        last.content[retreat_from_formula(&spans, tail_start)..].to_string()
    }

    fn emit(&mut self, buf: Buffer) {
        let mut content = buf.prefix;
        content.push_str(&self.text[buf.start..buf.end]);

        self.pieces.push(Piece {
            content,
            token_count: buf.chars / 4,
            start: buf.start,
            end: buf.end,
        });
    }
}

#[cfg(test)]
mod split_tests {
    use super::*;

    fn config(max: usize, overlap: usize) -> ChunkerConfig {
        ChunkerConfig::new()
            .max_chunk_size(max)
            .overlap_size(overlap)
            .min_chunk_size(0)
    }

    /// Pieces must tile the input exactly when overlap is stripped
    fn assert_tiles(text: &str, pieces: &[Piece]) {
        let mut pos = 0;
        for piece in pieces {
            assert_eq!(piece.start, pos, "gap or overlap in source spans");
            assert!(piece.content.ends_with(&text[piece.start..piece.end]));
            pos = piece.end;
        }
        assert_eq!(pos, text.len());
    }

    #[test]
    fn test_paragraph_split() {
        let para = "word ".repeat(30); // 150 chars, 37 tokens
        let text = format!("{}\n\n{}\n\n{}", para, para, para);
        let pieces = split_section(&text, &config(50, 0));

        assert_eq!(pieces.len(), 3);
        assert_tiles(&text, &pieces);
        for piece in &pieces {
            assert!(piece.token_count <= 50);
        }
    }

    #[test]
    fn test_paragraphs_accumulate_until_full() {
        let para = "a".repeat(40);
        let text = vec![para.as_str(); 6].join("\n\n");
        let pieces = split_section(&text, &config(30, 0));

        // Two 42-char units make 21 tokens, a third would make 31
        assert_eq!(pieces.len(), 3);
        assert_tiles(&text, &pieces);
    }

    #[test]
    fn test_overlap_seeds_next_piece() {
        let first = format!("{} Closing sentence here.", "a".repeat(150));
        let second = "b".repeat(150);
        let text = format!("{}\n\n{}", first, second);
        let pieces = split_section(&text, &config(50, 10));

        assert_eq!(pieces.len(), 2);
        assert_tiles(&text, &pieces);
        // Both breaks in the window sit at its very end, so the raw window is carried
        assert_eq!(
            pieces[1].content,
            format!("{} Closing sentence here.\n\n{}", "a".repeat(15), second)
        );
    }

    #[test]
    fn test_overlap_dropped_when_it_would_overflow() {
        let para = "c".repeat(196); // 49 tokens
        let text = format!("{}\n\n{}", para, para);
        let pieces = split_section(&text, &config(50, 20));

        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[1].content, para);
        assert!(pieces.iter().all(|p| p.token_count <= 50));
    }

    #[test]
    fn test_sentence_fallback_for_single_paragraph() {
        let sentence = format!("{}. ", "d".repeat(58)); // 60 chars
        let text = sentence.repeat(10);
        let pieces = split_section(&text, &config(40, 0));

        assert!(pieces.len() > 1);
        assert_tiles(&text, &pieces);
        for piece in &pieces {
            assert!(piece.token_count <= 40);
            assert!(piece.content.ends_with(". "));
        }
    }

    #[test]
    fn test_fixed_width_fallback() {
        let text = "e".repeat(1000);
        let pieces = split_section(&text, &config(50, 10));

        assert_tiles(&text, &pieces);
        assert_eq!(pieces[0].content.len(), 200);
        for window in pieces.windows(2) {
            let tail = &window[0].content[window[0].content.len() - 40..];
            assert!(window[1].content.starts_with(tail));
        }
        assert!(pieces.iter().all(|p| p.token_count <= 50));
    }

    #[test]
    fn test_fixed_width_respects_multibyte() {
        let text = "λ".repeat(500);
        let pieces = split_section(&text, &config(20, 0));

        assert_tiles(&text, &pieces);
        assert!(pieces.iter().all(|p| p.content.chars().count() <= 80));
    }

    #[test]
    fn test_formula_blank_line_not_split() {
        let formula = "$$\nx = 1\n\ny = 2\n$$";
        let text = format!("{}\n\n{}\n\n{}", "f".repeat(150), formula, "g".repeat(150));
        let pieces = split_section(&text, &config(45, 0));

        assert_tiles(&text, &pieces);
        assert!(pieces.iter().any(|p| p.content.contains(formula)));
    }

    #[test]
    fn test_fixed_width_backs_off_to_formula_start() {
        let text = format!("{}$h_1 + h_2 + h_3$ {}", "h".repeat(190), "i".repeat(50));
        let pieces = split_section(&text, &config(50, 0));

        assert_tiles(&text, &pieces);
        assert_eq!(pieces[0].end, 190);
        assert!(pieces[1].content.starts_with("$h_1"));
    }

    #[test]
    fn test_fixed_width_overlap_keeps_formula_whole() {
        let text = "words here $x_1 + y_1 + z_1$ and so on ".repeat(30);
        let pieces = split_section(&text, &config(40, 7));

        assert!(pieces.len() > 2);
        assert_tiles(&text, &pieces);
        for piece in &pieces[1..] {
            let prefix = &piece.content[..piece.content.len() - (piece.end - piece.start)];
            assert!(!prefix.is_empty());
            // A prefix opening mid-formula would carry an unpaired `$`
            assert_eq!(prefix.matches('$').count() % 2, 0, "prefix {:?}", prefix);
            assert!(piece.token_count <= 40);
        }
    }

    #[test]
    fn test_sentence_cuts_skip_formula_punctuation() {
        let text = "Here $a. b! c? d. e$ ends. ".repeat(20);
        let spans = detect_formula_spans(&text);
        let pieces = split_section(&text, &config(30, 0));

        assert_eq!(spans.len(), 20);
        assert!(pieces.len() > 1);
        assert_tiles(&text, &pieces);
        for piece in &pieces {
            assert!(piece.content.ends_with("ends. "), "piece {:?}", piece.content);
            for span in &spans {
                assert!(!span.contains_strictly(piece.start));
                assert!(!span.contains_strictly(piece.end));
            }
        }
    }

    #[test]
    fn test_oversized_formula_emitted_whole() {
        let formula = format!("$${}$$", "k".repeat(400));
        let pieces = split_section(&formula, &config(50, 0));

        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].content, formula);
        assert!(pieces[0].token_count > 50);
    }
}
