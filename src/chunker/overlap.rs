use crate::parser::{Boundary, detect_formula_spans};

/// Trailing text of a closed chunk used to seed the next one
///
/// Starts from the last `overlap_chars` characters, then:
/// - if a formula ends inside that window, starts at the formula instead
/// - otherwise resumes after the first paragraph break in the window
/// - otherwise resumes after the first sentence end in the window
///
/// Text no longer than the window is returned whole.
pub(crate) fn compute_overlap(text: &str, overlap_chars: usize) -> String {
    let total_chars = text.chars().count();
    if total_chars <= overlap_chars {
        return text.to_string();
    }

    let window_start = byte_offset_of_char(text, total_chars - overlap_chars);

    let formula_start = detect_formula_spans(text)
        .iter()
        .filter(|s| s.end > window_start)
        .map(|s| s.start)
        .min();
    if let Some(start) = formula_start {
        return text[start..].to_string();
    }

    let window = &text[window_start..];
    for boundary in Boundary::ORDERED {
        if let Some(resume) = boundary.cut_points(window).find(|&p| p < window.len()) {
            return window[resume..].to_string();
        }
    }

    window.to_string()
}

/// Raw tail of the last `overlap_chars` characters
pub(crate) fn tail_chars(text: &str, overlap_chars: usize) -> &str {
    let total_chars = text.chars().count();
    if total_chars <= overlap_chars {
        return text;
    }
    &text[byte_offset_of_char(text, total_chars - overlap_chars)..]
}

/// Byte offset of the `n`th character, or the text length past the end
pub(crate) fn byte_offset_of_char(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_whole_overlap() {
        assert_eq!(compute_overlap("short text", 40), "short text");
        assert_eq!(tail_chars("short", 10), "short");
    }

    #[test]
    fn test_zero_window_is_empty() {
        assert_eq!(compute_overlap("some text here", 0), "");
    }

    #[test]
    fn test_raw_window_without_structure() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        assert_eq!(compute_overlap(text, 5), "vwxyz");
        assert_eq!(tail_chars(text, 5), "vwxyz");
    }

    #[test]
    fn test_trims_to_paragraph_break() {
        let text = format!("{}\n\nTail paragraph.", "x".repeat(100));
        // Window reaches back past the blank line
        assert_eq!(compute_overlap(&text, 25), "Tail paragraph.");
    }

    #[test]
    fn test_trims_to_sentence_end() {
        let text = format!("{} First ends here. Second sentence", "y".repeat(80));
        assert_eq!(compute_overlap(&text, 30), "Second sentence");
    }

    #[test]
    fn test_paragraph_preferred_over_sentence() {
        let text = format!("{}. One. Two.\n\nThree four", "z".repeat(60));
        assert_eq!(compute_overlap(&text, 22), "Three four");
    }

    #[test]
    fn test_trailing_boundary_is_ignored() {
        // A break at the very end would leave nothing to carry
        let text = format!("{} closing words here.\n\n", "w".repeat(60));
        let overlap = compute_overlap(&text, 13);
        assert!(!overlap.is_empty());
        assert_eq!(overlap, "words here.\n\n");
    }

    #[test]
    fn test_formula_straddling_window_is_kept_whole() {
        let formula = "$$E = mc^2 + \\frac{1}{2} m v^2$$";
        let text = format!("{} {}\nend.", "a".repeat(200), formula);
        let overlap = compute_overlap(&text, 10);
        assert!(overlap.starts_with("$$E = mc^2"));
        assert!(overlap.ends_with("end."));
    }

    #[test]
    fn test_inline_formula_in_window() {
        let text = format!("{} where $F = ma$ holds", "b".repeat(100));
        let overlap = compute_overlap(&text, 12);
        assert_eq!(overlap, "$F = ma$ holds");
    }

    #[test]
    fn test_multibyte_window_boundary() {
        let text = "ααααββββγγγγ";
        assert_eq!(compute_overlap(text, 4), "γγγγ");
        assert_eq!(byte_offset_of_char(text, 8), "ααααββββ".len());
        assert_eq!(byte_offset_of_char(text, 99), text.len());
    }
}
