use regex::Regex;
use std::sync::OnceLock;

static PARAGRAPH_RE: OnceLock<Regex> = OnceLock::new();
static SENTENCE_RE: OnceLock<Regex> = OnceLock::new();

/// Structural boundaries the splitter can cut at, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// A blank line (possibly containing whitespace) between paragraphs
    Paragraph,
    /// `.`, `!` or `?` followed by whitespace
    Sentence,
}

impl Boundary {
    /// Splitting strategies in descending granularity
    pub const ORDERED: [Boundary; 2] = [Boundary::Paragraph, Boundary::Sentence];

    fn regex(self) -> &'static Regex {
        match self {
            Boundary::Paragraph => PARAGRAPH_RE
                .get_or_init(|| Regex::new(r"\n\s*\n").expect("valid paragraph regex")),
            Boundary::Sentence => SENTENCE_RE
                .get_or_init(|| Regex::new(r"[.!?]\s+").expect("valid sentence regex")),
        }
    }

    /// Resumption points in `text`: the offset just past each boundary
    pub fn cut_points(self, text: &str) -> impl Iterator<Item = usize> + '_ {
        self.regex().find_iter(text).map(|m| m.end())
    }
}
