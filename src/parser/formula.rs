use regex::Regex;
use std::sync::OnceLock;

/// Math environments treated as a single formula
const MATH_ENVIRONMENTS: &str = "equation|align|eqnarray|gathered|cases";

static DISPLAY_RE: OnceLock<Regex> = OnceLock::new();
static INLINE_RE: OnceLock<Regex> = OnceLock::new();
static ENV_BEGIN_RE: OnceLock<Regex> = OnceLock::new();

fn display_regex() -> &'static Regex {
    DISPLAY_RE.get_or_init(|| Regex::new(r"(?s)\$\$.+?\$\$").expect("valid display math regex"))
}

fn inline_regex() -> &'static Regex {
    INLINE_RE.get_or_init(|| Regex::new(r"\$[^$\n]+\$").expect("valid inline math regex"))
}

fn env_begin_regex() -> &'static Regex {
    ENV_BEGIN_RE.get_or_init(|| {
        Regex::new(&format!(r"\\begin\{{({})(\*?)\}}", MATH_ENVIRONMENTS))
            .expect("valid math environment regex")
    })
}

/// Byte range of a detected math expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormulaSpan {
    pub start: usize,
    pub end: usize,
}

impl FormulaSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True when `pos` lies inside the span, excluding both edges
    pub fn contains_strictly(&self, pos: usize) -> bool {
        self.start < pos && pos < self.end
    }
}

/// Detect `$$...$$`, `$...$` and `\begin{env}...\end{env}` formulas
///
/// Spans are sorted by start and may overlap (an environment nested in a
/// display block yields both). Inline matches are searched only outside
/// display and environment spans, so the closing `$$` of one block and the
/// opening `$$` of the next are never paired as an inline formula.
pub fn detect_formula_spans(text: &str) -> Vec<FormulaSpan> {
    let mut spans: Vec<FormulaSpan> = display_regex()
        .find_iter(text)
        .map(|m| FormulaSpan::new(m.start(), m.end()))
        .collect();

    for caps in env_begin_regex().captures_iter(text) {
        let (Some(begin), Some(name), Some(star)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let closing = format!("\\end{{{}{}}}", name.as_str(), star.as_str());
        if let Some(offset) = text[begin.end()..].find(&closing) {
            spans.push(FormulaSpan::new(
                begin.start(),
                begin.end() + offset + closing.len(),
            ));
        }
    }

    let masked = mask_spans(text, &spans);
    spans.extend(
        inline_regex()
            .find_iter(&masked)
            .map(|m| FormulaSpan::new(m.start(), m.end())),
    );

    spans.sort();
    spans.dedup();
    spans
}

/// Replace every character covered by a span with spaces, keeping offsets
fn mask_spans(text: &str, spans: &[FormulaSpan]) -> String {
    let mut bytes = text.as_bytes().to_vec();
    for span in spans {
        bytes[span.start..span.end].fill(b' ');
    }
    // Span edges are char boundaries, so whole characters were blanked
    String::from_utf8(bytes).unwrap_or_else(|_| text.to_string())
}

/// A cut at `pos` is safe when no span strictly contains it
pub fn is_safe_cut(spans: &[FormulaSpan], pos: usize) -> bool {
    !spans
        .iter()
        .take_while(|s| s.start < pos)
        .any(|s| s.contains_strictly(pos))
}

/// Move `pos` back to the start of every formula enclosing it
pub fn retreat_from_formula(spans: &[FormulaSpan], mut pos: usize) -> usize {
    while let Some(start) = spans
        .iter()
        .filter(|s| s.contains_strictly(pos))
        .map(|s| s.start)
        .min()
    {
        pos = start;
    }
    pos
}

/// Move `pos` forward to the end of every formula enclosing it
pub fn advance_past_formula(spans: &[FormulaSpan], mut pos: usize) -> usize {
    while let Some(end) = spans
        .iter()
        .filter(|s| s.contains_strictly(pos))
        .map(|s| s.end)
        .max()
    {
        pos = end;
    }
    pos
}
