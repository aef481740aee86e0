mod boundary;
mod formula;
mod heading;
mod result;
mod section;


pub use boundary::Boundary;
pub use formula::{
    FormulaSpan, advance_past_formula, detect_formula_spans, is_safe_cut, retreat_from_formula,
};
pub use heading::{DOCUMENT_END, DOCUMENT_START, ROOT_PATH, index_headings};
pub use result::{HeadingMarker, Section};
pub use section::{PATH_DELIMITER, slice_sections};
