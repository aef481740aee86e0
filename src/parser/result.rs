/// A heading line, or one of the synthetic markers bracketing the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMarker {
    /// Number of `#` characters; 0 for the synthetic start/end markers
    pub level: u8,
    /// Trimmed heading text
    pub title: String,
    /// Byte offset of the heading's line start
    pub position: usize,
}

impl HeadingMarker {
    pub fn new(level: u8, title: impl Into<String>, position: usize) -> Self {
        Self {
            level,
            title: title.into(),
            position,
        }
    }

    /// Synthetic markers do not contribute to breadcrumbs
    pub fn is_synthetic(&self) -> bool {
        self.level == 0
    }
}

/// Document text between two consecutive heading markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Slice of the source document, heading line included
    pub content: &'a str,
    /// Title of the leading marker
    pub heading: String,
    /// Level of the leading marker
    pub level: u8,
    /// Breadcrumb of heading titles, joined by " > "
    pub path: String,
    /// Byte offset in the document (start)
    pub start_pos: usize,
    /// Byte offset in the document (end)
    pub end_pos: usize,
    /// Estimated token count of `content`
    pub token_count: usize,
}
