use super::heading::ROOT_PATH;
use super::{HeadingMarker, Section};
use crate::chunker::estimate_tokens;
use crate::config::Breadcrumb;
use tracing::debug;

/// Separator between breadcrumb titles
pub const PATH_DELIMITER: &str = " > ";

/// Slice the document into one section per consecutive marker pair
///
/// Sections whose content is blank after trimming are dropped.
pub fn slice_sections<'a>(
    text: &'a str,
    markers: &[HeadingMarker],
    breadcrumb: Breadcrumb,
) -> Vec<Section<'a>> {
    let mut sections = Vec::new();
    let mut trail: Vec<&HeadingMarker> = Vec::new();

    for pair in markers.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);

        if !current.is_synthetic() {
            if breadcrumb == Breadcrumb::Nested {
                while trail.last().is_some_and(|m| m.level >= current.level) {
                    trail.pop();
                }
            }
            trail.push(current);
        }

        let content = &text[current.position..next.position];
        if content.trim().is_empty() {
            debug!(heading = %current.title, "skipping empty section");
            continue;
        }

        let path = if trail.is_empty() {
            ROOT_PATH.to_string()
        } else {
            trail
                .iter()
                .map(|m| m.title.as_str())
                .collect::<Vec<_>>()
                .join(PATH_DELIMITER)
        };

        sections.push(Section {
            content,
            heading: current.title.clone(),
            level: current.level,
            path,
            start_pos: current.position,
            end_pos: next.position,
            token_count: estimate_tokens(content),
        });
    }

    sections
}
