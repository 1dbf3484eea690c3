use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};
use nabla_syntax::{TextSize, TextSpan};
use serde::Serialize;

/// A parse problem attached to a byte range of the source. Diagnostics are
/// collected on the side while parsing and never interrupt it: the tree that
/// comes back still covers the entire input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    start: TextSize,
    end: TextSize,
    message: String,
}

impl Diagnostic {
    pub(crate) fn new(span: TextSpan, message: impl Into<String>) -> Self {
        Self {
            start: span.start as TextSize,
            end: span.end as TextSize,
            message: message.into(),
        }
    }

    pub fn span(&self) -> TextSpan {
        self.start as usize..self.end as usize
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error at {}..{}: {}", self.start, self.end, self.message)
    }
}

/// Renders diagnostics against the source text, one report per diagnostic,
/// with the offending lines quoted and the range highlighted. With `colored`
/// set, the output uses the standard styled rendering (red `error` titles).
pub fn render_diagnostics(source: &str, diagnostics: &[Diagnostic], colored: bool) -> String {
    let renderer = if colored {
        Renderer::styled()
    } else {
        Renderer::plain()
    };

    let mut out = String::new();
    for (i, diagnostic) in diagnostics.iter().enumerate() {
        let range = display_range(source, diagnostic.span());
        let snippet = Snippet::source(source).line_start(1).annotation(
            AnnotationKind::Primary
                .span(range)
                .label(diagnostic.message()),
        );
        let report = [Level::ERROR
            .primary_title(diagnostic.message())
            .element(snippet)];

        if i > 0 {
            out.push('\n');
        }
        out.push_str(&renderer.render(&report).to_string());
        out.push('\n');
    }
    out
}

/// Normalizes a diagnostic range for display. Ranges that are empty or that
/// cover only invisible characters (a bare newline) are widened symmetrically
/// by one code point per side so the highlight stays visible, and range ends
/// that fall inside a multi-byte character are rounded down to the previous
/// boundary.
pub(crate) fn display_range(source: &str, span: TextSpan) -> TextSpan {
    let mut start = span.start.min(source.len());
    let mut end = span.end.min(source.len());
    while start > 0 && !source.is_char_boundary(start) {
        start -= 1;
    }
    while end > start && !source.is_char_boundary(end) {
        end -= 1;
    }

    let invisible = source[start..end]
        .chars()
        .all(|c| matches!(c, '\n' | '\r'));
    if start == end || invisible {
        start = floor_char_boundary(source, start.saturating_sub(1));
        end = ceil_char_boundary(source, end + 1);
    }
    start..end
}

fn floor_char_boundary(source: &str, mut index: usize) -> usize {
    index = index.min(source.len());
    while index > 0 && !source.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(source: &str, mut index: usize) -> usize {
    if index >= source.len() {
        return source.len();
    }
    while !source.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range_widens_one_code_point_per_side() {
        assert_eq!(display_range("abcdef", 3..3), 2..4);
    }

    #[test]
    fn empty_range_at_input_edges_stays_in_bounds() {
        assert_eq!(display_range("ab", 0..0), 0..1);
        assert_eq!(display_range("ab", 2..2), 1..2);
        assert_eq!(display_range("", 0..0), 0..0);
    }

    #[test]
    fn newline_only_range_widens() {
        assert_eq!(display_range("a\nb", 1..2), 0..3);
    }

    #[test]
    fn end_rounds_down_to_char_boundary() {
        // `é` is two bytes, so byte 2 falls inside it.
        assert_eq!(display_range("aéb", 0..2), 0..1);
    }

    #[test]
    fn widening_respects_multibyte_neighbors() {
        let source = "é\né";
        // The bare newline sits at bytes 2..3 between two-byte characters.
        assert_eq!(display_range(source, 2..3), 0..5);
    }

    #[test]
    fn plain_rendering_quotes_the_source_line() {
        let source = ": foo";
        let diagnostics = [Diagnostic::new(1..2, "whitespace not allowed here")];
        let rendered = render_diagnostics(source, &diagnostics, false);
        assert!(rendered.contains("error"));
        assert!(rendered.contains("whitespace not allowed here"));
        assert!(rendered.contains(": foo"));
    }
}
