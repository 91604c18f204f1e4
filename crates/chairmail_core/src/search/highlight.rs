//! Highlight region merging for search results.
//!
//! # Invariants
//! - Regions of one field never overlap and never touch: overlapping or
//!   adjacent spans collapse into one contiguous run.
//! - Regions are sorted by start offset.

use crate::search::engine::{MatchSpan, SearchField};

/// Half-open `[start, end)` character range to render highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightRegion {
    pub start: usize,
    pub end: usize,
}

/// Piece of a field value, either plain or highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub marked: bool,
}

/// Merges the spans recorded for `field` into minimal highlight regions.
pub fn merge_spans(matches: &[MatchSpan], field: SearchField) -> Vec<HighlightRegion> {
    let mut spans = matches
        .iter()
        .filter(|span| span.field == field)
        .collect::<Vec<_>>();
    spans.sort_by_key(|span| span.start);

    let mut regions: Vec<HighlightRegion> = Vec::new();
    for span in spans {
        match regions.last_mut() {
            Some(last) if span.start <= last.end => {
                last.end = last.end.max(span.end());
            }
            _ => regions.push(HighlightRegion {
                start: span.start,
                end: span.end(),
            }),
        }
    }
    regions
}

/// Splits `value` into plain and marked segments along `regions`.
///
/// Regions are clamped to the value length; empty plain segments are skipped.
pub fn highlight_segments<'a>(value: &'a str, regions: &[HighlightRegion]) -> Vec<Segment<'a>> {
    let char_count = value.chars().count();
    let mut segments = Vec::with_capacity(regions.len() * 2 + 1);
    let mut cursor = 0;

    for region in regions {
        let start = region.start.min(char_count).max(cursor);
        let end = region.end.min(char_count);
        if end <= start {
            continue;
        }
        if start > cursor {
            segments.push(Segment {
                text: char_slice(value, cursor, start),
                marked: false,
            });
        }
        segments.push(Segment {
            text: char_slice(value, start, end),
            marked: true,
        });
        cursor = end;
    }

    if cursor < char_count || segments.is_empty() {
        segments.push(Segment {
            text: char_slice(value, cursor, char_count),
            marked: false,
        });
    }
    segments
}

/// Wraps every highlighted region of `value` in `open`/`close` markers.
pub fn mark_regions(value: &str, regions: &[HighlightRegion], open: &str, close: &str) -> String {
    let mut out = String::with_capacity(value.len() + regions.len() * (open.len() + close.len()));
    for segment in highlight_segments(value, regions) {
        if segment.marked {
            out.push_str(open);
            out.push_str(segment.text);
            out.push_str(close);
        } else {
            out.push_str(segment.text);
        }
    }
    out
}

fn char_slice(value: &str, start: usize, end: usize) -> &str {
    let byte_at = |index: usize| {
        value
            .char_indices()
            .nth(index)
            .map(|(offset, _)| offset)
            .unwrap_or(value.len())
    };
    &value[byte_at(start)..byte_at(end)]
}

#[cfg(test)]
mod tests {
    use super::{highlight_segments, mark_regions, merge_spans, HighlightRegion, Segment};
    use crate::search::engine::{MatchSpan, SearchField};

    fn span(field: SearchField, start: usize, length: usize) -> MatchSpan {
        MatchSpan {
            field,
            start,
            length,
        }
    }

    #[test]
    fn overlapping_spans_merge() {
        let regions = merge_spans(
            &[span(SearchField::Name, 0, 2), span(SearchField::Name, 0, 3)],
            SearchField::Name,
        );
        assert_eq!(regions, vec![HighlightRegion { start: 0, end: 3 }]);
    }

    #[test]
    fn adjacent_spans_merge_and_other_fields_are_ignored() {
        let regions = merge_spans(
            &[
                span(SearchField::Name, 4, 2),
                span(SearchField::City, 0, 9),
                span(SearchField::Name, 0, 4),
                span(SearchField::Name, 8, 1),
            ],
            SearchField::Name,
        );
        assert_eq!(
            regions,
            vec![
                HighlightRegion { start: 0, end: 6 },
                HighlightRegion { start: 8, end: 9 },
            ]
        );
    }

    #[test]
    fn contained_span_does_not_shrink_region() {
        let regions = merge_spans(
            &[span(SearchField::Name, 0, 5), span(SearchField::Name, 1, 2)],
            SearchField::Name,
        );
        assert_eq!(regions, vec![HighlightRegion { start: 0, end: 5 }]);
    }

    #[test]
    fn segments_cover_whole_value() {
        let segments = highlight_segments("Anna Ivanova", &[HighlightRegion { start: 5, end: 7 }]);
        assert_eq!(
            segments,
            vec![
                Segment {
                    text: "Anna ",
                    marked: false,
                },
                Segment {
                    text: "Iv",
                    marked: true,
                },
                Segment {
                    text: "anova",
                    marked: false,
                },
            ]
        );
    }

    #[test]
    fn marks_multibyte_values_by_character() {
        let marked = mark_regions("Анна", &[HighlightRegion { start: 0, end: 2 }], "[", "]");
        assert_eq!(marked, "[Ан]на");
    }

    #[test]
    fn value_without_regions_is_one_plain_segment() {
        let segments = highlight_segments("", &[]);
        assert_eq!(
            segments,
            vec![Segment {
                text: "",
                marked: false,
            }]
        );
    }
}
