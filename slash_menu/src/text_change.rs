use itertools::Itertools;
use smallvec::SmallVec;
use thiserror::Error;

use crate::byte_span::{ByteSpan, RangeRelation, UnOrderedByteSpan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextChange {
    /// Replaces the span with the string, an empty span is a pure insertion.
    Insert(ByteSpan, String),
}

impl TextChange {
    pub const CURSOR_EDGE: &'static str = "{|}";
    pub const CURSOR: &'static str = "{||}";

    pub fn try_extract_cursor(mut text: String) -> (String, Option<ByteSpan>) {
        if let Some(start) = text.find(TextChange::CURSOR) {
            text.replace_range(start..(start + TextChange::CURSOR.len()), "");
            (text, Some(ByteSpan::caret(start)))
        } else {
            let Some(start) = text.find(TextChange::CURSOR_EDGE) else {
                return (text, None);
            };
            text.replace_range(start..(start + TextChange::CURSOR_EDGE.len()), "");
            let Some(end) = text.find(TextChange::CURSOR_EDGE) else {
                // undo the first removal
                text.insert_str(start, Self::CURSOR_EDGE);
                return (text, None);
            };
            text.replace_range(end..(end + TextChange::CURSOR_EDGE.len()), "");
            (text, Some(ByteSpan::new(start, end)))
        }
    }

    pub fn encode_cursor(text: &str, cursor: UnOrderedByteSpan) -> String {
        let mut text = text.to_string();
        let cursor = cursor.ordered();
        if cursor.is_empty() {
            text.insert_str(cursor.start, TextChange::CURSOR);
        } else {
            text.insert_str(cursor.start, TextChange::CURSOR_EDGE);
            text.insert_str(
                cursor.end + TextChange::CURSOR_EDGE.len(),
                TextChange::CURSOR_EDGE,
            );
        }
        text
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextChangeError {
    #[error("text changes at {first:?} and {second:?} overlap")]
    OverlappingChanges { first: ByteSpan, second: ByteSpan },

    #[error("text change at {span:?} is outside of a text with {len} bytes")]
    OutOfBounds { span: ByteSpan, len: usize },

    #[error("text change at {span:?} splits a character")]
    NotCharBoundary { span: ByteSpan },
}

struct PreparedChange {
    span: ByteSpan,
    with: String,
    cursor: Option<ByteSpan>,
}

impl PreparedChange {
    fn delta(&self) -> isize {
        self.with.len() as isize - self.span.len() as isize
    }
}

/// Applies non overlapping changes, all spans are relative to the text before any change.
/// Returns the cursor mapped through the changes, or the one placed by a cursor marker.
pub fn apply_text_changes(
    text: &mut String,
    prev_cursor: UnOrderedByteSpan,
    changes: impl IntoIterator<Item = TextChange>,
) -> Result<UnOrderedByteSpan, TextChangeError> {
    let mut prepared: SmallVec<[PreparedChange; 4]> = changes
        .into_iter()
        .map(|change| match change {
            TextChange::Insert(span, with) => {
                let (with, cursor) = TextChange::try_extract_cursor(with);
                PreparedChange { span, with, cursor }
            }
        })
        .collect();

    for change in prepared.iter() {
        let span = change.span;
        if span.end > text.len() {
            return Err(TextChangeError::OutOfBounds {
                span,
                len: text.len(),
            });
        }
        if !text.is_char_boundary(span.start) || !text.is_char_boundary(span.end) {
            return Err(TextChangeError::NotCharBoundary { span });
        }
    }

    // stable: insertions at the same position keep their order
    prepared.sort_by_key(|change| (change.span.start, change.span.end));

    for (first, second) in prepared.iter().tuple_windows() {
        if first.span.relative_to(second.span) != RangeRelation::Before {
            return Err(TextChangeError::OverlappingChanges {
                first: first.span,
                second: second.span,
            });
        }
    }

    let mut delta: isize = 0;
    let mut inserted_cursor: Option<UnOrderedByteSpan> = None;
    for change in prepared.iter() {
        if let Some(cursor) = change.cursor {
            let start = change.span.start.saturating_add_signed(delta);
            inserted_cursor = Some(UnOrderedByteSpan::new(
                start + cursor.start,
                start + cursor.end,
            ));
        }
        delta += change.delta();
    }

    let adjusted_cursor = inserted_cursor.unwrap_or_else(|| {
        UnOrderedByteSpan::new(
            map_position(prev_cursor.start, &prepared),
            map_position(prev_cursor.end, &prepared),
        )
    });

    // back to front, so that earlier spans stay valid
    for change in prepared.into_iter().rev() {
        text.replace_range(change.span.range(), &change.with);
    }

    Ok(adjusted_cursor)
}

fn map_position(pos: usize, changes: &[PreparedChange]) -> usize {
    let mut delta: isize = 0;
    for change in changes {
        let span = change.span;
        if span.end <= pos {
            // also covers an insertion right at the caret, the caret ends up after it
            delta += change.delta();
        } else if span.start < pos {
            // the position was replaced, stick to the end of the replacement
            return span.start.saturating_add_signed(delta) + change.with.len();
        } else {
            break;
        }
    }
    pos.saturating_add_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caret_at(text: &str) -> (String, UnOrderedByteSpan) {
        let (text, cursor) = TextChange::try_extract_cursor(text.to_string());
        (text, cursor.unwrap().unordered())
    }

    #[test]
    pub fn test_cursor_extraction_from_string() {
        let (text, cursor) = TextChange::try_extract_cursor("- a{||}b".to_string());
        assert_eq!(text, "- ab");
        assert_eq!(cursor, Some(ByteSpan::new(3, 3)));

        let (text, cursor) = TextChange::try_extract_cursor("- {|}a{|}b".to_string());
        assert_eq!(text, "- ab");
        assert_eq!(cursor, Some(ByteSpan::new(2, 3)));

        let (text, cursor) = TextChange::try_extract_cursor("- a{|}b".to_string());
        assert_eq!(text, "- a{|}b");
        assert_eq!(cursor, None);
    }

    #[test]
    pub fn test_several_text_changes_in_order() {
        let mut text = "a b".to_string();

        let a_pos = text.find("a").unwrap();
        let b_pos = text.find("b").unwrap();

        let changes = [
            TextChange::Insert(ByteSpan::new(a_pos, a_pos + 1), "hello".into()),
            TextChange::Insert(ByteSpan::new(b_pos, b_pos + 1), "world".into()),
            TextChange::Insert(ByteSpan::caret(b_pos + 1), "!".into()),
        ];

        apply_text_changes(&mut text, UnOrderedByteSpan::new(0, 0), changes).unwrap();
        assert_eq!(text, "hello world!");
    }

    #[test]
    pub fn test_several_text_changes_out_of_order() {
        let mut text = "a b".to_string();

        let a_pos = text.find("a").unwrap();
        let b_pos = text.find("b").unwrap();

        let changes = [
            TextChange::Insert(ByteSpan::caret(b_pos + 1), "!".into()),
            TextChange::Insert(ByteSpan::new(b_pos, b_pos + 1), "world".into()),
            TextChange::Insert(ByteSpan::new(a_pos, a_pos + 1), "hello".into()),
        ];

        apply_text_changes(&mut text, UnOrderedByteSpan::new(0, 0), changes).unwrap();
        assert_eq!(text, "hello world!");
    }

    #[test]
    pub fn test_overlapping_text_changes_are_not_allowed() {
        let mut text = "a b".to_string();

        let a_pos = text.find("a").unwrap();
        let b_pos = text.find("b").unwrap();

        let changes = [
            // captures "a b"
            TextChange::Insert(ByteSpan::new(a_pos, b_pos + 1), "hello".into()),
            // captures "b"
            TextChange::Insert(ByteSpan::new(b_pos, b_pos + 1), "world".into()),
        ];

        let cursor = apply_text_changes(&mut text, UnOrderedByteSpan::new(0, 0), changes);
        assert!(matches!(
            cursor,
            Err(TextChangeError::OverlappingChanges { .. })
        ));
        assert_eq!(text, "a b");
    }

    #[test]
    pub fn test_changes_must_stay_inside_text_and_on_char_boundaries() {
        let mut text = "寿限無".to_string();

        let out_of_bounds = apply_text_changes(
            &mut text,
            UnOrderedByteSpan::new(0, 0),
            [TextChange::Insert(ByteSpan::caret(100), "x".into())],
        );
        assert_eq!(
            out_of_bounds,
            Err(TextChangeError::OutOfBounds {
                span: ByteSpan::caret(100),
                len: 9
            })
        );

        let split_char = apply_text_changes(
            &mut text,
            UnOrderedByteSpan::new(0, 0),
            [TextChange::Insert(ByteSpan::caret(1), "x".into())],
        );
        assert_eq!(
            split_char,
            Err(TextChangeError::NotCharBoundary {
                span: ByteSpan::caret(1)
            })
        );
        assert_eq!(text, "寿限無");
    }

    #[test]
    pub fn test_insertion_at_caret_moves_caret_after_it() {
        let (mut text, cursor) = caret_at("ab{||}c");

        let cursor = apply_text_changes(
            &mut text,
            cursor,
            [TextChange::Insert(ByteSpan::caret(2), "XY".into())],
        )
        .unwrap();

        assert_eq!(TextChange::encode_cursor(&text, cursor), "abXY{||}c");
    }

    #[test]
    pub fn test_cursor_marker_in_inserted_text_wins() {
        let (mut text, cursor) = caret_at("say {||}!");

        let cursor = apply_text_changes(
            &mut text,
            cursor,
            [TextChange::Insert(ByteSpan::caret(4), "**{||}**".into())],
        )
        .unwrap();

        assert_eq!(TextChange::encode_cursor(&text, cursor), "say **{||}**!");
    }

    #[test]
    pub fn test_cursor_adjacement_cursor_inside_replacement() {
        // `ab{||}cd`
        //   ^____^ => replace with "oops"
        // `oops{||}d`
        let (mut text, cursor) = caret_at("ab{||}cd");

        let start = text.find("b").unwrap();
        let end = text.find("d").unwrap();

        let changes = [
            TextChange::Insert(ByteSpan::new(start, end), "oops".into()),
            // delete "a", to test out cursor adjecement that are out of range
            TextChange::Insert(ByteSpan::new(0, 1), "".into()),
        ];

        let cursor = apply_text_changes(&mut text, cursor, changes).unwrap();
        assert_eq!(TextChange::encode_cursor(&text, cursor), "oops{||}d");
    }

    #[test]
    pub fn test_cursor_adjacement_selection_contains_replacement() {
        // `a{|}bcde{|}f`
        //       ^ ^ => replace with "oops"
        // `{|}boops{|}f`
        let (mut text, cursor) = caret_at("a{|}bcde{|}f");

        let changes = [
            TextChange::Insert(
                ByteSpan::new(text.find("c").unwrap(), text.find("f").unwrap()),
                "oops".into(),
            ),
            TextChange::Insert(ByteSpan::new(0, 1), "".into()),
        ];

        let cursor = apply_text_changes(&mut text, cursor, changes).unwrap();
        assert_eq!(TextChange::encode_cursor(&text, cursor), "{|}boops{|}f");
    }

    #[test]
    pub fn test_cursor_adjacement_selection_start_inside_replacement() {
        // `ab{|}cd{|}e`
        //   ^___^ => replace with "oops"
        // `aoops{|}d{|}e`
        let (mut text, cursor) = caret_at("ab{|}cd{|}e");

        let changes = [
            TextChange::Insert(
                ByteSpan::new(text.find("b").unwrap(), text.find("d").unwrap()),
                "oops".into(),
            ),
            TextChange::Insert(ByteSpan::caret(text.len()), "!".into()),
        ];

        let cursor = apply_text_changes(&mut text, cursor, changes).unwrap();
        assert_eq!(TextChange::encode_cursor(&text, cursor), "aoops{|}d{|}e!");
    }

    #[test]
    pub fn test_cursor_adjacement_selection_end_inside_replacement() {
        // `ab{|}cd{|}efj`
        //        ^____^ => replace with "oops"
        // `!!b{|}coops{|}j`
        let (mut text, cursor) = caret_at("ab{|}cd{|}efj");

        let changes = [
            TextChange::Insert(
                ByteSpan::new(text.find("d").unwrap(), text.find("j").unwrap()),
                "oops".into(),
            ),
            TextChange::Insert(ByteSpan::new(0, 1), "!!".into()),
        ];

        let cursor = apply_text_changes(&mut text, cursor, changes).unwrap();
        assert_eq!(TextChange::encode_cursor(&text, cursor), "!!b{|}coops{|}j");
    }

    #[test]
    pub fn test_reversed_selection_keeps_direction() {
        let mut text = "abcd".to_string();

        let cursor = apply_text_changes(
            &mut text,
            UnOrderedByteSpan::new(3, 1),
            [TextChange::Insert(ByteSpan::caret(0), ">>".into())],
        )
        .unwrap();

        assert_eq!(text, ">>abcd");
        assert_eq!(cursor, UnOrderedByteSpan::new(5, 3));
    }
}
