use smallvec::{SmallVec, smallvec};

use crate::{
    byte_span::{ByteSpan, UnOrderedByteSpan},
    text_change::{TextChange, TextChangeError, apply_text_changes},
};

/// The editor the menu writes into. The menu never looks at the document
/// structure, it only asks for insertions at the current selection.
pub trait DocumentModel {
    type Transaction;
    type Error: std::error::Error + Send + Sync + 'static;

    fn selection(&self) -> ByteSpan;

    fn text_before_selection(&self) -> &str;

    fn insert_text(&self, text: &str, at: ByteSpan) -> Self::Transaction;

    fn apply_transaction(&mut self, tr: Self::Transaction) -> Result<(), Self::Error>;

    fn render(&mut self);
}

/// Plain text document with a directional selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    text: String,
    cursor: UnOrderedByteSpan,
    render_requested: bool,
}

pub type TextTransaction = SmallVec<[TextChange; 1]>;

impl TextDocument {
    /// Caret goes to the end of the text.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.len();
        Self {
            text,
            cursor: UnOrderedByteSpan::new(len, len),
            render_requested: false,
        }
    }

    /// Accepts `{||}` and `{|}..{|}` cursor markers, e.g. `"ab{||}c"`.
    pub fn from_marked(marked: &str) -> Self {
        let (text, cursor) = TextChange::try_extract_cursor(marked.to_string());
        let mut doc = Self::new(text);
        if let Some(cursor) = cursor {
            doc.cursor = cursor.unordered();
        }
        doc
    }

    pub fn to_marked(&self) -> String {
        TextChange::encode_cursor(&self.text, self.cursor)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Direct access for the editor widget, call [`TextDocument::set_cursor`] afterwards.
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub fn cursor(&self) -> UnOrderedByteSpan {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: UnOrderedByteSpan) {
        self.cursor = UnOrderedByteSpan::new(
            self.floor_char_boundary(cursor.start),
            self.floor_char_boundary(cursor.end),
        );
    }

    /// Returns `true` once after every change made through a transaction.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_requested)
    }

    fn floor_char_boundary(&self, pos: usize) -> usize {
        let mut pos = pos.min(self.text.len());
        while !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }
}

impl DocumentModel for TextDocument {
    type Transaction = TextTransaction;
    type Error = TextChangeError;

    fn selection(&self) -> ByteSpan {
        self.cursor.ordered()
    }

    fn text_before_selection(&self) -> &str {
        &self.text[..self.selection().start]
    }

    fn insert_text(&self, text: &str, at: ByteSpan) -> TextTransaction {
        // without an explicit marker the caret lands after the inserted text
        let with = match text.contains(TextChange::CURSOR) || text.contains(TextChange::CURSOR_EDGE)
        {
            true => text.to_string(),
            false => format!("{text}{}", TextChange::CURSOR),
        };
        smallvec![TextChange::Insert(at, with)]
    }

    fn apply_transaction(&mut self, tr: TextTransaction) -> Result<(), TextChangeError> {
        self.cursor = apply_text_changes(&mut self.text, self.cursor, tr)?;
        Ok(())
    }

    fn render(&mut self) {
        self.render_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_insert_at_caret() {
        let mut doc = TextDocument::from_marked("# h1\n{||}");

        let tr = doc.insert_text("寿限無", doc.selection());
        doc.apply_transaction(tr).unwrap();

        assert_eq!(doc.to_marked(), "# h1\n寿限無{||}");
    }

    #[test]
    pub fn test_insert_replaces_selection() {
        let mut doc = TextDocument::from_marked("a {|}bc{|} d");

        let tr = doc.insert_text("xyz", doc.selection());
        doc.apply_transaction(tr).unwrap();

        assert_eq!(doc.to_marked(), "a xyz{||} d");
    }

    #[test]
    pub fn test_insert_keeps_explicit_cursor_marker() {
        let mut doc = TextDocument::from_marked("{||}");

        let tr = doc.insert_text("- [ ] {||}", doc.selection());
        doc.apply_transaction(tr).unwrap();

        assert_eq!(doc.to_marked(), "- [ ] {||}");
    }

    #[test]
    pub fn test_text_before_selection() {
        let doc = TextDocument::from_marked("one two{|} three{|}");
        assert_eq!(doc.text_before_selection(), "one two");
    }

    #[test]
    pub fn test_set_cursor_snaps_to_char_boundary() {
        let mut doc = TextDocument::new("時そば");

        doc.set_cursor(UnOrderedByteSpan::new(4, 100));
        assert_eq!(doc.cursor(), UnOrderedByteSpan::new(3, 9));
    }

    #[test]
    pub fn test_render_request_is_taken_once() {
        let mut doc = TextDocument::new("");
        assert!(!doc.take_render_request());

        doc.render();
        assert!(doc.take_render_request());
        assert!(!doc.take_render_request());
    }
}
