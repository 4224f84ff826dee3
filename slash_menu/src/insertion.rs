use std::collections::BTreeMap;

use tracing::{debug, error};

use crate::{document::DocumentModel, error::MenuError, menu::MenuItem};

/// Prepared text for each menu item code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementTable(BTreeMap<String, String>);

impl ReplacementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous text for that code, if any.
    pub fn insert(&mut self, code: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.0.insert(code.into(), text.into())
    }

    pub fn lookup(&self, code: &str) -> Result<&str, MenuError> {
        self.0
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| MenuError::UnknownItemCode(code.to_string()))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<C: Into<String>, T: Into<String>> FromIterator<(C, T)> for ReplacementTable {
    fn from_iter<I: IntoIterator<Item = (C, T)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(code, text)| (code.into(), text.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct InsertionSink {
    replacements: ReplacementTable,
}

impl InsertionSink {
    pub fn new(replacements: ReplacementTable) -> Self {
        Self { replacements }
    }

    /// Inserts the text prepared for `item` at the current selection.
    pub fn commit<D: DocumentModel>(&self, item: &MenuItem, doc: &mut D) -> Result<(), MenuError> {
        let text = self.replacements.lookup(&item.code).inspect_err(|err| {
            error!(code = %item.code, "{err}");
        })?;

        let tr = doc.insert_text(text, doc.selection());
        doc.apply_transaction(tr).map_err(MenuError::document)?;
        doc.render();

        debug!(code = %item.code, "inserted prepared text");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;

    fn sink() -> InsertionSink {
        InsertionSink::new(ReplacementTable::from_iter([("greet", "hello {||}!")]))
    }

    #[test]
    pub fn test_commit_inserts_prepared_text() {
        let mut doc = TextDocument::from_marked("say /{||}");

        sink()
            .commit(&MenuItem::new("greet", "Greeting"), &mut doc)
            .unwrap();

        assert_eq!(doc.to_marked(), "say /hello {||}!");
        assert!(doc.take_render_request());
    }

    #[test]
    pub fn test_unknown_code_fails_loudly() {
        let mut doc = TextDocument::from_marked("say /{||}");

        let result = sink().commit(&MenuItem::new("nope", "Missing"), &mut doc);

        assert!(matches!(result, Err(MenuError::UnknownItemCode(code)) if code == "nope"));
        assert_eq!(doc.to_marked(), "say /{||}");
        assert!(!doc.take_render_request());
    }
}
