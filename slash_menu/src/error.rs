use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("no replacement text is registered for menu item `{0}`")]
    UnknownItemCode(String),

    #[error("caret position is not available, menu can't be anchored")]
    NoCaret,

    #[error("menu needs at least one item")]
    EmptyMenu,

    #[error("menu is not open")]
    NotOpen,

    #[error("menu item {index} is out of range, menu has {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("document rejected the change: {0}")]
    Document(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MenuError {
    pub fn document(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        MenuError::Document(Box::new(err))
    }
}
