use tracing::debug;

use crate::{
    error::MenuError,
    keys::{KeyEvent, MenuKey},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MenuItem {
    pub code: String,
    pub label: String,
    pub icon: Option<String>,
    pub description: Option<String>,
}

impl MenuItem {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            icon: None,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Right/bottom corner of the caret at the moment the menu was opened,
/// in the coordinate space of the editor's text layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaretAnchor {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MenuState {
    Closed,
    Open {
        selected: usize,
        anchor: CaretAnchor,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Menu is closed, or the key was a bare modifier.
    Ignored,
    Moved(usize),
    Committed(MenuItem),
    Dismissed,
}

impl KeyOutcome {
    /// `true` means the key must not reach the editor.
    pub fn is_handled(&self) -> bool {
        matches!(self, KeyOutcome::Moved(_) | KeyOutcome::Committed(_))
    }
}

/// What the presentation layer needs to draw the popup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuView<'a> {
    pub is_open: bool,
    pub items: &'a [MenuItem],
    pub selected_index: usize,
    pub anchor: Option<CaretAnchor>,
}

#[derive(Debug, Clone)]
pub struct MenuController {
    items: Vec<MenuItem>,
    state: MenuState,
}

impl MenuController {
    pub fn new(items: Vec<MenuItem>) -> Result<Self, MenuError> {
        if items.is_empty() {
            return Err(MenuError::EmptyMenu);
        }

        Ok(Self {
            items,
            state: MenuState::Closed,
        })
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, MenuState::Open { .. })
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn selected_index(&self) -> usize {
        match self.state {
            MenuState::Closed => 0,
            MenuState::Open { selected, .. } => selected,
        }
    }

    pub fn view(&self) -> MenuView<'_> {
        let (selected_index, anchor) = match self.state {
            MenuState::Closed => (0, None),
            MenuState::Open { selected, anchor } => (selected, Some(anchor)),
        };

        MenuView {
            is_open: self.is_open(),
            items: &self.items,
            selected_index,
            anchor,
        }
    }

    /// Returns `false` if the menu was already open, in that case nothing changes.
    pub fn open(&mut self, anchor: CaretAnchor) -> bool {
        if self.is_open() {
            return false;
        }

        debug!(?anchor, "menu opened");
        self.state = MenuState::Open {
            selected: 0,
            anchor,
        };
        true
    }

    pub fn close(&mut self) {
        self.state = MenuState::Closed;
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyOutcome {
        let MenuState::Open { selected, anchor } = self.state else {
            return KeyOutcome::Ignored;
        };

        let n = self.items.len();
        match event.menu_key() {
            Some(MenuKey::Prev) => {
                let selected = (selected + n - 1) % n;
                self.state = MenuState::Open { selected, anchor };
                KeyOutcome::Moved(selected)
            }
            Some(MenuKey::Next) => {
                let selected = (selected + 1) % n;
                self.state = MenuState::Open { selected, anchor };
                KeyOutcome::Moved(selected)
            }
            Some(MenuKey::Commit) => {
                self.close();
                KeyOutcome::Committed(self.items[selected].clone())
            }
            None if event.is_modifier() => KeyOutcome::Ignored,
            None => {
                debug!(key = ?event.key, "menu dismissed");
                self.close();
                KeyOutcome::Dismissed
            }
        }
    }

    /// Moves the highlight, used for pointer hover.
    pub fn highlight(&mut self, index: usize) -> Result<(), MenuError> {
        let MenuState::Open { anchor, .. } = self.state else {
            return Err(MenuError::NotOpen);
        };
        self.check_index(index)?;

        self.state = MenuState::Open {
            selected: index,
            anchor,
        };
        Ok(())
    }

    /// Commits the item at `index`, same as pressing Enter with it highlighted.
    pub fn select(&mut self, index: usize) -> Result<MenuItem, MenuError> {
        if !self.is_open() {
            return Err(MenuError::NotOpen);
        }
        self.check_index(index)?;

        self.close();
        Ok(self.items[index].clone())
    }

    pub fn set_items(&mut self, items: Vec<MenuItem>) -> Result<(), MenuError> {
        if items.is_empty() {
            return Err(MenuError::EmptyMenu);
        }

        self.items = items;
        if let MenuState::Open { selected, anchor } = self.state {
            self.state = MenuState::Open {
                selected: selected.min(self.items.len() - 1),
                anchor,
            };
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), MenuError> {
        match index < self.items.len() {
            true => Ok(()),
            false => Err(MenuError::IndexOutOfRange {
                index,
                len: self.items.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::keys::{Key, Modifiers};

    const ANCHOR: CaretAnchor = CaretAnchor { x: 12.0, y: 40.0 };

    fn rakugo_menu() -> MenuController {
        MenuController::new(vec![
            MenuItem::new("jugem", "寿限無"),
            MenuItem::new("tokisoba", "時そば"),
        ])
        .unwrap()
    }

    fn menu_of(n: usize) -> MenuController {
        MenuController::new(
            (0..n)
                .map(|i| MenuItem::new(format!("code{i}"), format!("item {i}")))
                .collect(),
        )
        .unwrap()
    }

    fn press(menu: &mut MenuController, key: Key) -> KeyOutcome {
        menu.handle_key(&KeyEvent::new(key))
    }

    #[test]
    pub fn test_created_closed_with_first_item_selected() {
        let menu = rakugo_menu();
        assert_eq!(
            menu.view(),
            MenuView {
                is_open: false,
                items: menu.items(),
                selected_index: 0,
                anchor: None,
            }
        );
    }

    #[test]
    pub fn test_empty_menu_is_rejected() {
        assert!(matches!(
            MenuController::new(vec![]),
            Err(MenuError::EmptyMenu)
        ));
    }

    #[test]
    pub fn test_arrow_down_then_enter_commits_second_item() {
        let mut menu = rakugo_menu();
        assert!(menu.open(ANCHOR));

        assert_eq!(press(&mut menu, Key::ArrowDown), KeyOutcome::Moved(1));
        assert_eq!(menu.selected_index(), 1);

        assert_eq!(
            press(&mut menu, Key::Enter),
            KeyOutcome::Committed(MenuItem::new("tokisoba", "時そば"))
        );
        assert!(!menu.is_open());
    }

    #[test]
    pub fn test_arrow_up_wraps_to_last_item() {
        let mut menu = rakugo_menu();
        menu.open(ANCHOR);

        assert_eq!(press(&mut menu, Key::ArrowUp), KeyOutcome::Moved(1));
        assert_eq!(press(&mut menu, Key::ArrowUp), KeyOutcome::Moved(0));
    }

    #[test]
    pub fn test_emacs_bindings_navigate() {
        let mut menu = menu_of(3);
        menu.open(ANCHOR);

        assert_eq!(menu.handle_key(&KeyEvent::ctrl('n')), KeyOutcome::Moved(1));
        assert_eq!(menu.handle_key(&KeyEvent::ctrl('n')), KeyOutcome::Moved(2));
        assert_eq!(menu.handle_key(&KeyEvent::ctrl('p')), KeyOutcome::Moved(1));
        assert!(menu.is_open());
    }

    #[test]
    pub fn test_printable_key_dismisses_without_commit() {
        let mut menu = rakugo_menu();
        menu.open(ANCHOR);
        press(&mut menu, Key::ArrowDown);

        let outcome = menu.handle_key(&KeyEvent::char('a'));
        assert_eq!(outcome, KeyOutcome::Dismissed);
        assert!(!outcome.is_handled());
        assert!(!menu.is_open());

        // reopening starts from the top again
        menu.open(ANCHOR);
        assert_eq!(menu.selected_index(), 0);
    }

    #[test]
    pub fn test_modifiers_keep_menu_open() {
        let mut menu = rakugo_menu();
        menu.open(ANCHOR);
        press(&mut menu, Key::ArrowDown);

        for key in [Key::Control, Key::Alt, Key::CapsLock, Key::Meta] {
            assert_eq!(press(&mut menu, key), KeyOutcome::Ignored);
        }
        assert_eq!(
            menu.handle_key(&KeyEvent::with_modifiers(
                Key::Character('c'),
                Modifiers::META
            )),
            KeyOutcome::Ignored
        );

        assert!(menu.is_open());
        assert_eq!(menu.selected_index(), 1);

        // shift is not a modifier for the menu
        assert_eq!(press(&mut menu, Key::Shift), KeyOutcome::Dismissed);
    }

    #[test]
    pub fn test_keys_are_ignored_while_closed() {
        let mut menu = rakugo_menu();
        for key in [Key::Enter, Key::ArrowDown, Key::Character('x'), Key::Escape] {
            assert_eq!(press(&mut menu, key), KeyOutcome::Ignored);
            assert!(!menu.is_open());
        }
    }

    #[test]
    pub fn test_reopen_while_open_is_ignored() {
        let mut menu = rakugo_menu();
        menu.open(ANCHOR);
        press(&mut menu, Key::ArrowDown);

        assert!(!menu.open(CaretAnchor { x: 0.0, y: 0.0 }));
        assert_eq!(menu.view().anchor, Some(ANCHOR));
        assert_eq!(menu.selected_index(), 1);
    }

    #[test]
    pub fn test_pointer_highlight_and_select() {
        let mut menu = menu_of(4);
        assert!(matches!(menu.highlight(1), Err(MenuError::NotOpen)));
        assert!(matches!(menu.select(1), Err(MenuError::NotOpen)));

        menu.open(ANCHOR);
        menu.highlight(2).unwrap();
        assert_eq!(menu.selected_index(), 2);
        assert!(matches!(
            menu.highlight(4),
            Err(MenuError::IndexOutOfRange { index: 4, len: 4 })
        ));

        assert_eq!(menu.select(3).unwrap().code, "code3");
        assert!(!menu.is_open());
    }

    #[test]
    pub fn test_shrinking_items_clamps_selection() {
        let mut menu = menu_of(5);
        menu.open(ANCHOR);
        menu.highlight(4).unwrap();

        menu.set_items(vec![MenuItem::new("a", "A"), MenuItem::new("b", "B")])
            .unwrap();
        assert_eq!(menu.selected_index(), 1);

        assert!(matches!(menu.set_items(vec![]), Err(MenuError::EmptyMenu)));
        assert_eq!(menu.items().len(), 2);
    }

    proptest! {
        #[test]
        fn arrow_down_k_times_lands_on_k_mod_n(n in 1usize..12, k in 0usize..64) {
            let mut menu = menu_of(n);
            menu.open(ANCHOR);
            for _ in 0..k {
                press(&mut menu, Key::ArrowDown);
            }
            prop_assert_eq!(menu.selected_index(), k % n);
        }

        #[test]
        fn arrow_up_k_times_is_inverse_of_arrow_down(n in 1usize..12, k in 0usize..64) {
            let mut menu = menu_of(n);
            menu.open(ANCHOR);
            for _ in 0..k {
                press(&mut menu, Key::ArrowUp);
            }
            prop_assert_eq!(menu.selected_index(), (n - k % n) % n);
        }

        #[test]
        fn enter_commits_exactly_the_highlighted_item(
            n in 1usize..8,
            moves in proptest::collection::vec(any::<bool>(), 0..20),
        ) {
            let mut menu = menu_of(n);
            menu.open(ANCHOR);
            for down in moves {
                press(&mut menu, if down { Key::ArrowDown } else { Key::ArrowUp });
            }
            let expected = menu.items()[menu.selected_index()].clone();

            prop_assert_eq!(press(&mut menu, Key::Enter), KeyOutcome::Committed(expected));
            prop_assert!(!menu.is_open());
        }
    }
}
