use tracing::{debug, warn};

use crate::{
    config::MenuConfig,
    document::DocumentModel,
    error::MenuError,
    insertion::InsertionSink,
    keys::KeyEvent,
    menu::{CaretAnchor, KeyOutcome, MenuController, MenuItem, MenuView},
    trigger::{CaretGeometry, TriggerDetector},
};

#[derive(Debug)]
pub enum MenuEvent {
    Opened(CaretAnchor),
    Moved(usize),
    Selected(MenuItem),
    Dismissed,
    /// Trigger matched but the menu could not be opened, the input passes through.
    OpenFailed(MenuError),
}

/// Result of routing one input event through the menu.
#[derive(Debug)]
pub struct Outcome {
    /// The host must not forward the event to the editor.
    pub handled: bool,
    pub event: Option<MenuEvent>,
}

impl Outcome {
    pub fn ignored() -> Self {
        Self {
            handled: false,
            event: None,
        }
    }

    fn handled(event: MenuEvent) -> Self {
        Self {
            handled: true,
            event: Some(event),
        }
    }

    fn passed(event: MenuEvent) -> Self {
        Self {
            handled: false,
            event: Some(event),
        }
    }
}

/// One slash menu attached to one editor.
#[derive(Debug, Clone)]
pub struct SlashMenuSession {
    detector: TriggerDetector,
    controller: MenuController,
    sink: InsertionSink,
}

impl SlashMenuSession {
    pub fn new(config: MenuConfig) -> Result<Self, MenuError> {
        let MenuConfig {
            trigger,
            items,
            replacements,
        } = config;

        Ok(Self {
            detector: TriggerDetector::new(trigger),
            controller: MenuController::new(items)?,
            sink: InsertionSink::new(replacements),
        })
    }

    pub fn view(&self) -> MenuView<'_> {
        self.controller.view()
    }

    pub fn is_open(&self) -> bool {
        self.controller.is_open()
    }

    pub fn trigger(&self) -> &str {
        self.detector.trigger()
    }

    /// Whether inserting `inserted` at the selection of `doc` completes the trigger.
    pub fn completes_trigger<D: DocumentModel>(&self, inserted: &str, doc: &D) -> bool {
        self.detector.matches(doc.text_before_selection(), inserted)
    }

    /// Text about to be inserted at the selection of `doc`.
    ///
    /// When it completes the trigger, the text is inserted through the
    /// document and the menu opens at the caret measured before the insertion.
    pub fn handle_text_input<D, G>(&mut self, inserted: &str, doc: &mut D, caret: &G) -> Outcome
    where
        D: DocumentModel,
        G: CaretGeometry + ?Sized,
    {
        if !self.detector.matches(doc.text_before_selection(), inserted) {
            return Outcome::ignored();
        }

        if self.controller.is_open() {
            debug!("trigger typed while the menu is open, ignoring");
            return Outcome::ignored();
        }

        let anchor = match self.detector.capture_anchor(caret) {
            Ok(anchor) => anchor,
            Err(err) => {
                warn!("{err}");
                return Outcome::passed(MenuEvent::OpenFailed(err));
            }
        };

        let tr = doc.insert_text(inserted, doc.selection());
        if let Err(err) = doc.apply_transaction(tr) {
            let err = MenuError::document(err);
            warn!("{err}");
            return Outcome::passed(MenuEvent::OpenFailed(err));
        }
        doc.render();

        self.controller.open(anchor);
        Outcome::handled(MenuEvent::Opened(anchor))
    }

    /// An `Err` means the menu committed an item (and closed) but the
    /// insertion failed, the key is consumed either way.
    pub fn handle_key<D: DocumentModel>(
        &mut self,
        event: &KeyEvent,
        doc: &mut D,
    ) -> Result<Outcome, MenuError> {
        let outcome = match self.controller.handle_key(event) {
            KeyOutcome::Ignored => Outcome::ignored(),
            KeyOutcome::Moved(index) => Outcome::handled(MenuEvent::Moved(index)),
            KeyOutcome::Dismissed => Outcome::passed(MenuEvent::Dismissed),
            KeyOutcome::Committed(item) => {
                self.sink.commit(&item, doc)?;
                Outcome::handled(MenuEvent::Selected(item))
            }
        };
        Ok(outcome)
    }

    /// Pointer click on a row.
    pub fn select<D: DocumentModel>(
        &mut self,
        index: usize,
        doc: &mut D,
    ) -> Result<MenuItem, MenuError> {
        let item = self.controller.select(index)?;
        self.sink.commit(&item, doc)?;
        Ok(item)
    }

    /// Pointer hover over a row. Returns `false` if nothing changed.
    pub fn highlight(&mut self, index: usize) -> bool {
        if self.controller.selected_index() == index && self.controller.is_open() {
            return false;
        }

        match self.controller.highlight(index) {
            Ok(()) => true,
            Err(err) => {
                debug!("{err}");
                false
            }
        }
    }

    /// Closes the menu without inserting anything, e.g. when the editor loses focus.
    pub fn dismiss(&mut self) -> bool {
        let was_open = self.controller.is_open();
        self.controller.close();
        was_open
    }
}
