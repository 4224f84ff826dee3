use crate::{error::MenuError, menu::CaretAnchor};

pub const DEFAULT_TRIGGER: &str = "/";

/// Screen space rectangle of the caret, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaretRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Host facility that knows where the caret is drawn.
pub trait CaretGeometry {
    /// `None` when there is no active selection to measure.
    fn caret_rect(&self) -> Option<CaretRect>;
}

impl<F> CaretGeometry for F
where
    F: Fn() -> Option<CaretRect>,
{
    fn caret_rect(&self) -> Option<CaretRect> {
        self()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerDetector {
    trigger: String,
}

impl Default for TriggerDetector {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
        }
    }
}

impl TriggerDetector {
    /// `trigger` must not be empty, an empty trigger never matches.
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
        }
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Whether inserting `inserted` leaves the trigger right before the caret.
    pub fn matches(&self, text_before_caret: &str, inserted: &str) -> bool {
        let trigger = self.trigger.as_str();
        if trigger.is_empty() || inserted.is_empty() {
            return false;
        }

        if inserted.len() >= trigger.len() {
            return inserted.ends_with(trigger);
        }

        // the trigger started before this insertion
        trigger.ends_with(inserted)
            && text_before_caret.ends_with(&trigger[..trigger.len() - inserted.len()])
    }

    /// Anchors the menu at the right/bottom corner of the caret.
    pub fn capture_anchor<G: CaretGeometry + ?Sized>(
        &self,
        caret: &G,
    ) -> Result<CaretAnchor, MenuError> {
        caret
            .caret_rect()
            .map(|rect| CaretAnchor {
                x: rect.right,
                y: rect.bottom,
            })
            .ok_or(MenuError::NoCaret)
    }
}
