//! Inline text entry placed over the drawing surface.
//!
//! The application positions the entry in surface coordinates with `y` on
//! the text baseline; the overlay turns that into the entry's outer box using
//! font metrics from a [`TextShaper`] and the entry's [`EntryStyle`].

use crate::event::KeyboardEventType;
use crate::native::{keysym, Keysym};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamilyKind {
    Proportional,
    Monospace,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub family: FontFamilyKind,
    /// Absolute size in pixels.
    pub size: f64,
}

/// Font metrics provider.
pub trait TextShaper {
    /// Distance from the top of a line to its baseline.
    fn ascent(&self, font: &FontSpec) -> f64;
    /// Logical width of `text` laid out on one line.
    fn text_width(&self, font: &FontSpec, text: &str) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Insets {
    pub const fn symmetric(horizontal: f64, vertical: f64) -> Self {
        Self {
            left: horizontal,
            top: vertical,
            right: horizontal,
            bottom: vertical,
        }
    }
}

/// Box model of the entry widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryStyle {
    pub margin: Insets,
    pub border: Insets,
    pub padding: Insets,
}

impl Default for EntryStyle {
    fn default() -> Self {
        Self {
            margin: Insets::default(),
            border: Insets::default(),
            padding: Insets::symmetric(4.0, 2.0),
        }
    }
}

/// Outer box of the entry in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub font: FontSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Surface,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorTransition {
    /// The entry was hidden and is now shown with keyboard focus.
    Shown,
    /// The entry was already shown; only its text and geometry changed.
    Updated,
}

#[derive(Debug, Clone, PartialEq)]
struct Editing {
    text: String,
    geometry: EditorGeometry,
}

#[derive(Debug, Clone)]
pub struct EditorOverlay {
    style: EntryStyle,
    editing: Option<Editing>,
    focus: FocusTarget,
}

impl Default for EditorOverlay {
    fn default() -> Self {
        Self::new(EntryStyle::default())
    }
}

impl EditorOverlay {
    pub fn new(style: EntryStyle) -> Self {
        Self {
            style,
            editing: None,
            focus: FocusTarget::Surface,
        }
    }

    pub fn style(&self) -> &EntryStyle {
        &self.style
    }

    #[allow(clippy::too_many_arguments)]
    pub fn compute_geometry(
        &self,
        shaper: &dyn TextShaper,
        x: f64,
        y: f64,
        font_height: f64,
        min_width: f64,
        is_monospace: bool,
        text: &str,
    ) -> EditorGeometry {
        let font = FontSpec {
            family: if is_monospace {
                FontFamilyKind::Monospace
            } else {
                FontFamilyKind::Proportional
            },
            size: font_height,
        };
        let EntryStyle {
            margin,
            border,
            padding,
        } = self.style;

        let top = y - shaper.ascent(&font);
        // One extra character keeps the entry from scrolling while typing.
        let fit_width =
            shaper.text_width(&font, &format!("{text} ")) + padding.left + padding.right;

        EditorGeometry {
            left: x - margin.left - border.left - padding.left,
            top: top - margin.top - border.top - padding.top,
            width: fit_width.max(min_width),
            font,
        }
    }

    /// Show the entry at baseline position (`x`, `y`), or move it there
    /// and replace its text if it is already shown.
    #[allow(clippy::too_many_arguments)]
    pub fn start_editing(
        &mut self,
        shaper: &dyn TextShaper,
        x: f64,
        y: f64,
        font_height: f64,
        min_width: f64,
        is_monospace: bool,
        text: &str,
    ) -> EditorTransition {
        let geometry =
            self.compute_geometry(shaper, x, y, font_height, min_width, is_monospace, text);
        let transition = if self.editing.is_some() {
            EditorTransition::Updated
        } else {
            self.focus = FocusTarget::Editor;
            EditorTransition::Shown
        };
        tracing::debug!(
            ?transition,
            left = geometry.left,
            top = geometry.top,
            width = geometry.width,
            "editor placed"
        );
        self.editing = Some(Editing {
            text: text.to_owned(),
            geometry,
        });
        transition
    }

    /// Hide the entry and hand focus back to the surface. Returns whether
    /// the entry was shown.
    pub fn stop_editing(&mut self) -> bool {
        if self.editing.take().is_none() {
            return false;
        }
        self.focus = FocusTarget::Surface;
        tracing::debug!("editor hidden");
        true
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    pub fn geometry(&self) -> Option<EditorGeometry> {
        self.editing.as_ref().map(|editing| editing.geometry)
    }

    pub fn text(&self) -> Option<&str> {
        self.editing.as_ref().map(|editing| editing.text.as_str())
    }

    /// Buffer the toolkit's entry widget edits in place.
    pub fn text_mut(&mut self) -> Option<&mut String> {
        self.editing.as_mut().map(|editing| &mut editing.text)
    }

    pub fn set_text(&mut self, text: &str) {
        if let Some(editing) = self.editing.as_mut() {
            editing.text = text.to_owned();
        }
    }

    /// Route a key to the entry. While editing every key belongs to the
    /// entry and Escape cancels editing; returns whether the key was taken.
    pub fn handle_key(&mut self, kind: KeyboardEventType, sym: Keysym) -> bool {
        if !self.is_editing() {
            return false;
        }
        if kind == KeyboardEventType::Press && sym == keysym::ESCAPE {
            self.stop_editing();
        }
        true
    }

    /// The entry was activated (Enter). Returns the text to commit.
    pub fn activate(&self) -> Option<String> {
        self.text().map(str::to_owned)
    }
}
