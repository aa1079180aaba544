//! Top-level windows.
//!
//! A [`Window`] owns the toolkit independent parts of a window (menu bar
//! slot, editor overlay, scrollbar, fullscreen mirror) and drives the native
//! window through [`NativeWindow`]. The backend feeds native input through
//! the `handle_*` methods, which translate it and dispatch to the handler
//! slots the application fills in.

use crate::editor::{EditorOverlay, EditorTransition, TextShaper};
use crate::event::{KeyboardEvent, KeyboardEventType, MouseEvent, MouseEventType, SixDofEvent};
use crate::handler::Handler;
use crate::menu::MenuBarRef;
use crate::native::{
    ButtonPressKind, KeyPayload, ModifierMask, PointerPayload, ScrollPayload, SpnavPayload,
};
use crate::scrollbar::Scrollbar;
use crate::settings::Settings;
use crate::translate;
use std::cell::{Cell, RefCell, RefMut};
use std::rc::Rc;

pub type WindowRef = Rc<Window>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowKind {
    #[default]
    Toplevel,
    /// Utility window kept out of the task bar.
    Tool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Pointer,
    Hand,
}

/// Operations on the toolkit's window. Positions and sizes are in the
/// toolkit's logical units; geometry is always queried live.
pub trait NativeWindow {
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
    /// Raise the window and give it keyboard focus.
    fn present(&mut self);
    fn set_full_screen(&mut self, full_screen: bool);
    fn set_title(&mut self, title: &str);

    fn position(&self) -> (i32, i32);
    fn size(&self) -> (i32, i32);
    fn is_maximized(&self) -> bool;
    fn move_to(&mut self, left: i32, top: i32);
    fn resize(&mut self, width: i32, height: i32);
    fn maximize(&mut self);

    /// Screen resolution in dots per inch.
    fn pixel_density(&self) -> f64;
    /// Physical pixels per logical pixel.
    fn device_pixel_ratio(&self) -> f64;

    fn set_cursor(&mut self, cursor: Cursor);
    /// `None` disables the tooltip.
    fn set_tooltip(&mut self, text: Option<&str>);

    fn set_min_content_size(&mut self, width: f64, height: f64);
    /// Size of the drawing surface.
    fn content_size(&self) -> (f64, f64);

    /// Ask for the surface to be rendered on the next frame.
    fn queue_render(&mut self);
    /// Discard what the previous render drew; `on_render` follows.
    fn begin_render(&mut self) {}
    /// Run one non-blocking iteration of the event loop.
    fn iterate_loop(&mut self);
}

#[derive(Debug, Default)]
struct GeometryKeys {
    left: String,
    top: String,
    width: String,
    height: String,
    maximized: String,
}

impl GeometryKeys {
    fn new(key: &str) -> Self {
        Self {
            left: format!("{key}_Left"),
            top: format!("{key}_Top"),
            width: format!("{key}_Width"),
            height: format!("{key}_Height"),
            maximized: format!("{key}_Maximized"),
        }
    }
}

/// Window title with the application name appended.
pub fn prepare_title(title: &str, app_name: &str) -> String {
    format!("{title} — {app_name}")
}

pub struct Window {
    kind: WindowKind,
    app_name: String,
    native: RefCell<Box<dyn NativeWindow>>,
    shaper: Box<dyn TextShaper>,
    menu_bar: RefCell<Option<MenuBarRef>>,
    editor: RefCell<EditorOverlay>,
    scrollbar: RefCell<Scrollbar>,
    full_screen: Cell<bool>,
    render_requested: Cell<bool>,
    rendering: Cell<bool>,

    /// The user asked to close the window. When set, the window stays open.
    pub on_close: Handler<dyn FnMut()>,
    pub on_full_screen: Handler<dyn FnMut(bool)>,
    /// Returns whether the event was consumed.
    pub on_mouse_event: Handler<dyn FnMut(MouseEvent) -> bool>,
    /// Returns whether the event was consumed.
    pub on_keyboard_event: Handler<dyn FnMut(KeyboardEvent) -> bool>,
    pub on_editing_done: Handler<dyn FnMut(String)>,
    pub on_scrollbar_adjusted: Handler<dyn FnMut(f64)>,
    pub on_render: Handler<dyn FnMut()>,
    pub on_six_dof_event: Handler<dyn FnMut(SixDofEvent)>,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("kind", &self.kind)
            .field("full_screen", &self.full_screen.get())
            .finish_non_exhaustive()
    }
}

impl Window {
    pub fn new(
        kind: WindowKind,
        native: Box<dyn NativeWindow>,
        shaper: Box<dyn TextShaper>,
        app_name: &str,
    ) -> WindowRef {
        Rc::new(Self {
            kind,
            app_name: app_name.to_owned(),
            native: RefCell::new(native),
            shaper,
            menu_bar: RefCell::new(None),
            editor: RefCell::new(EditorOverlay::default()),
            scrollbar: RefCell::new(Scrollbar::default()),
            full_screen: Cell::new(false),
            render_requested: Cell::new(true),
            rendering: Cell::new(false),
            on_close: Handler::default(),
            on_full_screen: Handler::default(),
            on_mouse_event: Handler::default(),
            on_keyboard_event: Handler::default(),
            on_editing_done: Handler::default(),
            on_scrollbar_adjusted: Handler::default(),
            on_render: Handler::default(),
            on_six_dof_event: Handler::default(),
        })
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn is_visible(&self) -> bool {
        self.native.borrow().is_visible()
    }

    pub fn set_visible(&self, visible: bool) {
        self.native.borrow_mut().set_visible(visible);
    }

    pub fn focus(&self) {
        self.native.borrow_mut().present();
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen.get()
    }

    /// Request a fullscreen change. The mirrored flag only follows once the
    /// toolkit reports the new state.
    pub fn set_full_screen(&self, full_screen: bool) {
        self.native.borrow_mut().set_full_screen(full_screen);
    }

    pub fn set_title(&self, title: &str) {
        let title = prepare_title(title, &self.app_name);
        self.native.borrow_mut().set_title(&title);
    }

    pub fn set_menu_bar(&self, menu_bar: Option<MenuBarRef>) {
        *self.menu_bar.borrow_mut() = menu_bar;
    }

    pub fn menu_bar(&self) -> Option<MenuBarRef> {
        self.menu_bar.borrow().clone()
    }

    pub fn content_size(&self) -> (f64, f64) {
        self.native.borrow().content_size()
    }

    pub fn set_min_content_size(&self, width: f64, height: f64) {
        self.native.borrow_mut().set_min_content_size(width, height);
    }

    pub fn pixel_density(&self) -> f64 {
        self.native.borrow().pixel_density()
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.native.borrow().device_pixel_ratio()
    }

    pub fn set_cursor(&self, cursor: Cursor) {
        self.native.borrow_mut().set_cursor(cursor);
    }

    /// An empty text disables the tooltip.
    pub fn set_tooltip(&self, text: &str) {
        let text = (!text.is_empty()).then_some(text);
        self.native.borrow_mut().set_tooltip(text);
    }

    /// Save the live geometry under `key`. Hidden windows save nothing, so
    /// a window that was never shown cannot clobber good geometry.
    pub fn freeze_position(&self, settings: &Settings, key: &str) {
        let native = self.native.borrow();
        if !native.is_visible() {
            return;
        }

        let (left, top) = native.position();
        let (width, height) = native.size();
        let maximized = native.is_maximized();

        let keys = GeometryKeys::new(key);
        settings.freeze_int(&keys.left, left);
        settings.freeze_int(&keys.top, top);
        settings.freeze_int(&keys.width, width);
        settings.freeze_int(&keys.height, height);
        settings.freeze_bool(&keys.maximized, maximized);
        tracing::debug!(key, left, top, width, height, maximized, "window geometry saved");
    }

    /// Restore geometry saved under `key`, keeping the live value for any
    /// missing entry. Maximizing comes last so the restored size stays the
    /// unmaximized size.
    pub fn thaw_position(&self, settings: &Settings, key: &str) {
        let mut native = self.native.borrow_mut();
        let (left, top) = native.position();
        let (width, height) = native.size();

        let keys = GeometryKeys::new(key);
        let left = settings.thaw_int(&keys.left, left);
        let top = settings.thaw_int(&keys.top, top);
        let width = settings.thaw_int(&keys.width, width);
        let height = settings.thaw_int(&keys.height, height);

        native.move_to(left, top);
        native.resize(width, height);
        if settings.thaw_bool(&keys.maximized, false) {
            native.maximize();
        }
        tracing::debug!(key, left, top, width, height, "window geometry restored");
    }

    pub fn is_editor_visible(&self) -> bool {
        self.editor.borrow().is_editing()
    }

    /// Show the inline editor with its baseline at (`x`, `y`).
    pub fn show_editor(
        &self,
        x: f64,
        y: f64,
        font_height: f64,
        min_width: f64,
        is_monospace: bool,
        text: &str,
    ) {
        let transition = self.editor.borrow_mut().start_editing(
            self.shaper.as_ref(),
            x,
            y,
            font_height,
            min_width,
            is_monospace,
            text,
        );
        if transition == EditorTransition::Shown {
            self.native.borrow_mut().present();
        }
        self.native.borrow_mut().queue_render();
    }

    pub fn hide_editor(&self) {
        if self.editor.borrow_mut().stop_editing() {
            self.native.borrow_mut().queue_render();
        }
    }

    /// Editor state for the backend's entry widget.
    pub fn editor_mut(&self) -> RefMut<'_, EditorOverlay> {
        self.editor.borrow_mut()
    }

    /// The entry was activated: end editing, then commit its text. The
    /// host may start the next edit from `on_editing_done`.
    pub fn editor_activated(&self) {
        let Some(text) = self.editor.borrow().activate() else {
            return;
        };
        tracing::debug!(%text, "editing done");
        self.hide_editor();
        self.on_editing_done.with(|done| done(text));
    }

    pub fn set_scrollbar_visible(&self, visible: bool) {
        self.scrollbar.borrow_mut().set_visible(visible);
    }

    pub fn configure_scrollbar(&self, min: f64, max: f64, page_size: f64) {
        let moved = self.scrollbar.borrow_mut().configure(min, max, page_size);
        self.notify_scrollbar(moved);
    }

    pub fn scrollbar_position(&self) -> f64 {
        self.scrollbar.borrow().value()
    }

    pub fn set_scrollbar_position(&self, position: f64) {
        let moved = self.scrollbar.borrow_mut().set_value(position);
        self.notify_scrollbar(moved);
    }

    pub fn scrollbar(&self) -> Scrollbar {
        self.scrollbar.borrow().clone()
    }

    fn notify_scrollbar(&self, moved: Option<f64>) {
        if let Some(value) = moved {
            self.on_scrollbar_adjusted.with(|adjusted| adjusted(value));
        }
    }

    /// Mark the surface as needing a render.
    pub fn invalidate(&self) {
        self.render_requested.set(true);
        self.native.borrow_mut().queue_render();
    }

    /// Render the surface now and have the loop present it. Called from
    /// inside `on_render` it only invalidates, so the next frame renders.
    pub fn redraw(&self) {
        self.invalidate();
        if !self.rendering.get() && self.take_render_request() {
            self.render();
        }
        self.native.borrow_mut().iterate_loop();
    }

    /// Consume a pending render request.
    pub fn take_render_request(&self) -> bool {
        self.render_requested.replace(false)
    }

    /// Replace the surface contents with what `on_render` draws.
    pub fn render(&self) {
        if self.rendering.replace(true) {
            return;
        }
        self.native.borrow_mut().begin_render();
        self.on_render.with(|render| render());
        self.rendering.set(false);
    }

    // Native notifications.

    pub fn handle_pointer(&self, kind: MouseEventType, payload: &PointerPayload) -> bool {
        self.dispatch_mouse(translate::translate_pointer(kind, payload))
    }

    pub fn handle_button_press(&self, press: ButtonPressKind, payload: &PointerPayload) -> bool {
        match translate::translate_button_press(press, payload) {
            Some(event) => self.dispatch_mouse(event),
            None => false,
        }
    }

    pub fn handle_scroll(&self, payload: &ScrollPayload) -> bool {
        match translate::translate_scroll(payload) {
            Some(event) => self.dispatch_mouse(event),
            None => false,
        }
    }

    fn dispatch_mouse(&self, event: MouseEvent) -> bool {
        tracing::trace!(?event, "mouse event");
        self.on_mouse_event.with(|handler| handler(event)).unwrap_or(false)
    }

    /// Keys go to the inline editor while it is shown, then to menu
    /// accelerators, then to the application.
    pub fn handle_key(&self, kind: KeyboardEventType, payload: &KeyPayload) -> bool {
        let taken = self.editor.borrow_mut().handle_key(kind, payload.keysym);
        if taken {
            if !self.is_editor_visible() {
                self.native.borrow_mut().queue_render();
            }
            return true;
        }

        if kind == KeyboardEventType::Press {
            let accelerated = self.menu_bar().and_then(|bar| bar.find_accelerator(payload));
            if let Some(item) = accelerated {
                item.native_activate();
                return true;
            }
        }

        match translate::translate_key(kind, payload) {
            Some(event) => {
                tracing::trace!(?event, "keyboard event");
                self.on_keyboard_event.with(|handler| handler(event)).unwrap_or(false)
            }
            None => false,
        }
    }

    /// Returns whether an event was delivered.
    pub fn handle_six_dof(&self, payload: &SpnavPayload, state: ModifierMask) -> bool {
        let Some(event) = translate::translate_six_dof(payload, state) else {
            tracing::debug!(?payload, "unmapped space mouse input");
            return false;
        };
        self.on_six_dof_event.with(|handler| handler(event)).is_some()
    }

    /// Returns `true` when the close must be cancelled because the
    /// application handles it.
    pub fn handle_close_request(&self) -> bool {
        self.on_close.with(|close| close()).is_some()
    }

    pub fn handle_window_state(&self, full_screen: bool) {
        if self.full_screen.replace(full_screen) == full_screen {
            return;
        }
        tracing::debug!(full_screen, "window state changed");
        self.on_full_screen.with(|notify| notify(full_screen));
    }

    /// The user moved the scrollbar.
    pub fn handle_scrollbar_changed(&self, value: f64) {
        let moved = self.scrollbar.borrow_mut().set_value(value);
        self.notify_scrollbar(moved);
    }
}
