//! [`NativeWindow`] over an egui viewport.

use crate::window::{Cursor, NativeWindow};
use eframe::egui::{self, ViewportCommand, ViewportId};
use std::cell::RefCell;
use std::rc::Rc;

/// Dots per inch at one physical pixel per point.
const BASE_DPI: f64 = 96.0;

/// State shared between a window's [`EguiViewport`] and the frame loop.
#[derive(Debug)]
pub(crate) struct ViewportState {
    pub id: ViewportId,
    pub title: String,
    pub initial_size: egui::Vec2,
    pub visible: bool,
    /// Copy of what egui reported for the viewport on the last frame.
    pub info: egui::ViewportInfo,
    /// Screen rectangle of the drawing surface on the last frame.
    pub surface: egui::Rect,
    /// Shapes from the last render, relative to the surface origin.
    pub scene: Vec<egui::Shape>,
    pub cursor: Cursor,
    pub tooltip: Option<String>,
}

pub(crate) type SharedViewport = Rc<RefCell<ViewportState>>;

impl ViewportState {
    pub fn new(id: ViewportId, title: &str, initial_size: egui::Vec2) -> SharedViewport {
        Rc::new(RefCell::new(Self {
            id,
            title: title.to_owned(),
            initial_size,
            visible: id == ViewportId::ROOT,
            info: egui::ViewportInfo::default(),
            surface: egui::Rect::NOTHING,
            scene: Vec::new(),
            cursor: Cursor::default(),
            tooltip: None,
        }))
    }
}

/// Drives one viewport through viewport commands and reads back the
/// cached [`egui::ViewportInfo`].
pub struct EguiViewport {
    ctx: egui::Context,
    state: SharedViewport,
}

impl std::fmt::Debug for EguiViewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EguiViewport")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl EguiViewport {
    pub(crate) fn new(ctx: egui::Context, state: SharedViewport) -> Self {
        Self { ctx, state }
    }

    fn id(&self) -> ViewportId {
        self.state.borrow().id
    }

    fn send(&self, command: ViewportCommand) {
        tracing::trace!(?command, "viewport command");
        self.ctx.send_viewport_cmd_to(self.id(), command);
    }

    fn native_pixels_per_point(&self) -> f32 {
        self.state
            .borrow()
            .info
            .native_pixels_per_point
            .unwrap_or_else(|| self.ctx.pixels_per_point())
    }
}

impl NativeWindow for EguiViewport {
    fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    fn set_visible(&mut self, visible: bool) {
        let root = {
            let mut state = self.state.borrow_mut();
            state.visible = visible;
            state.id == ViewportId::ROOT
        };
        // Secondary viewports open and close by being shown or not.
        if root {
            self.send(ViewportCommand::Visible(visible));
        }
        self.ctx.request_repaint();
    }

    fn present(&mut self) {
        self.set_visible(true);
        self.send(ViewportCommand::Minimized(false));
        self.send(ViewportCommand::Focus);
    }

    fn set_full_screen(&mut self, full_screen: bool) {
        self.send(ViewportCommand::Fullscreen(full_screen));
    }

    fn set_title(&mut self, title: &str) {
        self.state.borrow_mut().title = title.to_owned();
        self.send(ViewportCommand::Title(title.to_owned()));
    }

    fn position(&self) -> (i32, i32) {
        let state = self.state.borrow();
        state
            .info
            .outer_rect
            .map_or((0, 0), |rect| (rect.min.x.round() as i32, rect.min.y.round() as i32))
    }

    fn size(&self) -> (i32, i32) {
        let state = self.state.borrow();
        let size = state
            .info
            .inner_rect
            .map_or(state.initial_size, |rect| rect.size());
        (size.x.round() as i32, size.y.round() as i32)
    }

    fn is_maximized(&self) -> bool {
        self.state.borrow().info.maximized.unwrap_or(false)
    }

    fn move_to(&mut self, left: i32, top: i32) {
        self.send(ViewportCommand::OuterPosition(egui::pos2(
            left as f32,
            top as f32,
        )));
    }

    fn resize(&mut self, width: i32, height: i32) {
        let size = egui::vec2(width as f32, height as f32);
        self.state.borrow_mut().initial_size = size;
        self.send(ViewportCommand::InnerSize(size));
    }

    fn maximize(&mut self) {
        self.send(ViewportCommand::Maximized(true));
    }

    fn pixel_density(&self) -> f64 {
        BASE_DPI * f64::from(self.native_pixels_per_point())
    }

    fn device_pixel_ratio(&self) -> f64 {
        f64::from(self.native_pixels_per_point())
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.state.borrow_mut().cursor = cursor;
    }

    fn set_tooltip(&mut self, text: Option<&str>) {
        self.state.borrow_mut().tooltip = text.map(str::to_owned);
    }

    fn set_min_content_size(&mut self, width: f64, height: f64) {
        self.send(ViewportCommand::MinInnerSize(egui::vec2(
            width as f32,
            height as f32,
        )));
    }

    fn content_size(&self) -> (f64, f64) {
        let state = self.state.borrow();
        if state.surface == egui::Rect::NOTHING {
            return (0.0, 0.0);
        }
        let size = state.surface.size();
        (f64::from(size.x), f64::from(size.y))
    }

    fn queue_render(&mut self) {
        self.ctx.request_repaint_of(self.id());
    }

    fn begin_render(&mut self) {
        self.state.borrow_mut().scene.clear();
    }

    /// The scene is already recorded; the next frame presents it.
    fn iterate_loop(&mut self) {
        self.ctx.request_repaint_of(self.id());
    }
}

/// Records what the application draws during `on_render`. The shapes are
/// kept and replayed every frame until the next render.
#[derive(Debug, Clone)]
pub struct SurfacePainter {
    state: SharedViewport,
}

impl SurfacePainter {
    pub(crate) fn new(state: SharedViewport) -> Self {
        Self { state }
    }

    /// Surface size in points. Shapes use the surface's top-left corner as
    /// origin.
    pub fn size(&self) -> egui::Vec2 {
        let state = self.state.borrow();
        if state.surface == egui::Rect::NOTHING {
            egui::Vec2::ZERO
        } else {
            state.surface.size()
        }
    }

    pub fn add(&self, shape: impl Into<egui::Shape>) {
        self.state.borrow_mut().scene.push(shape.into());
    }

    pub fn clear(&self) {
        self.state.borrow_mut().scene.clear();
    }
}
