#![allow(dead_code)]

use gui_platform::editor::{FontSpec, TextShaper};
use gui_platform::window::{Cursor, NativeWindow, Window, WindowKind, WindowRef};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    Present,
    Title(String),
    MoveTo(i32, i32),
    Resize(i32, i32),
    Maximize,
    FullScreen(bool),
    QueueRender,
    BeginRender,
    IterateLoop,
}

#[derive(Debug, Default)]
pub struct NativeState {
    pub visible: bool,
    pub position: (i32, i32),
    pub size: (i32, i32),
    pub maximized: bool,
    pub calls: Vec<NativeCall>,
}

/// Records every request and answers geometry queries from `state`.
#[derive(Clone, Default)]
pub struct MockNative {
    pub state: Arc<Mutex<NativeState>>,
}

impl MockNative {
    pub fn calls(&self) -> Vec<NativeCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: NativeCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl NativeWindow for MockNative {
    fn is_visible(&self) -> bool {
        self.state.lock().unwrap().visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.state.lock().unwrap().visible = visible;
    }

    fn present(&mut self) {
        self.record(NativeCall::Present);
    }

    fn set_full_screen(&mut self, full_screen: bool) {
        self.record(NativeCall::FullScreen(full_screen));
    }

    fn set_title(&mut self, title: &str) {
        self.record(NativeCall::Title(title.to_owned()));
    }

    fn position(&self) -> (i32, i32) {
        self.state.lock().unwrap().position
    }

    fn size(&self) -> (i32, i32) {
        self.state.lock().unwrap().size
    }

    fn is_maximized(&self) -> bool {
        self.state.lock().unwrap().maximized
    }

    fn move_to(&mut self, left: i32, top: i32) {
        self.state.lock().unwrap().position = (left, top);
        self.record(NativeCall::MoveTo(left, top));
    }

    fn resize(&mut self, width: i32, height: i32) {
        self.state.lock().unwrap().size = (width, height);
        self.record(NativeCall::Resize(width, height));
    }

    fn maximize(&mut self) {
        self.state.lock().unwrap().maximized = true;
        self.record(NativeCall::Maximize);
    }

    fn pixel_density(&self) -> f64 {
        96.0
    }

    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    fn set_cursor(&mut self, _cursor: Cursor) {}

    fn set_tooltip(&mut self, _text: Option<&str>) {}

    fn set_min_content_size(&mut self, _width: f64, _height: f64) {}

    fn content_size(&self) -> (f64, f64) {
        let (width, height) = self.state.lock().unwrap().size;
        (f64::from(width), f64::from(height))
    }

    fn queue_render(&mut self) {
        self.record(NativeCall::QueueRender);
    }

    fn begin_render(&mut self) {
        self.record(NativeCall::BeginRender);
    }

    fn iterate_loop(&mut self) {
        self.record(NativeCall::IterateLoop);
    }
}

/// Every character is half the font size wide.
pub struct MockShaper;

impl TextShaper for MockShaper {
    fn ascent(&self, font: &FontSpec) -> f64 {
        font.size * 0.75
    }

    fn text_width(&self, font: &FontSpec, text: &str) -> f64 {
        text.chars().count() as f64 * font.size / 2.0
    }
}

pub fn mock_window() -> (WindowRef, MockNative) {
    let native = MockNative::default();
    let window = Window::new(
        WindowKind::Toplevel,
        Box::new(native.clone()),
        Box::new(MockShaper),
        "Sketch",
    );
    (window, native)
}
