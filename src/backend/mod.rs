//! eframe/egui backend.
//!
//! [`run`] owns the event loop. Everything the application creates goes
//! through the [`Platform`] handed to its setup closure; the handle is cheap
//! to clone and may be captured by callbacks that create windows or dialogs
//! later on.

mod app;
mod dialogs;
mod input;
mod shaper;
mod viewport;

pub use dialogs::{RfdFileChooser, RfdMessageBox};
pub use shaper::EguiShaper;
pub use viewport::{EguiViewport, SurfacePainter};

use crate::config::PlatformConfig;
use crate::dialog::{FileDialog, FileDialogKind, MessageDialog};
use crate::error::PlatformError;
use crate::settings::{Settings, SettingsRef};
use crate::timer::{TimerQueue, TimerRef};
use crate::window::{Window, WindowKind, WindowRef};
use eframe::egui;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use viewport::{SharedViewport, ViewportState};

/// A window together with the viewport the frame loop draws it into.
#[derive(Clone)]
pub(crate) struct ManagedWindow {
    pub window: WindowRef,
    pub viewport: SharedViewport,
}

struct PlatformInner {
    config: PlatformConfig,
    settings: SettingsRef,
    ctx: egui::Context,
    timers: TimerQueue,
    windows: RefCell<Vec<ManagedWindow>>,
    exiting: Cell<bool>,
}

#[derive(Clone)]
pub struct Platform {
    inner: Rc<PlatformInner>,
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("app_name", &self.inner.config.app_name)
            .field("windows", &self.inner.windows.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Platform {
    pub(crate) fn new(config: PlatformConfig, settings: SettingsRef, ctx: egui::Context) -> Self {
        Self {
            inner: Rc::new(PlatformInner {
                config,
                settings,
                ctx,
                timers: TimerQueue::default(),
                windows: RefCell::new(Vec::new()),
                exiting: Cell::new(false),
            }),
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.inner.config
    }

    pub fn settings(&self) -> SettingsRef {
        Arc::clone(&self.inner.settings)
    }

    pub fn context(&self) -> &egui::Context {
        &self.inner.ctx
    }

    /// The first window becomes the main viewport, later ones open as
    /// separate native windows once made visible.
    pub fn create_window(&self, kind: WindowKind) -> WindowRef {
        let mut windows = self.inner.windows.borrow_mut();
        let id = if windows.is_empty() {
            egui::ViewportId::ROOT
        } else {
            egui::ViewportId::from_hash_of(("gui_platform_window", windows.len()))
        };
        let (width, height) = self.inner.config.initial_size;
        let viewport = ViewportState::new(
            id,
            &self.inner.config.app_name,
            egui::vec2(width, height),
        );
        let native = EguiViewport::new(self.inner.ctx.clone(), Rc::clone(&viewport));
        let window = Window::new(
            kind,
            Box::new(native),
            Box::new(EguiShaper::new()),
            &self.inner.config.app_name,
        );
        tracing::debug!(?kind, ?id, "window created");
        windows.push(ManagedWindow {
            window: Rc::clone(&window),
            viewport,
        });
        window
    }

    /// Painter recording what `window` draws during `on_render`.
    pub fn surface_painter(&self, window: &WindowRef) -> Option<SurfacePainter> {
        self.inner
            .windows
            .borrow()
            .iter()
            .find(|managed| Rc::ptr_eq(&managed.window, window))
            .map(|managed| SurfacePainter::new(Rc::clone(&managed.viewport)))
    }

    pub fn create_timer(&self) -> TimerRef {
        self.inner.timers.create_timer()
    }

    pub fn message_dialog(&self) -> MessageDialog {
        MessageDialog::new(&self.inner.config.app_name, Box::new(RfdMessageBox))
    }

    pub fn open_file_dialog(&self) -> FileDialog {
        FileDialog::new(
            FileDialogKind::Open,
            &self.inner.config.app_name,
            Box::new(RfdFileChooser),
        )
    }

    pub fn save_file_dialog(&self) -> FileDialog {
        FileDialog::new(
            FileDialogKind::Save,
            &self.inner.config.app_name,
            Box::new(RfdFileChooser),
        )
    }

    /// Leave the event loop. Close handlers are not consulted.
    pub fn exit(&self) {
        tracing::info!("exit requested");
        self.inner.exiting.set(true);
        self.inner
            .ctx
            .send_viewport_cmd_to(egui::ViewportId::ROOT, egui::ViewportCommand::Close);
    }

    pub(crate) fn is_exiting(&self) -> bool {
        self.inner.exiting.get()
    }

    pub(crate) fn timers(&self) -> &TimerQueue {
        &self.inner.timers
    }

    pub(crate) fn windows(&self) -> Vec<ManagedWindow> {
        self.inner.windows.borrow().clone()
    }

    /// Window receiving space mouse input: the focused one, else the first.
    pub(crate) fn focused_window(&self) -> Option<ManagedWindow> {
        let windows = self.inner.windows.borrow();
        windows
            .iter()
            .find(|managed| {
                let state = managed.viewport.borrow();
                state.visible && state.info.focused == Some(true)
            })
            .or_else(|| windows.first())
            .cloned()
    }
}

/// Decode a PNG into a window icon.
pub fn load_icon_png(bytes: &[u8]) -> Result<egui::IconData, PlatformError> {
    let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|err| PlatformError::Icon(err.to_string()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(egui::IconData {
        rgba: image.into_raw(),
        width,
        height,
    })
}

fn load_icon(path: &std::path::Path) -> Option<egui::IconData> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(path = %path.display(), ?err, "cannot read window icon");
            return None;
        }
    };
    match load_icon_png(&bytes) {
        Ok(icon) => Some(icon),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "cannot decode window icon");
            None
        }
    }
}

/// Initialise logging and settings, then run the event loop until the main
/// window closes. `setup` runs once the loop exists and builds the
/// application's windows and menus.
pub fn run<F>(config: PlatformConfig, setup: F) -> Result<(), PlatformError>
where
    F: FnOnce(&mut Platform) + 'static,
{
    crate::logging::init(config.debug_logging, config.log_file.clone());
    tracing::info!(app = %config.app_name, "starting");

    let settings = Settings::open(&config);
    let (width, height) = config.initial_size;
    let mut viewport = egui::ViewportBuilder::default()
        .with_title(config.app_name.clone())
        .with_inner_size([width, height]);
    if let Some(icon) = config.icon.as_deref().and_then(load_icon) {
        viewport = viewport.with_icon(Arc::new(icon));
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let name = config.app_name.clone();
    let saved = Arc::clone(&settings);
    let result = eframe::run_native(
        &name,
        options,
        Box::new(move |cc| {
            let mut platform = Platform::new(config, settings, cc.egui_ctx.clone());
            setup(&mut platform);
            Box::new(app::PlatformApp::new(platform))
        }),
    );
    if let Err(err) = saved.flush() {
        tracing::warn!(?err, "cannot save settings");
    }
    result.map_err(|err| PlatformError::EventLoop(err.to_string()))
}

/// [`run`] for hosts that cannot continue without a display.
pub fn run_or_abort<F>(config: PlatformConfig, setup: F)
where
    F: FnOnce(&mut Platform) + 'static,
{
    if let Err(err) = run(config, setup) {
        crate::error::fatal_error(&err.to_string());
    }
}
