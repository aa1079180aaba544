//! Toolkit layer of a desktop CAD application: windows, menus, dialogs,
//! timers, settings and input translation, with an eframe/egui backend.

pub mod backend;
pub mod config;
pub mod dialog;
pub mod editor;
pub mod error;
pub mod event;
pub mod handler;
pub mod logging;
pub mod menu;
pub mod native;
pub mod scrollbar;
pub mod settings;
pub mod spnav;
pub mod timer;
pub mod translate;
pub mod window;
