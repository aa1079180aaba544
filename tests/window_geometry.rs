use gui_platform::settings::Settings;
use std::cell::Cell;
use std::rc::Rc;

#[path = "mock_native.rs"]
mod mock_native;
use mock_native::{mock_window, NativeCall};

#[test]
fn geometry_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    {
        let settings = Settings::with_path(path.clone());
        let (window, native) = mock_window();
        {
            let mut state = native.state.lock().unwrap();
            state.visible = true;
            state.position = (40, 60);
            state.size = (1024, 768);
        }
        window.freeze_position(&settings, "MainWindow");
        settings.flush().unwrap();
    }

    let settings = Settings::with_path(path);
    assert_eq!(settings.thaw_int("MainWindow_Left", 0), 40);
    assert!(!settings.thaw_bool("MainWindow_Maximized", true));

    let (window, native) = mock_window();
    window.thaw_position(&settings, "MainWindow");
    assert_eq!(
        native.calls(),
        vec![NativeCall::MoveTo(40, 60), NativeCall::Resize(1024, 768)]
    );
}

#[test]
fn hidden_window_saves_nothing() {
    let settings = Settings::in_memory();
    let (window, native) = mock_window();
    native.state.lock().unwrap().position = (5, 5);

    window.freeze_position(&settings, "Tools");
    assert_eq!(settings.thaw_int("Tools_Left", -1), -1);
    assert_eq!(settings.thaw_int("Tools_Width", -1), -1);
}

#[test]
fn maximizing_comes_after_the_restored_size() {
    let settings = Settings::in_memory();
    settings.freeze_int("MainWindow_Width", 800);
    settings.freeze_int("MainWindow_Height", 600);
    settings.freeze_bool("MainWindow_Maximized", true);

    let (window, native) = mock_window();
    native.state.lock().unwrap().position = (7, 9);
    window.thaw_position(&settings, "MainWindow");
    assert_eq!(
        native.calls(),
        vec![
            NativeCall::MoveTo(7, 9),
            NativeCall::Resize(800, 600),
            NativeCall::Maximize
        ]
    );
}

#[test]
fn redraw_renders_then_pumps_the_loop() {
    let (window, native) = mock_window();
    let renders = Rc::new(Cell::new(0));
    let counter = Rc::clone(&renders);
    window.on_render.set(Box::new(move || counter.set(counter.get() + 1)));

    window.redraw();
    assert_eq!(renders.get(), 1);
    assert_eq!(
        native.calls(),
        vec![
            NativeCall::QueueRender,
            NativeCall::BeginRender,
            NativeCall::IterateLoop
        ]
    );
    assert!(!window.take_render_request());
}
