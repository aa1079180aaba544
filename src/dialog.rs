//! Message and file dialogs.
//!
//! Both dialogs collect their configuration here and hand it to a native
//! modal through [`NativeMessageBox`] or [`NativeFileChooser`]; `run_modal`
//! blocks until the user answers.

use crate::menu::prepare_mnemonics;
use crate::settings::Settings;
use crate::window::prepare_title;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Information,
    Question,
    Warning,
    Error,
}

/// What the user answered. `None` means the dialog was closed without
/// pressing a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogResponse {
    None,
    Ok,
    Yes,
    No,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogButton {
    /// Label with mnemonic markup removed.
    pub label: String,
    pub response: DialogResponse,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageContent {
    pub kind: MessageType,
    pub title: String,
    pub message: String,
    pub description: String,
    pub buttons: Vec<DialogButton>,
}

impl MessageContent {
    pub fn default_button(&self) -> Option<usize> {
        self.buttons.iter().rposition(|button| button.is_default)
    }
}

/// Raw answer of a native message box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeResponse {
    /// Index into [`MessageContent::buttons`].
    Button(usize),
    Closed,
    /// Something the dialog should never report.
    Unknown(String),
}

pub trait NativeMessageBox {
    fn run(&mut self, content: &MessageContent) -> NativeResponse;
}

pub struct MessageDialog {
    app_name: String,
    content: MessageContent,
    native: Box<dyn NativeMessageBox>,
}

impl MessageDialog {
    pub fn new(app_name: &str, native: Box<dyn NativeMessageBox>) -> Self {
        let mut dialog = Self {
            app_name: app_name.to_owned(),
            content: MessageContent::default(),
            native,
        };
        dialog.set_title("Message");
        dialog
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }

    pub fn set_type(&mut self, kind: MessageType) {
        self.content.kind = kind;
    }

    pub fn set_title(&mut self, title: &str) {
        self.content.title = prepare_title(title, &self.app_name);
    }

    pub fn set_message(&mut self, message: &str) {
        self.content.message = message.to_owned();
    }

    pub fn set_description(&mut self, description: &str) {
        self.content.description = description.to_owned();
    }

    /// # Panics
    ///
    /// Panics if `response` is [`DialogResponse::None`], which is reserved
    /// for closing the dialog.
    pub fn add_button(&mut self, name: &str, response: DialogResponse, is_default: bool) {
        assert!(response != DialogResponse::None, "invalid dialog button response");
        self.content.buttons.push(DialogButton {
            label: prepare_mnemonics(name).text,
            response,
            is_default,
        });
    }

    /// Show the dialog and wait for an answer.
    ///
    /// # Panics
    ///
    /// Panics if the native dialog reports an answer that matches no button.
    pub fn run_modal(&mut self) -> DialogResponse {
        let answer = self.native.run(&self.content);
        let response = match answer {
            NativeResponse::Button(index) => match self.content.buttons.get(index) {
                Some(button) => button.response,
                None => panic!("unexpected dialog response: button {index}"),
            },
            NativeResponse::Closed => DialogResponse::None,
            NativeResponse::Unknown(raw) => panic!("unexpected dialog response: {raw}"),
        };
        tracing::debug!(?response, title = %self.content.title, "message dialog answered");
        response
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDialogKind {
    Open,
    Save,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
    /// Glob patterns, each extension in both cases.
    pub patterns: Vec<String>,
    /// Display label such as `PNG image (*.png)`.
    pub label: String,
    /// Extension appended to names when this filter is chosen.
    pub extension: String,
}

impl FileFilter {
    pub fn new(name: &str, extensions: &[&str]) -> Self {
        let mut patterns = Vec::new();
        let mut shown = Vec::new();
        for extension in extensions {
            if extension.is_empty() {
                shown.push("*".to_owned());
                continue;
            }
            let pattern = format!("*.{extension}");
            patterns.push(pattern.clone());
            patterns.push(pattern.to_uppercase());
            shown.push(pattern);
        }
        Self {
            name: name.to_owned(),
            extensions: extensions.iter().map(|ext| (*ext).to_owned()).collect(),
            patterns,
            label: format!("{name} ({})", shown.join(", ")),
            extension: extensions.first().map(|ext| (*ext).to_owned()).unwrap_or_default(),
        }
    }
}

/// Everything a native file chooser needs to show itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChooserState {
    pub kind: FileDialogKind,
    pub title: String,
    pub folder: Option<PathBuf>,
    pub current_name: String,
    pub filters: Vec<FileFilter>,
    pub active_filter: usize,
}

pub trait NativeFileChooser {
    /// `None` when the user cancelled.
    fn run(&mut self, state: &FileChooserState) -> Option<PathBuf>;
}

pub struct FileDialog {
    app_name: String,
    state: FileChooserState,
    native: Box<dyn NativeFileChooser>,
}

fn split_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    }
}

fn folder_key(key: &str) -> String {
    format!("Dialog_{key}_Folder")
}

fn filter_key(key: &str) -> String {
    format!("Dialog_{key}_Filter")
}

impl FileDialog {
    pub fn new(kind: FileDialogKind, app_name: &str, native: Box<dyn NativeFileChooser>) -> Self {
        let mut dialog = Self {
            app_name: app_name.to_owned(),
            state: FileChooserState {
                kind,
                title: String::new(),
                folder: None,
                current_name: String::new(),
                filters: Vec::new(),
                active_filter: 0,
            },
            native,
        };
        dialog.set_title(match kind {
            FileDialogKind::Open => "Open File",
            FileDialogKind::Save => "Save File",
        });
        dialog
    }

    pub fn state(&self) -> &FileChooserState {
        &self.state
    }

    pub fn set_title(&mut self, title: &str) {
        self.state.title = prepare_title(title, &self.app_name);
    }

    /// Proposed file name, without a folder.
    pub fn set_current_name(&mut self, name: &str) {
        self.state.current_name = name.to_owned();
    }

    pub fn current_name(&self) -> &str {
        &self.state.current_name
    }

    pub fn filename(&self) -> PathBuf {
        match &self.state.folder {
            Some(folder) => folder.join(&self.state.current_name),
            None => PathBuf::from(&self.state.current_name),
        }
    }

    pub fn set_filename(&mut self, path: &Path) {
        if let Some(folder) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            self.state.folder = Some(folder.to_path_buf());
        }
        self.state.current_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
    }

    pub fn add_filter(&mut self, name: &str, extensions: &[&str]) {
        self.state.filters.push(FileFilter::new(name, extensions));
    }

    pub fn active_filter(&self) -> usize {
        self.state.active_filter
    }

    /// Make filter `index` active and give the proposed name its extension.
    pub fn select_filter(&mut self, index: usize) {
        if index >= self.state.filters.len() {
            tracing::warn!(index, "no such file filter");
            return;
        }
        self.state.active_filter = index;

        let extension = self.extension();
        if extension.is_empty() {
            return;
        }
        let stem = split_stem(&self.state.current_name);
        if stem.is_empty() {
            return;
        }
        self.state.current_name = format!("{stem}.{extension}");
    }

    /// Extension bound to the active filter.
    pub fn extension(&self) -> String {
        self.state
            .filters
            .get(self.state.active_filter)
            .or_else(|| self.state.filters.first())
            .map(|filter| filter.extension.clone())
            .unwrap_or_default()
    }

    /// Activate the filter bound to `extension`, or the first filter.
    pub fn set_extension(&mut self, extension: &str) {
        let index = self
            .state
            .filters
            .iter()
            .position(|filter| filter.extension == extension)
            .unwrap_or(0);
        self.select_filter(index);
    }

    pub fn folder(&self) -> Option<&Path> {
        self.state.folder.as_deref()
    }

    pub fn set_folder(&mut self, folder: impl Into<PathBuf>) {
        self.state.folder = Some(folder.into());
    }

    pub fn freeze_choices(&self, settings: &Settings, key: &str) {
        let folder = self
            .state
            .folder
            .as_deref()
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_default();
        settings.freeze_string(&folder_key(key), &folder);
        settings.freeze_string(&filter_key(key), &self.extension());
    }

    pub fn thaw_choices(&mut self, settings: &Settings, key: &str) {
        let folder = settings.thaw_string(&folder_key(key), "");
        if !folder.is_empty() {
            self.state.folder = Some(PathBuf::from(folder));
        }
        let extension = settings.thaw_string(&filter_key(key), "");
        self.set_extension(&extension);
    }

    /// Show the chooser. Returns `true` when the user accepted a file, which
    /// is then available from [`FileDialog::filename`].
    pub fn run_modal(&mut self) -> bool {
        let unnamed = split_stem(&self.state.current_name).is_empty();
        if self.state.kind == FileDialogKind::Save && unnamed {
            self.state.current_name = format!("untitled.{}", self.extension());
        }

        let Some(mut path) = self.native.run(&self.state) else {
            return false;
        };
        // Filter changes inside the native chooser are not reported back.
        let extension = self.extension();
        if self.state.kind == FileDialogKind::Save
            && path.extension().is_none()
            && !extension.is_empty()
        {
            path.set_extension(&extension);
        }
        tracing::debug!(path = %path.display(), "file chosen");
        self.set_filename(&path);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Answer(NativeResponse);

    impl NativeMessageBox for Answer {
        fn run(&mut self, _content: &MessageContent) -> NativeResponse {
            self.0.clone()
        }
    }

    struct Cancel;

    impl NativeFileChooser for Cancel {
        fn run(&mut self, _state: &FileChooserState) -> Option<PathBuf> {
            None
        }
    }

    fn message_dialog(answer: NativeResponse) -> MessageDialog {
        MessageDialog::new("SolveSpace", Box::new(Answer(answer)))
    }

    fn save_dialog() -> FileDialog {
        let mut dialog = FileDialog::new(FileDialogKind::Save, "SolveSpace", Box::new(Cancel));
        dialog.add_filter("Text", &["txt"]);
        dialog.add_filter("SVG", &["svg"]);
        dialog
    }

    #[test]
    fn message_dialog_maps_buttons() {
        let mut dialog = message_dialog(NativeResponse::Button(1));
        assert_eq!(dialog.content().title, "Message — SolveSpace");
        dialog.add_button("&Yes", DialogResponse::Yes, true);
        dialog.add_button("&No", DialogResponse::No, false);
        assert_eq!(dialog.content().buttons[0].label, "Yes");
        assert_eq!(dialog.content().default_button(), Some(0));
        assert_eq!(dialog.run_modal(), DialogResponse::No);
    }

    #[test]
    fn closing_answers_none() {
        let mut dialog = message_dialog(NativeResponse::Closed);
        dialog.add_button("OK", DialogResponse::Ok, true);
        assert_eq!(dialog.run_modal(), DialogResponse::None);
    }

    #[test]
    #[should_panic(expected = "invalid dialog button response")]
    fn none_is_not_a_button() {
        let mut dialog = message_dialog(NativeResponse::Closed);
        dialog.add_button("Nothing", DialogResponse::None, false);
    }

    #[test]
    #[should_panic(expected = "unexpected dialog response")]
    fn unknown_native_answer_panics() {
        let mut dialog = message_dialog(NativeResponse::Unknown("help".into()));
        dialog.run_modal();
    }

    #[test]
    fn filter_label_and_patterns() {
        let filter = FileFilter::new("Images", &["png", "jpg"]);
        assert_eq!(filter.label, "Images (*.png, *.jpg)");
        assert_eq!(filter.patterns, vec!["*.png", "*.PNG", "*.jpg", "*.JPG"]);
        assert_eq!(filter.extension, "png");
    }

    #[test]
    fn selecting_a_filter_swaps_the_extension() {
        let mut dialog = save_dialog();
        dialog.set_current_name("part.txt");
        dialog.select_filter(1);
        assert_eq!(dialog.current_name(), "part.svg");
        assert_eq!(dialog.extension(), "svg");
    }

    #[test]
    fn save_without_a_name_proposes_untitled() {
        let mut dialog = save_dialog();
        dialog.set_extension("svg");
        assert!(!dialog.run_modal());
        assert_eq!(dialog.current_name(), "untitled.svg");
    }

    #[test]
    fn unknown_extension_selects_the_first_filter() {
        let mut dialog = save_dialog();
        dialog.select_filter(1);
        dialog.set_extension("dxf");
        assert_eq!(dialog.active_filter(), 0);
    }

    #[test]
    fn filename_joins_folder_and_name() {
        let mut dialog = save_dialog();
        dialog.set_filename(Path::new("/tmp/models/part.txt"));
        assert_eq!(dialog.folder(), Some(Path::new("/tmp/models")));
        assert_eq!(dialog.current_name(), "part.txt");
        assert_eq!(dialog.filename(), PathBuf::from("/tmp/models/part.txt"));
    }
}
