//! Native modal dialogs through `rfd`.

use crate::dialog::{
    FileChooserState, FileDialogKind, MessageContent, MessageType, NativeFileChooser,
    NativeMessageBox, NativeResponse,
};
use rfd::{MessageButtons, MessageDialogResult, MessageLevel};
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct RfdMessageBox;

fn message_level(kind: MessageType) -> MessageLevel {
    match kind {
        MessageType::Information | MessageType::Question => MessageLevel::Info,
        MessageType::Warning => MessageLevel::Warning,
        MessageType::Error => MessageLevel::Error,
    }
}

/// Native message boxes offer at most three custom buttons.
fn message_buttons(content: &MessageContent) -> MessageButtons {
    let labels: Vec<String> = content.buttons.iter().map(|b| b.label.clone()).collect();
    match labels.as_slice() {
        [] => MessageButtons::Ok,
        [only] => MessageButtons::OkCustom(only.clone()),
        [first, second] => MessageButtons::OkCancelCustom(first.clone(), second.clone()),
        [first, second, third, rest @ ..] => {
            if !rest.is_empty() {
                tracing::warn!(dropped = rest.len(), "message box shows only three buttons");
            }
            MessageButtons::YesNoCancelCustom(first.clone(), second.clone(), third.clone())
        }
    }
}

fn message_response(content: &MessageContent, result: MessageDialogResult) -> NativeResponse {
    let count = content.buttons.len();
    match result {
        MessageDialogResult::Custom(label) => {
            match content.buttons.iter().position(|b| b.label == label) {
                Some(index) => NativeResponse::Button(index),
                None => NativeResponse::Unknown(label),
            }
        }
        MessageDialogResult::Ok | MessageDialogResult::Yes if count > 0 => {
            NativeResponse::Button(0)
        }
        MessageDialogResult::No if count > 1 => NativeResponse::Button(1),
        MessageDialogResult::Cancel if count > 1 => NativeResponse::Button(count.min(3) - 1),
        _ => NativeResponse::Closed,
    }
}

fn message_text(content: &MessageContent) -> String {
    if content.description.is_empty() {
        content.message.clone()
    } else {
        format!("{}\n\n{}", content.message, content.description)
    }
}

impl NativeMessageBox for RfdMessageBox {
    fn run(&mut self, content: &MessageContent) -> NativeResponse {
        let result = rfd::MessageDialog::new()
            .set_level(message_level(content.kind))
            .set_title(content.title.as_str())
            .set_description(message_text(content))
            .set_buttons(message_buttons(content))
            .show();
        message_response(content, result)
    }
}

#[derive(Debug, Default)]
pub struct RfdFileChooser;

/// Filters in the order the chooser shows them. The chooser preselects its
/// first filter, so the active one goes first.
fn ordered_filters(state: &FileChooserState) -> Vec<(String, Vec<String>)> {
    let mut filters: Vec<(String, Vec<String>)> = state
        .filters
        .iter()
        .map(|filter| {
            let extensions = filter
                .extensions
                .iter()
                .filter(|ext| !ext.is_empty())
                .cloned()
                .collect();
            (filter.label.clone(), extensions)
        })
        .collect();
    if state.active_filter < filters.len() {
        let active = filters.remove(state.active_filter);
        filters.insert(0, active);
    }
    filters.retain(|(_, extensions)| !extensions.is_empty());
    filters
}

impl NativeFileChooser for RfdFileChooser {
    fn run(&mut self, state: &FileChooserState) -> Option<PathBuf> {
        let mut chooser = rfd::FileDialog::new().set_title(state.title.as_str());
        if let Some(folder) = &state.folder {
            chooser = chooser.set_directory(folder);
        }
        if !state.current_name.is_empty() {
            chooser = chooser.set_file_name(state.current_name.as_str());
        }
        for (label, extensions) in ordered_filters(state) {
            chooser = chooser.add_filter(label, &extensions);
        }
        let chosen = match state.kind {
            FileDialogKind::Open => chooser.pick_file(),
            FileDialogKind::Save => chooser.save_file(),
        };
        tracing::debug!(?chosen, kind = ?state.kind, "file chooser closed");
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{DialogButton, DialogResponse, FileFilter};

    fn labelled(labels: &[&str]) -> MessageContent {
        MessageContent {
            buttons: labels
                .iter()
                .map(|label| DialogButton {
                    label: (*label).to_owned(),
                    response: DialogResponse::Ok,
                    is_default: false,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn custom_labels_find_their_button() {
        let content = labelled(&["Save", "Discard", "Cancel"]);
        assert!(matches!(
            message_buttons(&content),
            MessageButtons::YesNoCancelCustom(..)
        ));
        assert_eq!(
            message_response(&content, MessageDialogResult::Custom("Discard".into())),
            NativeResponse::Button(1)
        );
        assert_eq!(
            message_response(&content, MessageDialogResult::Custom("Later".into())),
            NativeResponse::Unknown("Later".into())
        );
    }

    #[test]
    fn cancel_maps_to_the_last_button_or_closed() {
        assert_eq!(
            message_response(&labelled(&["Yes", "No"]), MessageDialogResult::Cancel),
            NativeResponse::Button(1)
        );
        assert_eq!(
            message_response(&labelled(&["OK"]), MessageDialogResult::Cancel),
            NativeResponse::Closed
        );
        assert_eq!(
            message_response(&labelled(&[]), MessageDialogResult::Ok),
            NativeResponse::Closed
        );
    }

    #[test]
    fn description_follows_the_message() {
        let mut content = labelled(&[]);
        content.message = "Save changes?".into();
        assert_eq!(message_text(&content), "Save changes?");
        content.description = "Unsaved work is lost.".into();
        assert_eq!(message_text(&content), "Save changes?\n\nUnsaved work is lost.");
    }

    #[test]
    fn active_filter_is_listed_first() {
        let state = FileChooserState {
            kind: FileDialogKind::Save,
            title: "Save File".into(),
            folder: None,
            current_name: String::new(),
            filters: vec![
                FileFilter::new("PNG image", &["png"]),
                FileFilter::new("SVG image", &["svg"]),
                FileFilter::new("All files", &[""]),
            ],
            active_filter: 1,
        };
        let filters = ordered_filters(&state);
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0], ("SVG image (*.svg)".to_owned(), vec!["svg".to_owned()]));
        assert_eq!(filters[1].1, vec!["png".to_owned()]);
    }
}
