//! Native modal dialogs. Each call blocks the UI thread until dismissed.

use rfd::{MessageButtons, MessageDialog, MessageLevel};

pub fn info(title: &str, text: &str) {
    show(MessageLevel::Info, title, text, MessageButtons::Ok);
}

pub fn warning(title: &str, text: &str) {
    show(MessageLevel::Warning, title, text, MessageButtons::Ok);
}

pub fn error(title: &str, text: &str) {
    show(MessageLevel::Error, title, text, MessageButtons::Ok);
}

/// Yes/No question; `true` means yes.
pub fn confirm(title: &str, text: &str) -> bool {
    show(MessageLevel::Warning, title, text, MessageButtons::YesNo)
}

fn show(level: MessageLevel, title: &str, text: &str, buttons: MessageButtons) -> bool {
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(text)
        .set_buttons(buttons)
        .show()
}
