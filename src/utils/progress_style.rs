use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const ONLY_MESSAGE_TEMPLATE: &str = "{spinner} {wide_msg}";

pub struct ProgressStyleTemplate;

impl ProgressStyleTemplate {
    pub fn only_message() -> ProgressStyle {
        ProgressStyle::with_template(ONLY_MESSAGE_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

/// Ticking spinner showing `message`; hidden when stderr is not a terminal.
pub fn message_spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyleTemplate::only_message());
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
