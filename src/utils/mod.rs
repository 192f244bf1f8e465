mod progress_style;

pub use progress_style::{message_spinner, ProgressStyleTemplate};
