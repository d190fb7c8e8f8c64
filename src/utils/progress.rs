use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

const MESSAGE_TEMPLATE: &str = "{spinner} {wide_msg}";

pub trait MultiProgressExt {
    fn add_message_spinner(&self) -> ProgressBar;
}

impl MultiProgressExt for MultiProgress {
    fn add_message_spinner(&self) -> ProgressBar {
        let pb = self.add(ProgressBar::no_length());
        pb.set_style(ProgressStyle::with_template(MESSAGE_TEMPLATE).unwrap());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}
