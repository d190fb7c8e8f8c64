mod progress;

pub use progress::MultiProgressExt;
