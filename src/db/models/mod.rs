pub mod feedback;

pub use feedback::{FeedbackEvent, FeedbackInput};
