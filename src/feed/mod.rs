pub mod loop_worker;
pub mod publisher;

pub use publisher::{FeedPublisher, Subscription};
