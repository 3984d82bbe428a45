pub mod retry;
pub mod signature;
pub mod time;

pub use retry::{retry_with_backoff, RetryPolicy};
pub use signature::sign;
pub use time::sleep_with_jitter;
