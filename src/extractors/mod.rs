pub mod category;
pub mod line_item;
pub mod option;

pub use category::CategoryClassifier;
pub use line_item::{to_raw_line_item, LineMapper};
