pub mod grouper;
pub mod orders;
pub mod report;
pub mod summary;
pub mod token;

pub use grouper::OrderGrouper;
pub use orders::{DayBatch, NaverOrderSource, OrderFetcher, OrderSource};
pub use report::{resolve_range, ReportService};
pub use summary::{render_summary, summarize_options};
pub use token::{AccessToken, TokenClient};
