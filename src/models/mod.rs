mod category;
mod group;
mod line_item;
mod option;
mod report;
mod response;

pub use category::{Category, CategoryTotals};
pub use group::OrderGroup;
pub use line_item::{OrderLine, RawLineItem};
pub use option::{OptionEntry, OptionFields, ParsedOption};
pub use report::{OptionSummary, Report};
pub use response::{DeliveryInfo, EntryContent, OrderInfo, OrdersPage, ProductOrderEntry, ProductOrderInfo, TokenResponse};
