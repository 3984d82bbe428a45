use std::collections::BTreeMap;
use serde::Serialize;
use super::group::OrderGroup;
use super::line_item::OrderLine;

/// Everything a presenter needs for one run: either rows or an error.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub from: String,
    pub to: String,
    pub total_order_count: usize,
    pub grouped_count: usize,
    pub total_amount: i64,
    pub orders: Vec<OrderLine>,
    pub grouped_rows: Vec<OrderGroup>,
    pub error: Option<String>,
}

impl Report {
    pub fn failed(from: String, to: String, error: String) -> Self {
        Self {
            from,
            to,
            error: Some(error),
            ..Self::default()
        }
    }
}

/// How often one product/option combination was ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSummary {
    pub product_id: String,
    pub product_name: String,
    pub option_code: String,
    pub parsed_option: BTreeMap<String, String>,
    pub option_raw: String,
    pub count: usize,
}
