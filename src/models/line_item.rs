use serde::Serialize;
use super::category::CategoryTotals;
use super::option::{OptionEntry, OptionFields};

/// One marketplace order line as returned by the orders endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLineItem {
    pub product_order_id: String,
    pub product_id: String,
    pub order_id: String,
    pub buyer_name: String,
    pub buyer_login_id: String,
    pub buyer_no: String,
    pub buyer_tel: String,
    pub product_name: String,
    pub option_raw_text: String,
    pub option_code: String,
    pub mall_id: String,
    pub status: String,
    pub quantity: i64,
    pub payment_amount: i64,
    pub payment_timestamp: String,
    pub delivered_date: Option<String>,
}

impl RawLineItem {
    /// Cancelled and returned lines never reach the report.
    pub fn is_excluded(&self) -> bool {
        let status = self.status.to_uppercase();
        status.contains("CANCEL") || status.contains("RETURN")
    }

    /// Login id, falling back to the member number.
    pub fn buyer_id(&self) -> &str {
        let login = self.buyer_login_id.trim();
        if login.is_empty() {
            self.buyer_no.trim()
        } else {
            login
        }
    }
}

/// A line item together with everything derived from its option string.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(flatten)]
    pub item: RawLineItem,
    pub option_fields: OptionFields,
    pub option_details: Vec<OptionEntry>,
    pub categories: CategoryTotals,
    pub range_date: String,
}
