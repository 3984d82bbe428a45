use serde::Serialize;
use super::category::CategoryTotals;

/// One logical customer order built from the line items sharing a group key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderGroup {
    pub group_key: String,
    pub buyer: String,
    pub buyer_id: String,
    pub product_name: String,
    pub buyer_name_mismatch: bool,
    pub buyer_id_mismatch: bool,
    pub departure_display: String,
    pub departure_checked: bool,
    pub departure_mismatch: bool,
    pub return_display: String,
    pub return_checked: bool,
    pub return_mismatch: bool,
    pub return_checkbox_mismatch: bool,
    pub damage_checked: bool,
    pub detail_confirmation: String,
    pub categories: CategoryTotals,
    pub status_display: String,
    pub payment_display: String,
    pub payment_month_day: String,
    pub payment_mismatch: bool,
    pub delivered_display: String,
    pub amount_sum: i64,
    pub order_count: usize,
    pub order_ids: Vec<String>,
    pub product_order_ids: Vec<String>,
}

impl OrderGroup {
    pub fn has_mismatch(&self) -> bool {
        self.buyer_name_mismatch
            || self.buyer_id_mismatch
            || self.departure_mismatch
            || self.return_mismatch
            || self.return_checkbox_mismatch
            || self.payment_mismatch
    }
}
