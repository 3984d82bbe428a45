//! Collapses marketplace line items into logical customer orders.
//!
//! Line items group together when they share a buyer and a payment timestamp.
//! That key is a heuristic, so every field that should be single-valued within
//! one order is collected as a set and flagged when it holds more than one value.

use std::collections::{BTreeMap, BTreeSet};
use crate::models::{CategoryTotals, OrderGroup, OrderLine};
use crate::utils::time::month_day;

pub const UNKNOWN_BUYER: &str = "미확인 구매자";

#[derive(Debug, Default)]
struct Accumulator {
    buyer_names: BTreeSet<String>,
    buyer_ids: BTreeSet<String>,
    product_names: BTreeSet<String>,
    order_ids: BTreeSet<String>,
    product_order_ids: BTreeSet<String>,
    departures: BTreeSet<String>,
    returns: BTreeSet<String>,
    return_checkboxes: BTreeSet<String>,
    damage_checks: usize,
    detail_confirmations: BTreeSet<String>,
    statuses: BTreeSet<String>,
    payments: BTreeSet<String>,
    delivered: BTreeSet<String>,
    amounts: Vec<i64>,
    categories: CategoryTotals,
}

fn insert_non_empty(set: &mut BTreeSet<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        set.insert(value.to_string());
    }
}

fn join(set: &BTreeSet<String>, separator: &str) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(separator)
}

impl Accumulator {
    fn push(&mut self, line: &OrderLine) {
        let item = &line.item;
        let fields = &line.option_fields;

        insert_non_empty(&mut self.buyer_names, &item.buyer_name);
        insert_non_empty(&mut self.buyer_ids, item.buyer_id());
        insert_non_empty(&mut self.product_names, &item.product_name);
        insert_non_empty(&mut self.order_ids, &item.order_id);
        insert_non_empty(&mut self.product_order_ids, &item.product_order_id);
        insert_non_empty(&mut self.departures, &fields.departure);
        insert_non_empty(&mut self.returns, &fields.return_date);
        insert_non_empty(&mut self.return_checkboxes, &fields.return_checkbox);
        insert_non_empty(&mut self.detail_confirmations, &fields.detail_confirmation);
        insert_non_empty(&mut self.statuses, &item.status);
        insert_non_empty(&mut self.payments, &item.payment_timestamp);
        if let Some(delivered) = &item.delivered_date {
            insert_non_empty(&mut self.delivered, delivered);
        }

        if !fields.damage_checkbox.trim().is_empty() {
            self.damage_checks += 1;
        }
        if item.payment_amount > 0 {
            self.amounts.push(item.payment_amount);
        }
        self.categories.merge(&line.categories);
    }

    fn finish(self, group_key: String) -> OrderGroup {
        let buyer = if self.buyer_names.is_empty() {
            UNKNOWN_BUYER.to_string()
        } else {
            join(&self.buyer_names, ", ")
        };

        let month_days: BTreeSet<String> = self
            .payments
            .iter()
            .map(|raw| month_day(raw).unwrap_or_else(|| raw.clone()))
            .collect();

        let order_count = if !self.product_order_ids.is_empty() {
            self.product_order_ids.len()
        } else if !self.order_ids.is_empty() {
            self.order_ids.len()
        } else {
            self.amounts.len()
        };

        OrderGroup {
            group_key,
            buyer,
            buyer_id: join(&self.buyer_ids, ", "),
            product_name: join(&self.product_names, "\n"),
            buyer_name_mismatch: self.buyer_names.len() > 1,
            buyer_id_mismatch: self.buyer_ids.len() > 1,
            departure_display: join(&self.departures, ", "),
            departure_checked: !self.departures.is_empty(),
            departure_mismatch: self.departures.len() > 1,
            return_display: join(&self.returns, ", "),
            return_checked: !self.returns.is_empty(),
            return_mismatch: self.returns.len() > 1,
            return_checkbox_mismatch: self.return_checkboxes.len() > 1,
            damage_checked: self.damage_checks > 0,
            detail_confirmation: join(&self.detail_confirmations, ", "),
            categories: self.categories,
            status_display: join(&self.statuses, ", "),
            payment_display: join(&self.payments, ", "),
            payment_month_day: join(&month_days, ", "),
            payment_mismatch: self.payments.len() > 1,
            delivered_display: join(&self.delivered, ", "),
            amount_sum: self.amounts.iter().sum(),
            order_count,
            order_ids: self.order_ids.into_iter().collect(),
            product_order_ids: self.product_order_ids.into_iter().collect(),
        }
    }
}

/// `buyer|time`, where buyer is the buyer id or name and time is the payment
/// timestamp, else the order id, else a token unique to this line.
pub fn group_key(line: &OrderLine, index: usize) -> String {
    let item = &line.item;

    let buyer_key = match item.buyer_id() {
        "" => item.buyer_name.trim(),
        id => id,
    };

    let time_key = [&item.payment_timestamp, &item.order_id, &item.product_order_id]
        .into_iter()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("line-{index}"));

    format!("{buyer_key}|{time_key}")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OrderGrouper;

impl OrderGrouper {
    pub fn new() -> Self {
        Self
    }

    /// Never fails: missing fields degrade to empty displays and the
    /// unknown-buyer placeholder. Rows are sorted by buyer, then group key.
    pub fn group(&self, lines: &[OrderLine]) -> Vec<OrderGroup> {
        let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
        for (index, line) in lines.iter().enumerate() {
            groups.entry(group_key(line, index)).or_default().push(line);
        }

        let mut rows: Vec<OrderGroup> = groups
            .into_iter()
            .map(|(key, acc)| acc.finish(key))
            .collect();

        rows.sort_by(|a, b| a.buyer.cmp(&b.buyer).then_with(|| a.group_key.cmp(&b.group_key)));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::config::ClassifierConfig;
    use crate::extractors::{CategoryClassifier, LineMapper};
    use crate::models::{Category, RawLineItem};

    const PAID_AT: &str = "2025-02-08T09:15:00+09:00";

    fn mapper() -> LineMapper {
        LineMapper::new(CategoryClassifier::new(&ClassifierConfig::default()))
    }

    fn item(id: &str, buyer: &str, paid_at: &str, amount: i64) -> RawLineItem {
        RawLineItem {
            product_order_id: id.to_string(),
            order_id: format!("O-{buyer}"),
            buyer_name: format!("{buyer} 님"),
            buyer_login_id: buyer.to_string(),
            payment_timestamp: paid_at.to_string(),
            payment_amount: amount,
            quantity: 1,
            status: "PAYED".to_string(),
            ..RawLineItem::default()
        }
    }

    fn lines(items: Vec<RawLineItem>) -> Vec<OrderLine> {
        let day = NaiveDate::from_ymd_opt(2025, 2, 8).unwrap();
        let mapper = mapper();
        items.into_iter().map(|i| mapper.to_order_line(i, day)).collect()
    }

    #[test]
    fn combo_lines_sharing_buyer_and_payment_collapse_into_one_order() {
        let mario = RawLineItem {
            product_id: "12325205237".to_string(),
            product_name: "USJ 마리오 & 해리포터".to_string(),
            option_raw_text: "출국일: 2025-02-10 / 상품선택: 마리오 파워업밴드".to_string(),
            ..item("P1", "u1", PAID_AT, 90_000)
        };
        let wand = RawLineItem {
            product_id: "12325205237".to_string(),
            product_name: "USJ 마리오 & 해리포터".to_string(),
            option_raw_text: "출국일: 2025-02-10 / 상품선택: 해리포터 지팡이".to_string(),
            ..item("P2", "u1", PAID_AT, 13_000)
        };

        let rows = OrderGrouper::new().group(&lines(vec![mario, wand]));

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.buyer_id, "u1");
        assert_eq!(row.group_key, format!("u1|{PAID_AT}"));
        assert_eq!(row.amount_sum, 103_000);
        assert_eq!(row.categories.get(Category::MarioPowerUpBand), 1);
        assert_eq!(row.categories.get(Category::HarryPotterWand), 1);
        assert_eq!(row.order_count, 2);
        assert_eq!(row.payment_month_day, "02/08");
        assert_eq!(row.departure_display, "2025-02-10");
        assert!(row.departure_checked);
        assert!(!row.has_mismatch());
        assert_eq!(
            serde_json::to_value(&row.categories).unwrap(),
            serde_json::json!({"마리오파워업밴드": 1, "해리포터지팡이": 1})
        );
    }

    #[test]
    fn differing_single_valued_fields_raise_mismatch_flags() {
        let a = RawLineItem {
            option_raw_text: "출국일: 2025-02-10 / 귀국일: 2025-02-12".to_string(),
            ..item("P1", "u1", PAID_AT, 10_000)
        };
        let b = RawLineItem {
            buyer_name: "다른 이름".to_string(),
            option_raw_text: "출국일: 2025-02-11 / 귀국일: 2025-02-12".to_string(),
            ..item("P2", "u1", PAID_AT, 10_000)
        };

        let rows = OrderGrouper::new().group(&lines(vec![a, b]));

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert!(row.buyer_name_mismatch);
        assert!(!row.buyer_id_mismatch);
        assert!(row.departure_mismatch);
        assert!(!row.return_mismatch);
        assert!(!row.payment_mismatch);
        assert_eq!(row.departure_display, "2025-02-10, 2025-02-11");
        assert!(row.has_mismatch());
    }

    #[test]
    fn empty_values_do_not_count_toward_mismatch() {
        let a = RawLineItem {
            option_raw_text: "출국일: 2025-02-10".to_string(),
            ..item("P1", "u1", PAID_AT, 10_000)
        };
        let b = item("P2", "u1", PAID_AT, 0);

        let rows = OrderGrouper::new().group(&lines(vec![a, b]));

        assert!(!rows[0].departure_mismatch);
        assert!(!rows[0].return_checked);
        assert_eq!(rows[0].amount_sum, 10_000);
    }

    #[test]
    fn different_payment_times_are_different_orders() {
        let rows = OrderGrouper::new().group(&lines(vec![
            item("P1", "u1", PAID_AT, 1_000),
            item("P2", "u1", "2025-02-08T10:00:00+09:00", 2_000),
            item("P3", "u2", PAID_AT, 3_000),
        ]));

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| !row.has_mismatch()));
        let buyers: Vec<&str> = rows.iter().map(|row| row.buyer.as_str()).collect();
        assert_eq!(buyers, vec!["u1 님", "u1 님", "u2 님"]);
    }

    #[test]
    fn grouping_ignores_input_order() {
        let items = vec![
            RawLineItem {
                option_raw_text: "상품선택: 트라이크".to_string(),
                ..item("P1", "u1", PAID_AT, 5_000)
            },
            item("P2", "u2", PAID_AT, 7_000),
            RawLineItem {
                option_raw_text: "출국일: 2025-02-11".to_string(),
                ..item("P3", "u1", PAID_AT, 1_000)
            },
        ];
        let mut reversed = items.clone();
        reversed.reverse();

        let grouper = OrderGrouper::new();
        assert_eq!(grouper.group(&lines(items)), grouper.group(&lines(reversed)));
    }

    #[test]
    fn sums_and_categories_are_conserved() {
        let items = vec![
            RawLineItem {
                product_id: "12418025840".to_string(),
                quantity: 2,
                ..item("P1", "u1", PAID_AT, 5_000)
            },
            RawLineItem {
                product_id: "12418025840".to_string(),
                ..item("P2", "u2", PAID_AT, 7_000)
            },
            item("P3", "u2", PAID_AT, -500),
        ];
        let lines = lines(items);
        let rows = OrderGrouper::new().group(&lines);

        let grouped_trikes: u32 = rows.iter().map(|r| r.categories.get(Category::Trike)).sum();
        let line_trikes: u32 = lines.iter().map(|l| l.categories.get(Category::Trike)).sum();
        assert_eq!(grouped_trikes, 3);
        assert_eq!(grouped_trikes, line_trikes);

        let total: i64 = rows.iter().map(|r| r.amount_sum).sum();
        assert_eq!(total, 12_000);
    }

    #[test]
    fn all_empty_rows_degrade_to_placeholders() {
        let rows = OrderGrouper::new().group(&lines(vec![
            RawLineItem::default(),
            RawLineItem::default(),
        ]));

        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.buyer, UNKNOWN_BUYER);
            assert_eq!(row.buyer_id, "");
            assert_eq!(row.amount_sum, 0);
            assert_eq!(row.order_count, 0);
            assert!(!row.has_mismatch());
        }
        assert_ne!(rows[0].group_key, rows[1].group_key);
    }

    #[test]
    fn key_falls_back_to_name_and_order_id() {
        let mapped = lines(vec![RawLineItem {
            buyer_name: "홍길동".to_string(),
            order_id: "O-9".to_string(),
            ..RawLineItem::default()
        }]);
        assert_eq!(group_key(&mapped[0], 0), "홍길동|O-9");
    }

    #[test]
    fn damage_checkbox_on_any_line_marks_the_group() {
        let rows = OrderGrouper::new().group(&lines(vec![
            item("P1", "u1", PAID_AT, 1_000),
            RawLineItem {
                option_raw_text: "파손 확인: 확인함".to_string(),
                ..item("P2", "u1", PAID_AT, 1_000)
            },
        ]));
        assert!(rows[0].damage_checked);
    }
}
