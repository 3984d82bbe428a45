use chrono::NaiveDate;
use crate::extractors::category::CategoryClassifier;
use crate::extractors::option::{parse, resolve_fields};
use crate::models::{OrderLine, ProductOrderEntry, RawLineItem};

/// Flattens one API entry into a line item. Missing sections become empty fields.
pub fn to_raw_line_item(entry: &ProductOrderEntry) -> RawLineItem {
    let order = &entry.content.order;
    let product = &entry.content.product_order;
    let delivered = entry.content.delivery.delivered_date.trim();

    let product_order_id = if product.product_order_id.is_empty() {
        entry.product_order_id.clone()
    } else {
        product.product_order_id.clone()
    };

    RawLineItem {
        product_order_id,
        product_id: product.product_id.clone(),
        order_id: order.order_id.clone(),
        buyer_name: order.orderer_name.clone(),
        buyer_login_id: order.orderer_id.clone(),
        buyer_no: order.orderer_no.clone(),
        buyer_tel: order.orderer_tel.clone(),
        product_name: product.product_name.clone(),
        option_raw_text: product.product_option.clone(),
        option_code: product.option_code.clone(),
        mall_id: product.mall_id.clone(),
        status: product.product_order_status.clone(),
        quantity: product.quantity,
        payment_amount: product.total_payment_amount.round() as i64,
        payment_timestamp: order.payment_date.clone(),
        delivered_date: (!delivered.is_empty()).then(|| delivered.to_string()),
    }
}

/// Derives the per-line option columns and category quantities.
#[derive(Debug, Clone)]
pub struct LineMapper {
    classifier: CategoryClassifier,
}

impl LineMapper {
    pub fn new(classifier: CategoryClassifier) -> Self {
        Self { classifier }
    }

    pub fn to_order_line(&self, item: RawLineItem, range_date: NaiveDate) -> OrderLine {
        let parsed = parse(&item.option_raw_text);
        let option_fields = resolve_fields(&parsed);
        let categories = self.classifier.classify(
            &item.product_id,
            &item.product_name,
            &parsed,
            item.quantity,
        );

        OrderLine {
            item,
            option_fields,
            option_details: parsed.display,
            categories,
            range_date: range_date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierConfig;
    use crate::models::{Category, OrdersPage};
    use serde_json::json;

    fn entry(value: serde_json::Value) -> ProductOrderEntry {
        let page = OrdersPage::from_json(&json!({"data": {"contents": [value]}}));
        page.contents.into_iter().next().unwrap()
    }

    #[test]
    fn maps_entry_fields() {
        let item = to_raw_line_item(&entry(json!({
            "productOrderId": "outer",
            "content": {
                "order": { "orderId": "O1", "ordererName": "김하나", "ordererId": "u1",
                           "ordererNo": "77", "paymentDate": "2025-02-08T09:15:00.0+09:00" },
                "productOrder": { "productOrderId": "P1", "productId": 12325205237i64,
                                  "productName": "콤보", "productOption": "상품선택: 마리오",
                                  "productOrderStatus": "PAYED", "quantity": 1,
                                  "totalPaymentAmount": 89999.6 },
                "delivery": { "deliveredDate": "2025-02-09T10:00:00.0+09:00" }
            }
        })));

        assert_eq!(item.product_order_id, "P1");
        assert_eq!(item.order_id, "O1");
        assert_eq!(item.buyer_id(), "u1");
        assert_eq!(item.payment_amount, 90000);
        assert_eq!(item.delivered_date.as_deref(), Some("2025-02-09T10:00:00.0+09:00"));
        assert!(!item.is_excluded());
    }

    #[test]
    fn falls_back_to_outer_product_order_id_and_buyer_no() {
        let item = to_raw_line_item(&entry(json!({
            "productOrderId": "outer",
            "content": { "order": { "ordererNo": "77" } }
        })));
        assert_eq!(item.product_order_id, "outer");
        assert_eq!(item.buyer_id(), "77");
        assert_eq!(item.delivered_date, None);
    }

    #[test]
    fn cancel_and_return_statuses_are_excluded() {
        for status in ["CANCELED", "cancelled", "CANCEL_DONE", "RETURNED", "Return_Request"] {
            let item = RawLineItem { status: status.to_string(), ..RawLineItem::default() };
            assert!(item.is_excluded(), "{status} should be excluded");
        }
        let item = RawLineItem { status: "DELIVERED".to_string(), ..RawLineItem::default() };
        assert!(!item.is_excluded());
    }

    #[test]
    fn order_line_carries_fields_and_categories() {
        let mapper = LineMapper::new(CategoryClassifier::new(&ClassifierConfig::default()));
        let item = RawLineItem {
            product_id: "12325205237".to_string(),
            option_raw_text: "출국일/시간 (체크박스): 2025-02-10 14:30 / 상품선택: 해리포터 지팡이".to_string(),
            quantity: 2,
            ..RawLineItem::default()
        };
        let day = NaiveDate::from_ymd_opt(2025, 2, 8).unwrap();
        let line = mapper.to_order_line(item, day);

        assert_eq!(line.option_fields.departure, "2025-02-10 14:30");
        assert_eq!(line.option_details.len(), 2);
        assert_eq!(line.categories.get(Category::HarryPotterWand), 2);
        assert_eq!(line.range_date, "2025-02-08");
    }
}
