use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// One element of `data.contents` in the product-orders response.
#[derive(Debug, Deserialize, Default)]
pub struct ProductOrderEntry {
    #[serde(rename = "productOrderId", default, deserialize_with = "lenient_string")]
    pub product_order_id: String,
    #[serde(default)]
    pub content: EntryContent,
}

#[derive(Debug, Deserialize, Default)]
pub struct EntryContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub order: OrderInfo,
    #[serde(rename = "productOrder", default, deserialize_with = "null_as_default")]
    pub product_order: ProductOrderInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub delivery: DeliveryInfo,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub order_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub orderer_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub orderer_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub orderer_no: String,
    #[serde(deserialize_with = "lenient_string")]
    pub orderer_tel: String,
    #[serde(deserialize_with = "lenient_string")]
    pub payment_date: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductOrderInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub product_order_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub product_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub product_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub product_option: String,
    #[serde(deserialize_with = "lenient_string")]
    pub product_order_status: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub quantity: i64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_payment_amount: f64,
    #[serde(deserialize_with = "lenient_string")]
    pub mall_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub option_code: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub delivered_date: String,
}

/// The line items of one response page plus whether another page follows.
#[derive(Debug, Default)]
pub struct OrdersPage {
    pub contents: Vec<ProductOrderEntry>,
    pub has_next: bool,
}

impl OrdersPage {
    /// Reads `data.contents` and `data.pagination.hasNext`. A missing or non-array
    /// `contents` is an empty page; entries that do not deserialize are skipped.
    pub fn from_json(body: &Value) -> Self {
        let data = body.get("data");
        let contents = match data.and_then(|d| d.get("contents")) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match serde_json::from_value(item.clone()) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(error = %e, "Skipping malformed order entry");
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        let has_next = data
            .and_then(|d| d.get("pagination"))
            .and_then(|p| p.get("hasNext"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Self { contents, has_next }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ids arrive as numbers or strings depending on the endpoint version.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .unwrap_or_else(|| n.as_f64().map(|f| f as i64).unwrap_or(0)),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}
