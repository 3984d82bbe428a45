use std::sync::Arc;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};
use crate::clients::HttpClient;
use crate::config::NaverConfig;
use crate::error::{Error, Result};
use crate::extractors::to_raw_line_item;
use crate::models::{OrdersPage, RawLineItem};
use crate::services::token::{AccessToken, TokenClient};
use crate::utils::retry::{retry_with_backoff, RetryPolicy};
use crate::utils::time::{day_bounds, days_inclusive};

/// Line items fetched for one calendar day.
#[derive(Debug, Clone)]
pub struct DayBatch {
    pub day: NaiveDate,
    pub items: Vec<RawLineItem>,
}

/// Where a report run gets its line items from.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Non-excluded line items for every day in `from..=to`, in day order.
    async fn fetch_days(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DayBatch>>;
}

/// Pulls product orders day by day, with rate-limit backoff per request.
pub struct OrderFetcher {
    http: Arc<HttpClient>,
    orders_url: String,
    range_type: String,
    page_size: u32,
    max_pages: u32,
    retry: RetryPolicy,
}

impl OrderFetcher {
    pub fn new(http: Arc<HttpClient>, settings: &NaverConfig, retry: RetryPolicy) -> Self {
        Self {
            http,
            orders_url: settings.orders_url.clone(),
            range_type: settings.range_type.clone(),
            page_size: settings.page_size,
            max_pages: settings.max_pages.max(1),
            retry,
        }
    }

    pub async fn fetch_range(
        &self,
        token: &AccessToken,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawLineItem>> {
        let batches = self.fetch_days(token, from, to).await?;
        Ok(batches.into_iter().flat_map(|batch| batch.items).collect())
    }

    pub async fn fetch_days(
        &self,
        token: &AccessToken,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DayBatch>> {
        let mut batches = Vec::new();
        for day in days_inclusive(from, to) {
            let items = self.fetch_day(token, day).await?;
            batches.push(DayBatch { day, items });
        }
        Ok(batches)
    }

    /// All pages for `day`; cancelled and returned lines are dropped.
    pub async fn fetch_day(&self, token: &AccessToken, day: NaiveDate) -> Result<Vec<RawLineItem>> {
        let (from_iso, to_iso) = day_bounds(day);
        let mut items = Vec::new();
        let mut excluded = 0usize;
        let mut page = 1u32;

        loop {
            if page > self.max_pages {
                return Err(Error::PaginationLimit {
                    day: day.to_string(),
                    max_pages: self.max_pages,
                });
            }

            let query = [
                ("from", from_iso.clone()),
                ("to", to_iso.clone()),
                ("rangeType", self.range_type.clone()),
                ("size", self.page_size.to_string()),
                ("page", page.to_string()),
            ];

            let body = retry_with_backoff(self.retry, || {
                self.http.get_json(&self.orders_url, &token.value, &query)
            })
            .await?;

            let batch = OrdersPage::from_json(&body);
            debug!(
                day = %day,
                page = page,
                entries = batch.contents.len(),
                has_next = batch.has_next,
                "Fetched orders page"
            );

            for entry in &batch.contents {
                let item = to_raw_line_item(entry);
                if item.is_excluded() {
                    excluded += 1;
                    continue;
                }
                items.push(item);
            }

            if !batch.has_next || batch.contents.is_empty() {
                break;
            }
            page += 1;
        }

        info!(
            day = %day,
            pages = page,
            line_items = items.len(),
            excluded = excluded,
            "Fetched orders for day"
        );

        Ok(items)
    }
}

/// The live marketplace: one token per run, then a day-by-day fetch.
pub struct NaverOrderSource {
    tokens: TokenClient,
    fetcher: OrderFetcher,
}

impl NaverOrderSource {
    pub fn new(tokens: TokenClient, fetcher: OrderFetcher) -> Self {
        Self { tokens, fetcher }
    }
}

#[async_trait]
impl OrderSource for NaverOrderSource {
    async fn fetch_days(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DayBatch>> {
        let token = self.tokens.request_access_token().await?;
        self.fetcher.fetch_days(&token, from, to).await
    }
}
