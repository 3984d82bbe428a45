//! Order reconciliation for a rental marketplace storefront.
//!
//! Fetches product-order line items from the commerce API one day at a time,
//! parses their free-text options, classifies them into rental categories and
//! groups them into logical customer orders with mismatch flags.

pub mod clients;
pub mod config;
pub mod error;
pub mod extractors;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

use std::sync::Arc;
use rquest_util::Emulation;
use crate::clients::HttpClient;
use crate::config::Settings;
use crate::error::Result;
use crate::extractors::{CategoryClassifier, LineMapper};
use crate::services::{NaverOrderSource, OrderFetcher, ReportService, TokenClient};
use crate::utils::RetryPolicy;

pub use error::Error;

/// The live order source: one shared HTTP client for token and order calls.
pub fn naver_source(settings: &Settings) -> Result<NaverOrderSource> {
    let http = Arc::new(HttpClient::new(&settings.naver, Emulation::Chrome133)?);
    let tokens = TokenClient::new(Arc::clone(&http), &settings.naver);
    let fetcher = OrderFetcher::new(http, &settings.naver, RetryPolicy::from(&settings.retry));
    Ok(NaverOrderSource::new(tokens, fetcher))
}

/// A report service wired against the live marketplace.
pub fn report_service(settings: &Settings) -> Result<ReportService<NaverOrderSource>> {
    let mapper = LineMapper::new(CategoryClassifier::new(&settings.classifier));
    Ok(ReportService::new(naver_source(settings)?, mapper))
}
