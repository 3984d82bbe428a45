use chrono::NaiveDate;
use tracing::{error, info, warn};
use crate::error::{Error, Result};
use crate::extractors::LineMapper;
use crate::models::{OrderLine, Report};
use crate::services::grouper::OrderGrouper;
use crate::services::orders::OrderSource;
use crate::utils::time::{day_bounds, parse_ymd};

/// Validates a raw `from`/`to` pair. `from` defaults to `today`, `to` to `from`.
pub fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    let from = match from.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_ymd(raw)
            .ok_or_else(|| Error::Validation(format!("invalid from date '{raw}', expected YYYY-MM-DD")))?,
        None => today,
    };

    let to = match to.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_ymd(raw)
            .ok_or_else(|| Error::Validation(format!("invalid to date '{raw}', expected YYYY-MM-DD")))?,
        None => from,
    };

    if to < from {
        return Err(Error::Validation(format!(
            "to date {to} is earlier than from date {from}"
        )));
    }

    Ok((from, to))
}

/// Runs one reconciliation: fetch, map, group, total.
pub struct ReportService<S> {
    source: S,
    mapper: LineMapper,
    grouper: OrderGrouper,
}

impl<S: OrderSource> ReportService<S> {
    pub fn new(source: S, mapper: LineMapper) -> Self {
        Self {
            source,
            mapper,
            grouper: OrderGrouper::new(),
        }
    }

    /// Failures of any stage land in `Report::error` instead of propagating.
    pub async fn run(&self, from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Report {
        let (from, to) = match resolve_range(from, to, today) {
            Ok(range) => range,
            Err(e) => {
                warn!(error = %e, "Rejected report range");
                return Report::failed(
                    from.unwrap_or_default().to_string(),
                    to.unwrap_or_default().to_string(),
                    e.to_string(),
                );
            }
        };

        let (from_iso, _) = day_bounds(from);
        let (_, to_iso) = day_bounds(to);

        match self.build(from, to).await {
            Ok(mut report) => {
                report.from = from_iso;
                report.to = to_iso;
                report
            }
            Err(e) => {
                error!(error = %e, from = %from, to = %to, "Report run failed");
                Report::failed(from_iso, to_iso, e.to_string())
            }
        }
    }

    async fn build(&self, from: NaiveDate, to: NaiveDate) -> Result<Report> {
        let batches = self.source.fetch_days(from, to).await?;

        let orders: Vec<OrderLine> = batches
            .into_iter()
            .flat_map(|batch| {
                let day = batch.day;
                batch
                    .items
                    .into_iter()
                    .map(move |item| (day, item))
            })
            .map(|(day, item)| self.mapper.to_order_line(item, day))
            .collect();

        let grouped_rows = self.grouper.group(&orders);
        let total_amount: i64 = orders.iter().map(|line| line.item.payment_amount).sum();

        info!(
            from = %from,
            to = %to,
            line_items = orders.len(),
            groups = grouped_rows.len(),
            total_amount = total_amount,
            "Report built"
        );

        Ok(Report {
            total_order_count: orders.len(),
            grouped_count: grouped_rows.len(),
            total_amount,
            orders,
            grouped_rows,
            ..Report::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use async_trait::async_trait;
    use crate::config::ClassifierConfig;
    use crate::extractors::CategoryClassifier;
    use crate::models::RawLineItem;
    use crate::services::orders::DayBatch;

    fn date(raw: &str) -> NaiveDate {
        parse_ymd(raw).unwrap()
    }

    struct FakeSource {
        batches: Vec<DayBatch>,
        fail: bool,
        requested: Mutex<Vec<(NaiveDate, NaiveDate)>>,
    }

    impl FakeSource {
        fn new(batches: Vec<DayBatch>) -> Self {
            Self { batches, fail: false, requested: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl OrderSource for FakeSource {
        async fn fetch_days(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DayBatch>> {
            self.requested.lock().unwrap().push((from, to));
            if self.fail {
                return Err(Error::Auth("HTTP 401: invalid client".to_string()));
            }
            Ok(self.batches.clone())
        }
    }

    fn service(source: FakeSource) -> ReportService<FakeSource> {
        let mapper = LineMapper::new(CategoryClassifier::new(&ClassifierConfig::default()));
        ReportService::new(source, mapper)
    }

    fn line(id: &str, buyer: &str, amount: i64) -> RawLineItem {
        RawLineItem {
            product_order_id: id.to_string(),
            buyer_login_id: buyer.to_string(),
            buyer_name: buyer.to_uppercase(),
            payment_timestamp: "2025-02-08T09:15:00+09:00".to_string(),
            payment_amount: amount,
            ..RawLineItem::default()
        }
    }

    #[test]
    fn range_defaults_and_validation() {
        let today = date("2025-02-08");
        assert_eq!(resolve_range(None, None, today).unwrap(), (today, today));
        assert_eq!(
            resolve_range(Some("2025-02-01"), None, today).unwrap(),
            (date("2025-02-01"), date("2025-02-01"))
        );
        assert_eq!(
            resolve_range(Some("2025-02-01"), Some(""), today).unwrap(),
            (date("2025-02-01"), date("2025-02-01"))
        );
        assert!(matches!(
            resolve_range(Some("2025-02-10"), Some("2025-02-01"), today),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            resolve_range(Some("2025-2-1"), None, today),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            resolve_range(Some("2025-02-30"), None, today),
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn builds_report_from_source_batches() {
        let source = FakeSource::new(vec![
            DayBatch {
                day: date("2025-02-08"),
                items: vec![line("P1", "u1", 90_000), line("P2", "u1", 13_000)],
            },
            DayBatch {
                day: date("2025-02-09"),
                items: vec![line("P3", "u2", 5_000)],
            },
        ]);
        let service = service(source);

        let report = service.run(Some("2025-02-08"), Some("2025-02-09"), date("2025-03-01")).await;

        assert_eq!(report.error, None);
        assert_eq!(report.from, "2025-02-08T00:00:00.000+09:00");
        assert_eq!(report.to, "2025-02-09T23:59:59.999+09:00");
        assert_eq!(report.total_order_count, 3);
        assert_eq!(report.grouped_count, 2);
        assert_eq!(report.total_amount, 108_000);
        assert_eq!(report.orders[2].range_date, "2025-02-09");
        assert_eq!(report.grouped_rows[0].amount_sum, 103_000);
        assert_eq!(
            *service.source.requested.lock().unwrap(),
            vec![(date("2025-02-08"), date("2025-02-09"))]
        );
    }

    #[tokio::test]
    async fn invalid_range_is_reported_without_fetching() {
        let service = service(FakeSource::new(Vec::new()));

        let report = service.run(Some("2025-02-10"), Some("2025-02-01"), date("2025-03-01")).await;

        assert!(report.error.unwrap().contains("earlier"));
        assert_eq!(report.from, "2025-02-10");
        assert!(report.grouped_rows.is_empty());
        assert!(service.source.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn source_failure_becomes_report_error() {
        let mut source = FakeSource::new(Vec::new());
        source.fail = true;
        let service = service(source);

        let report = service.run(None, None, date("2025-02-08")).await;

        assert!(report.error.unwrap().contains("401"));
        assert_eq!(report.from, "2025-02-08T00:00:00.000+09:00");
        assert_eq!(report.total_order_count, 0);
    }

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let report = Report::failed("a".into(), "b".into(), "boom".into());
        let json = serde_json::to_value(&report).unwrap();
        for key in ["from", "to", "totalOrderCount", "groupedCount", "totalAmount", "orders", "groupedRows", "error"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
