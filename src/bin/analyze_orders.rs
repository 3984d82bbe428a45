use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rental_orders::config::Settings;
use rental_orders::naver_source;
use rental_orders::services::{render_summary, resolve_range, summarize_options, OrderSource};
use rental_orders::utils::time::today_kst;

/// How often each product/option combination was ordered in a date range.
#[derive(Debug, Parser)]
#[command(name = "analyze_orders")]
struct Args {
    /// First day, YYYY-MM-DD.
    #[arg(long)]
    from: String,

    /// Last day, YYYY-MM-DD.
    #[arg(long)]
    to: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (from, to) = resolve_range(Some(&args.from), Some(&args.to), today_kst())?;

    let settings = Settings::new()?;
    let source = naver_source(&settings)?;

    let items: Vec<_> = source
        .fetch_days(from, to)
        .await?
        .into_iter()
        .flat_map(|batch| batch.items)
        .collect();

    let summaries = summarize_options(&items);
    info!(
        line_items = items.len(),
        combinations = summaries.len(),
        "Option summary built"
    );
    print!("{}", render_summary(&summaries));
    Ok(())
}
