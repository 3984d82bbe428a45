use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rental_orders::config::Settings;
use rental_orders::report_service;
use rental_orders::storage::{render_html, to_json_string, HtmlSnapshot, JsonWriter};
use rental_orders::utils::time::today_kst;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Html,
    Json,
}

/// Reconciled rental orders for a date range.
#[derive(Debug, Parser)]
#[command(name = "orders_report")]
struct Args {
    /// First day, YYYY-MM-DD. Defaults to today (UTC+9).
    #[arg(long)]
    from: Option<String>,

    /// Last day, YYYY-MM-DD. Defaults to --from.
    #[arg(long)]
    to: Option<String>,

    #[arg(long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Print the report without writing it under the output directory.
    #[arg(long)]
    no_save: bool,
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
    let settings = Settings::new()?;
    let service = report_service(&settings)?;

    let report = service
        .run(args.from.as_deref(), args.to.as_deref(), today_kst())
        .await;

    match args.format {
        Format::Json => {
            if !args.no_save {
                let writer = JsonWriter::new(&settings.report.output_dir).await?;
                writer.write_report(&settings.report.json_file, &report).await?;
            }
            println!("{}", to_json_string(&report)?);
        }
        Format::Html => {
            let html = render_html(&report);
            if !args.no_save {
                let snapshot = HtmlSnapshot::new(
                    &settings.report.output_dir,
                    &settings.report.snapshot_file,
                );
                snapshot.save(&html).await?;
            }
            println!("{html}");
        }
    }

    if let Some(error) = &report.error {
        info!(error = %error, "Report finished with an error");
        std::process::exit(1);
    }

    info!(
        line_items = report.total_order_count,
        groups = report.grouped_count,
        total_amount = report.total_amount,
        "Report complete"
    );
    Ok(())
}
