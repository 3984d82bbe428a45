use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;
use crate::error::Result;
use crate::models::{Category, OrderGroup, Report};

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped text, newlines as `<br>`, wrapped in a marker when `mismatch` is set.
fn cell(text: &str, mismatch: bool) -> String {
    let body = escape(text).replace('\n', "<br>");
    if mismatch {
        format!("<td class=\"mismatch\" title=\"values differ within this order\">{body}</td>")
    } else {
        format!("<td>{body}</td>")
    }
}

fn check(checked: bool) -> &'static str {
    if checked { "<td>✔</td>" } else { "<td></td>" }
}

fn row(out: &mut String, group: &OrderGroup) {
    out.push_str("<tr>");
    out.push_str(&cell(&group.buyer, group.buyer_name_mismatch));
    out.push_str(&cell(&group.buyer_id, group.buyer_id_mismatch));
    out.push_str(&cell(&group.product_name, false));
    out.push_str(&cell(&group.departure_display, group.departure_mismatch));
    out.push_str(&cell(
        &group.return_display,
        group.return_mismatch || group.return_checkbox_mismatch,
    ));
    out.push_str(check(group.damage_checked));
    out.push_str(&cell(&group.detail_confirmation, false));
    for category in Category::ALL {
        out.push_str(&cell(&group.categories.display(category), false));
    }
    out.push_str(&cell(&group.status_display, false));
    out.push_str(&cell(&group.payment_month_day, group.payment_mismatch));
    out.push_str(&cell(&group.delivered_display, false));
    let _ = write!(out, "<td class=\"num\">{}</td>", group.amount_sum);
    let _ = write!(out, "<td class=\"num\">{}</td>", group.order_count);
    out.push_str("</tr>\n");
}

/// Standalone HTML document for a report, one table row per order group.
pub fn render_html(report: &Report) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>주문 리포트</title>\n");
    out.push_str(
        "<style>table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:4px}\
         .mismatch{background:#fdd}.num{text-align:right}.error{color:#b00}</style>\n",
    );
    out.push_str("</head>\n<body>\n");
    let _ = writeln!(
        out,
        "<h1>주문 리포트 {} ~ {}</h1>",
        escape(&report.from),
        escape(&report.to)
    );

    if let Some(error) = &report.error {
        let _ = writeln!(out, "<p class=\"error\">{}</p>", escape(error));
        out.push_str("</body>\n</html>\n");
        return out;
    }

    let _ = writeln!(
        out,
        "<p>주문 {}건 / 묶음 {}건 / 합계 {}원</p>",
        report.total_order_count, report.grouped_count, report.total_amount
    );

    out.push_str("<table>\n<thead><tr>");
    let mut headers = vec!["구매자", "구매자ID", "상품명", "출국일", "귀국일", "파손확인", "약관동의"];
    headers.extend(Category::ALL.iter().map(|c| c.label()));
    headers.extend(["상태", "결제일", "배송완료일", "결제금액", "주문수"]);
    for header in headers {
        let _ = write!(out, "<th>{}</th>", escape(header));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for group in &report.grouped_rows {
        row(&mut out, group);
    }

    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}

/// Persists the rendered report as a static file.
pub struct HtmlSnapshot {
    path: PathBuf,
}

impl HtmlSnapshot {
    pub fn new(output_dir: impl AsRef<Path>, filename: &str) -> Self {
        Self {
            path: output_dir.as_ref().join(filename),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn save(&self, html: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, html).await?;
        info!(path = %self.path.display(), bytes = html.len(), "HTML snapshot saved");
        Ok(())
    }
}
