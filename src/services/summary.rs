use std::collections::{BTreeMap, HashMap};
use crate::extractors::option::parse;
use crate::models::{OptionSummary, RawLineItem};

/// Counts how often each product/option combination was ordered, most frequent first.
pub fn summarize_options(items: &[RawLineItem]) -> Vec<OptionSummary> {
    let mut counts: HashMap<(String, String, String, BTreeMap<String, String>), OptionSummary> =
        HashMap::new();

    for item in items {
        let parsed_option: BTreeMap<String, String> = parse(&item.option_raw_text)
            .display
            .into_iter()
            .map(|entry| (entry.label, entry.value))
            .collect();

        let key = (
            item.product_id.clone(),
            item.product_name.clone(),
            item.option_code.clone(),
            parsed_option.clone(),
        );

        counts
            .entry(key)
            .or_insert_with(|| OptionSummary {
                product_id: item.product_id.clone(),
                product_name: item.product_name.clone(),
                option_code: item.option_code.clone(),
                parsed_option,
                option_raw: item.option_raw_text.clone(),
                count: 0,
            })
            .count += 1;
    }

    let mut summaries: Vec<OptionSummary> = counts.into_values().collect();
    summaries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.product_id.cmp(&b.product_id))
            .then_with(|| a.option_code.cmp(&b.option_code))
            .then_with(|| a.option_raw.cmp(&b.option_raw))
    });
    summaries
}

/// Plain-text block per combination, separated by a dashed rule.
pub fn render_summary(summaries: &[OptionSummary]) -> String {
    let mut out = String::new();
    for summary in summaries {
        let parsed = serde_json::to_string(&summary.parsed_option).unwrap_or_default();
        out.push_str(&format!("COUNT: {}\n", summary.count));
        out.push_str(&format!("productId: {}\n", summary.product_id));
        out.push_str(&format!("productName: {}\n", summary.product_name));
        out.push_str(&format!("optionCode: {}\n", summary.option_code));
        out.push_str(&format!("parsedOption: {parsed}\n"));
        out.push_str(&format!("optionRaw: {}\n", summary.option_raw));
        out.push_str(&"-".repeat(60));
        out.push('\n');
    }
    out
}
