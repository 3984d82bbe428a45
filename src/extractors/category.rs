use crate::config::{ClassifierConfig, FallbackPolicy};
use crate::extractors::option::product_choice;
use crate::models::{Category, CategoryTotals, ParsedOption};

const DYSON_ITEM_LABEL: &str = "다이슨 대여품목";

/// Maps a line item to the rental categories it counts toward.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    combo_product_id: String,
    dyson_product_id: String,
    trike_product_id: String,
    fallback_policy: FallbackPolicy,
}

impl CategoryClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            combo_product_id: config.combo_product_id.clone(),
            dyson_product_id: config.dyson_product_id.clone(),
            trike_product_id: config.trike_product_id.clone(),
            fallback_policy: config.fallback_policy,
        }
    }

    pub fn classify(
        &self,
        product_id: &str,
        product_name: &str,
        options: &ParsedOption,
        quantity: i64,
    ) -> CategoryTotals {
        let quantity = effective_quantity(quantity);
        let choice = product_choice(options).to_lowercase();
        let mut totals = CategoryTotals::new();

        if product_id == self.combo_product_id {
            let text = if choice.is_empty() {
                product_name.to_lowercase()
            } else {
                choice
            };
            if text.contains("마리오") {
                totals.assign(Category::MarioPowerUpBand, quantity);
            }
            if text.contains("해리포터") || text.contains("지팡이") {
                totals.assign(Category::HarryPotterWand, quantity);
            }
        } else if product_id == self.dyson_product_id {
            if let Some(category) = dyson_variant(options) {
                totals.assign(category, quantity);
            }
        } else if product_id == self.trike_product_id {
            totals.assign(Category::Trike, quantity);
        } else {
            let haystack = format!("{product_name} {choice}").to_lowercase();
            self.classify_by_keywords(&haystack, quantity, &mut totals);
        }

        totals
    }

    fn classify_by_keywords(&self, haystack: &str, quantity: u32, totals: &mut CategoryTotals) {
        for category in Category::ALL {
            let matched = category
                .keywords()
                .iter()
                .any(|keyword| haystack.contains(&keyword.to_lowercase()));
            if matched {
                totals.assign(category, quantity);
                if self.fallback_policy == FallbackPolicy::FirstMatch {
                    return;
                }
            }
        }

        if !totals.contains(Category::MarioPowerUpBand) && haystack.contains("파워업밴드") {
            totals.assign(Category::MarioPowerUpBand, quantity);
        }
    }
}

/// A line without an explicit count still represents one unit.
fn effective_quantity(quantity: i64) -> u32 {
    if quantity <= 0 {
        1
    } else {
        u32::try_from(quantity).unwrap_or(u32::MAX)
    }
}

/// Picks exactly one Dyson variant from the "다이슨 대여품목" option value.
fn dyson_variant(options: &ParsedOption) -> Option<Category> {
    let item = options
        .display
        .iter()
        .find(|entry| entry.label.contains(DYSON_ITEM_LABEL))?
        .value
        .to_lowercase();

    let dryer = item.contains("슈퍼소닉") || item.contains("드라이기");
    if item.contains("1)") && item.contains("에어랩") {
        Some(Category::DysonAirwrap)
    } else if item.contains("2)") && dryer {
        Some(Category::DysonSupersonicNural)
    } else if item.contains("3)") && dryer {
        Some(Category::DysonSupersonicR)
    } else if item.contains("4)") && (item.contains("에어스트레이트") || item.contains("고데기")) {
        Some(Category::DysonAirstrait)
    } else {
        None
    }
}
