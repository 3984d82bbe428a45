use std::collections::BTreeMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Rental categories tracked as report columns, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    MarioPowerUpBand,
    HarryPotterWand,
    DysonAirwrap,
    DysonSupersonicNural,
    DysonSupersonicR,
    DysonAirstrait,
    Trike,
    Lafa,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::MarioPowerUpBand,
        Category::HarryPotterWand,
        Category::DysonAirwrap,
        Category::DysonSupersonicNural,
        Category::DysonSupersonicR,
        Category::DysonAirstrait,
        Category::Trike,
        Category::Lafa,
    ];

    /// Column title as shown to staff.
    pub fn label(self) -> &'static str {
        match self {
            Category::MarioPowerUpBand => "마리오파워업밴드",
            Category::HarryPotterWand => "해리포터지팡이",
            Category::DysonAirwrap => "다이슨-1) 에어랩",
            Category::DysonSupersonicNural => "다이슨-2) 슈퍼소닉뉴럴샤인 드라이기",
            Category::DysonSupersonicR => "다이슨-3) 슈퍼소닉r 드라이기",
            Category::DysonAirstrait => "다이슨-4) 에어스트레이트 고데기",
            Category::Trike => "트라이크",
            Category::Lafa => "라파",
        }
    }

    /// Substrings that identify the category in free text. Dyson variants are
    /// only ever assigned through their dedicated product rule.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::MarioPowerUpBand => &["마리오파워업밴드", "마리오 파워업밴드", "마리오파워업댄드"],
            Category::HarryPotterWand => &["해리포터", "지팡이"],
            Category::Trike => &["트라이크"],
            Category::Lafa => &["라파", "라운지 키", "라운지키"],
            _ => &[],
        }
    }
}

/// Quantity per category. Serializes as `{label: quantity}` for non-zero entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTotals(BTreeMap<Category, u32>);

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> u32 {
        self.0.get(&category).copied().unwrap_or(0)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.get(category) > 0
    }

    /// Sets `quantity` unless the category already has one; a line item never
    /// counts twice toward the same category.
    pub fn assign(&mut self, category: Category, quantity: u32) {
        if quantity > 0 {
            self.0.entry(category).or_insert(quantity);
        }
    }

    pub fn add(&mut self, category: Category, quantity: u32) {
        if quantity > 0 {
            let total = self.0.entry(category).or_insert(0);
            *total = total.saturating_add(quantity);
        }
    }

    pub fn merge(&mut self, other: &CategoryTotals) {
        for (category, quantity) in other.iter() {
            self.add(category, quantity);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        self.0.iter().map(|(c, q)| (*c, *q))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cell text for a report column: the quantity, or empty when zero.
    pub fn display(&self, category: Category) -> String {
        match self.get(category) {
            0 => String::new(),
            n => n.to_string(),
        }
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, quantity) in &self.0 {
            map.serialize_entry(category.label(), quantity)?;
        }
        map.end()
    }
}
