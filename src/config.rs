use serde::Deserialize;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, FileFormat};
use tracing::debug;

const DEFAULT_CONFIG_FILE: &str = "config/default.yaml";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub naver: NaverConfig,
    pub retry: RetryConfig,
    pub classifier: ClassifierConfig,
    pub report: ReportConfig,
}

#[derive(Deserialize, Clone)]
pub struct NaverConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub orders_url: String,
    pub range_type: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub timeout_secs: u64,
}

// Hand-written so the secret never reaches a log line.
impl std::fmt::Debug for NaverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaverConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .field("orders_url", &self.orders_url)
            .field("range_type", &self.range_type)
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub jitter_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    pub combo_product_id: String,
    pub dyson_product_id: String,
    pub trike_product_id: String,
    pub fallback_policy: FallbackPolicy,
}

/// How the keyword fallback treats a line item that matches several categories.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Every category with a matching keyword receives the quantity.
    #[default]
    AllMatches,
    /// Only the first matching category (in column order) receives the quantity.
    FirstMatch,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    pub output_dir: String,
    pub snapshot_file: String,
    pub json_file: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            combo_product_id: "12325205237".to_string(),
            dyson_product_id: "12418009319".to_string(),
            trike_product_id: "12418025840".to_string(),
            fallback_policy: FallbackPolicy::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 2000,
            jitter_ms: 0,
        }
    }
}

impl Settings {
    /// Loads defaults, then `config/default.yaml` if present, then `APP__*` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        Self::build(builder)
    }

    /// Loads defaults overlaid with an inline YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(config::File::from_str(yaml, FileFormat::Yaml));
        Self::build(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let classifier = ClassifierConfig::default();

        Config::builder()
            .set_default(
                "naver.token_url",
                "https://api.commerce.naver.com/external/v1/oauth2/token",
            )?
            .set_default(
                "naver.orders_url",
                "https://api.commerce.naver.com/external/v1/pay-order/seller/product-orders",
            )?
            .set_default("naver.range_type", "PAYED_DATETIME")?
            .set_default("naver.page_size", 300)?
            .set_default("naver.max_pages", 20)?
            .set_default("naver.timeout_secs", 30)?
            .set_default("retry.max_attempts", 5)?
            .set_default("retry.base_delay_ms", 2000)?
            .set_default("retry.jitter_ms", 0)?
            .set_default("classifier.combo_product_id", classifier.combo_product_id)?
            .set_default("classifier.dyson_product_id", classifier.dyson_product_id)?
            .set_default("classifier.trike_product_id", classifier.trike_product_id)?
            .set_default("classifier.fallback_policy", "all_matches")?
            .set_default("report.output_dir", "data")?
            .set_default("report.snapshot_file", "orders_result.html")?
            .set_default("report.json_file", "orders_result.json")
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;

        if settings.naver.client_id.trim().is_empty() {
            return Err(ConfigError::Message("naver.client_id must not be empty".to_string()));
        }
        if settings.retry.max_attempts == 0 {
            return Err(ConfigError::Message("retry.max_attempts must be at least 1".to_string()));
        }

        debug!(
            naver = ?settings.naver,
            retry = ?settings.retry,
            classifier = ?settings.classifier,
            "Loaded settings"
        );

        Ok(settings)
    }
}
