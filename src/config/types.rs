use crate::model::ProgramDescriptor;
use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub site: SiteConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "program")]
    pub programs: Vec<ProgramConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of connector pages fetched at once
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Delay each worker waits after a fetch (milliseconds)
    #[serde(rename = "politeness-delay-ms", default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Overall run deadline (seconds); in-flight work is cancelled when hit
    #[serde(rename = "run-deadline-secs", default)]
    pub run_deadline_secs: Option<u64>,

    /// Only crawl the first N connector links of each program
    #[serde(rename = "max-connectors", default)]
    pub max_connectors: Option<usize>,

    /// Drop repeated navigation links
    #[serde(rename = "dedupe-links", default)]
    pub dedupe_links: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            politeness_delay_ms: default_politeness_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            run_deadline_secs: None,
            max_connectors: None,
            dedupe_links: false,
        }
    }
}

/// Request identity headers
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// The site rejects default client identifiers, so this is always sent
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept")]
    pub accept: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept: default_accept(),
        }
    }
}

/// Documentation site location
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host of the documentation site
    #[serde(rename = "root-url")]
    pub root_url: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives one JSON document per program
    pub directory: String,

    /// Optional markdown run summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

/// One program to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramConfig {
    pub model: String,

    #[serde(rename = "prog-id")]
    pub prog_id: String,

    pub sop: String,

    #[serde(rename = "build-information", default)]
    pub build_information: Vec<String>,

    /// Any connector page of the program; its sidebar lists all the others
    #[serde(rename = "entry-catalog", default = "default_entry_catalog")]
    pub entry_catalog: String,
}

impl ProgramConfig {
    /// The static descriptor carried into the output document
    pub fn descriptor(&self) -> ProgramDescriptor {
        ProgramDescriptor {
            model: self.model.clone(),
            program_id: self.prog_id.clone(),
            stage_tag: self.sop.clone(),
            build_info: self.build_information.clone(),
        }
    }
}

fn default_max_concurrency() -> usize {
    8
}

fn default_politeness_delay_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "curl/8.7.1".to_string()
}

fn default_accept() -> String {
    "*/*".to_string()
}

fn default_entry_catalog() -> String {
    "g011".to_string()
}
