//! Rajska Requester
//!
//! Automates submission of the Rajska library e-resource access request
//! form for a small batch of users, driving a remote Chrome instance over
//! the DevTools protocol. The form is published monthly; an external
//! trigger invokes the batch through the web endpoint.

pub mod browser;
pub mod form;
pub mod service;
pub mod web;
pub mod workflow;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use browser::{CdpDriverFactory, DriverFactory};
use form::{RecordSource, StaticRecords, UserRecord};
use workflow::WorkflowConfig;

/// Application configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// DevTools address of the remote browser: `host:port` or a full
    /// `ws://` URL.
    pub remote_browser_addr: String,

    /// Library news/status page checked for reachability.
    pub news_url: String,
    /// Page carrying the link that opens the request form.
    pub form_page_url: String,

    /// Availability poll budget (number of landmark lookups).
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,
    /// Seconds between availability attempts.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Directory screenshots are written to (defaults under the data dir).
    #[serde(default)]
    pub screenshot_dir: Option<String>,

    /// Users to submit the form for, in order.
    #[serde(default)]
    pub records: Vec<UserRecord>,
}

fn default_poll_max_attempts() -> u32 {
    24
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote_browser_addr: "localhost:9222".to_string(),
            news_url: "https://www.rajska.info/aktualnosci".to_string(),
            form_page_url: "https://www.rajska.info/pobierz-kody-kolejne-platformy-czekaja"
                .to_string(),
            poll_max_attempts: default_poll_max_attempts(),
            poll_interval_secs: default_poll_interval_secs(),
            screenshot_dir: None,
            records: vec![],
        }
    }
}

/// Get log directory path (shared across modules)
pub fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("rajska-requester").join("logs"))
}

impl AppConfig {
    /// Get config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rajska-requester").join("config.json"))
    }

    /// Load config from file
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(content) => match serde_json::from_str(&content) {
                        Ok(config) => {
                            info!("Loaded config from {:?}", path);
                            return config;
                        }
                        Err(e) => {
                            warn!("Failed to parse config file: {}", e);
                        }
                    },
                    Err(e) => {
                        warn!("Failed to read config file: {}", e);
                    }
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    error!("Failed to create config directory: {}", e);
                    return;
                }
            }

            match serde_json::to_string_pretty(self) {
                Ok(content) => {
                    if let Err(e) = std::fs::write(&path, content) {
                        error!("Failed to save config: {}", e);
                    } else {
                        info!("Config saved to {:?}", path);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize config: {}", e);
                }
            }
        }
    }

    /// Workflow view of this configuration.
    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            news_url: self.news_url.clone(),
            form_page_url: self.form_page_url.clone(),
            poll_max_attempts: self.poll_max_attempts,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }

    /// Directory screenshots are written to.
    pub fn screenshot_path(&self) -> PathBuf {
        self.screenshot_dir
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| {
                dirs::data_dir().map(|p| p.join("rajska-requester").join("screenshots"))
            })
            .unwrap_or_else(|| PathBuf::from("screenshots"))
    }
}

/// Application state shared across the app
pub struct AppState {
    /// Application configuration
    pub config: Arc<RwLock<AppConfig>>,
    /// Creates one fresh browser session per workflow run
    pub driver_factory: Arc<dyn DriverFactory>,
    /// Ordered source of the user records the batch processes
    pub records: Arc<dyn RecordSource>,
    /// Single-flight guard: one batch at a time
    pub is_running: Arc<AtomicBool>,
}

impl AppState {
    /// Create application state with the saved configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::load())
    }

    /// Create application state from the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        let driver_factory = Arc::new(CdpDriverFactory::new(
            config.remote_browser_addr.clone(),
            config.screenshot_path(),
        ));
        let records = Arc::new(StaticRecords::new(config.records.clone()));
        Self::with_parts(config, driver_factory, records)
    }

    /// Wire state from explicit collaborators. The factory and record
    /// source are injected here so tests can substitute fakes.
    pub fn with_parts(
        config: AppConfig,
        driver_factory: Arc<dyn DriverFactory>,
        records: Arc<dyn RecordSource>,
    ) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            driver_factory,
            records,
            is_running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize logging (console plus a daily-rolling file when available)
pub fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    if let Some(log_dir) = log_dir() {
        let _ = std::fs::create_dir_all(&log_dir);
        let file_appender = tracing_appender::rolling::daily(&log_dir, "rajska-requester.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_poll_budget_is_twenty_four_by_five_seconds() {
        let config = AppConfig::default();
        assert_eq!(config.poll_max_attempts, 24);
        assert_eq!(config.poll_interval_secs, 5);
    }

    #[test]
    fn test_workflow_config_carries_interval_as_duration() {
        let config = AppConfig {
            poll_interval_secs: 7,
            ..AppConfig::default()
        };
        assert_eq!(
            config.workflow_config().poll_interval,
            Duration::from_secs(7)
        );
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = AppConfig {
            records: vec![UserRecord {
                name: "Anna".into(),
                library_card_number: "213721".into(),
                email: "example@gmail.com".into(),
                resource_type: form::ResourceType::EmpikGo,
            }],
            ..AppConfig::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("remoteBrowserAddr"));
        assert!(json.contains("libraryCardNumber"));

        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.records, config.records);
    }

    #[test]
    fn test_explicit_screenshot_dir_wins() {
        let config = AppConfig {
            screenshot_dir: Some("/tmp/shots".into()),
            ..AppConfig::default()
        };
        assert_eq!(config.screenshot_path(), PathBuf::from("/tmp/shots"));
    }
}
