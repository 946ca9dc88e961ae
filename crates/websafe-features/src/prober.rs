//! Content prober: redirect tracking and page markup analysis
//!
//! Probes are read-only network calls with a bounded timeout. The
//! [`probe_redirects`] and [`probe_content`] entry points never fail: any
//! error degrades to the neutral value (0 redirects, no login form, no
//! iframe) so a slow or unreachable host cannot fail a prediction.

use async_trait::async_trait;
use regex::Regex;
use reqwest::{header, redirect, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use websafe_core::{Error, Result};

/// Content-derived signals from a fetched page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSignals {
    /// Any `<input type="password|email">` element present
    pub has_login_form: bool,

    /// Any `<iframe>` element present
    pub has_iframe: bool,
}

/// Network collaborator supplying redirect and content signals
#[async_trait]
pub trait ContentProber: Send + Sync {
    /// Number of redirect hops traversed by a header-only fetch
    async fn count_redirects(&self, url: &str) -> Result<u32>;

    /// Fetch the page and analyze its markup
    async fn fetch_page_signals(&self, url: &str) -> Result<PageSignals>;
}

/// Redirect count with network failures degraded to 0
pub async fn probe_redirects(prober: &dyn ContentProber, url: &str) -> u32 {
    match prober.count_redirects(url).await {
        Ok(hops) => hops,
        Err(e) => {
            warn!("Failed to count redirects for {}: {}", url, e);
            metrics::counter!("websafe_probe_failures_total", "probe" => "redirects").increment(1);
            0
        }
    }
}

/// Page signals with fetch/parse failures degraded to "nothing found"
pub async fn probe_content(prober: &dyn ContentProber, url: &str) -> PageSignals {
    match prober.fetch_page_signals(url).await {
        Ok(signals) => {
            debug!("Page content analyzed for {}: {:?}", url, signals);
            signals
        }
        Err(e) => {
            warn!("Failed to analyze page content for {}: {}", url, e);
            metrics::counter!("websafe_probe_failures_total", "probe" => "content").increment(1);
            PageSignals::default()
        }
    }
}

/// Probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Timeout per probe in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum redirect hops followed
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// User agent sent with probe requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_max_redirects() -> u32 {
    10
}

fn default_user_agent() -> String {
    format!("WebSafe/{}", env!("CARGO_PKG_VERSION"))
}

/// Markup scanner for login inputs and iframes
#[derive(Debug, Clone)]
pub struct MarkupScanner {
    login_input: Regex,
    iframe: Regex,
}

impl MarkupScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            login_input: Regex::new(
                r#"(?i)<input\b[^>]*?\stype\s*=\s*["']?\s*(?:password|email)(?:["'\s/>]|$)"#,
            )
            .map_err(|e| Error::extraction(format!("Failed to compile login input regex: {}", e)))?,
            iframe: Regex::new(r"(?i)<iframe\b")
                .map_err(|e| Error::extraction(format!("Failed to compile iframe regex: {}", e)))?,
        })
    }

    /// Scan markup for login inputs and iframes
    pub fn scan(&self, markup: &str) -> PageSignals {
        PageSignals {
            has_login_form: self.login_input.is_match(markup),
            has_iframe: self.iframe.is_match(markup),
        }
    }
}

/// HTTP implementation of [`ContentProber`] backed by reqwest
pub struct HttpProber {
    /// Client that never follows redirects; hops are counted manually
    redirect_client: Client,

    /// Client for page fetches, follows up to `max_redirects`
    content_client: Client,

    scanner: MarkupScanner,
    config: ProbeConfig,
}

impl HttpProber {
    /// Create a prober with freshly built HTTP clients
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let redirect_client = Self::client_builder(&config)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let content_client = Self::client_builder(&config)
            .redirect(redirect::Policy::limited(config.max_redirects as usize))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            redirect_client,
            content_client,
            scanner: MarkupScanner::new()?,
            config,
        })
    }

    /// Start from a client builder carrying timeout and user agent
    pub fn client_builder(config: &ProbeConfig) -> reqwest::ClientBuilder {
        Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .user_agent(config.user_agent.clone())
    }

    /// Create a prober from pre-built clients.
    ///
    /// `redirect_client` must not follow redirects itself.
    pub fn with_clients(redirect_client: Client, content_client: Client, config: ProbeConfig) -> Result<Self> {
        Ok(Self {
            redirect_client,
            content_client,
            scanner: MarkupScanner::new()?,
            config,
        })
    }

    async fn follow_redirects(&self, url: &str) -> Result<u32> {
        let mut current = Url::parse(url).map_err(|e| Error::probe(format!("{}: {}", url, e)))?;
        let mut hops = 0u32;

        loop {
            let response = self
                .redirect_client
                .head(current.clone())
                .send()
                .await
                .map_err(|e| Error::probe(e.to_string()))?;

            if !response.status().is_redirection() {
                return Ok(hops);
            }

            let Some(location) = response.headers().get(header::LOCATION) else {
                return Ok(hops);
            };

            if hops >= self.config.max_redirects {
                debug!("Redirect limit {} exceeded for {}", self.config.max_redirects, url);
                return Err(Error::probe("too many redirects"));
            }

            let location = location
                .to_str()
                .map_err(|e| Error::probe(format!("invalid Location header: {}", e)))?;

            // Location may be relative to the current hop
            current = current
                .join(location)
                .map_err(|e| Error::probe(format!("invalid redirect target {}: {}", location, e)))?;
            hops += 1;
        }
    }

    async fn fetch_markup(&self, url: &str) -> Result<String> {
        let response = self
            .content_client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::probe(e.to_string()))?;

        response.text().await.map_err(|e| Error::probe(e.to_string()))
    }
}

#[async_trait]
impl ContentProber for HttpProber {
    async fn count_redirects(&self, url: &str) -> Result<u32> {
        tokio::time::timeout(self.config.timeout(), self.follow_redirects(url))
            .await
            .map_err(|_| Error::Timeout)?
    }

    async fn fetch_page_signals(&self, url: &str) -> Result<PageSignals> {
        let markup = tokio::time::timeout(self.config.timeout(), self.fetch_markup(url))
            .await
            .map_err(|_| Error::Timeout)??;

        Ok(self.scanner.scan(&markup))
    }
}
