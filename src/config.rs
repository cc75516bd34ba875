use crate::errors::{CotacoesError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const B3_URL: &str =
    "https://www.b3.com.br/pt_br/market-data-e-indices/servicos-de-dados/market-data/cotacoes/outros-ativos.htm";
pub const DEFAULT_INPUT: &str = "data/B3Acoes.xlsx";
pub const DEFAULT_OUTPUT: &str = "outputs/resultados.xlsx";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
pub const PLACEHOLDER: &str = "______";

/// CSS selectors of the quote page. The page is owned by B3 and may change
/// without notice, so every selector can be overridden.
#[derive(Debug, Clone)]
pub struct PageSelectors {
    pub search_input: String,
    pub price: String,
    pub variation: String,
    pub date: String,
    pub time: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            search_input: "#txtCampoPesquisa".to_string(),
            price: "#cotacaoAtivo".to_string(),
            variation: "#oscilacaoAtivo".to_string(),
            date: "#dataConsulta".to_string(),
            time: "#horaConsulta".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub debug_mode: bool,
    pub headless: bool,
    pub url: String,
    pub webdriver_url: String,
    /// Driver binary to spawn; when unset, `webdriver_url` must already be listening.
    pub chromedriver_path: Option<PathBuf>,
    pub timeout: Duration,
    pub navigation_timeout: Duration,
    pub poll_interval: Duration,
    pub max_tries: usize,
    pub retry_backoff: Duration,
    pub symbol_pause: Duration,
    pub overlay_pause: Duration,
    pub overlay_selectors: Vec<String>,
    pub selectors: PageSelectors,
    pub placeholder: String,
    pub symbol_column: String,
    pub output_path: PathBuf,
    pub enriched_path: Option<PathBuf>,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            headless: false,
            url: B3_URL.to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            chromedriver_path: None,
            timeout: Duration::from_millis(5000),
            navigation_timeout: Duration::from_millis(30_000),
            poll_interval: Duration::from_millis(250),
            max_tries: 2,
            retry_backoff: Duration::from_secs(2),
            symbol_pause: Duration::from_secs(3),
            overlay_pause: Duration::from_millis(500),
            overlay_selectors: vec![
                "#onetrust-close-btn-container button".to_string(),
                "#onetrust-close-btn-container".to_string(),
                r#"button[aria-label="Fechar"]"#.to_string(),
                ".btn-close".to_string(),
            ],
            selectors: PageSelectors::default(),
            placeholder: PLACEHOLDER.to_string(),
            symbol_column: "Símbolo".to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            enriched_path: None,
            log_dir: PathBuf::from("logs"),
        }
    }

    /// Defaults overlaid with `TIMEOUT`, `NAVIGATION_TIMEOUT`, `WEBDRIVER_URL`
    /// and `CHROMEDRIVER` from the environment or a `.env` file.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::new();
        if let Ok(value) = std::env::var("TIMEOUT") {
            config.timeout = parse_millis("TIMEOUT", &value)?;
        }
        if let Ok(value) = std::env::var("NAVIGATION_TIMEOUT") {
            config.navigation_timeout = parse_millis("NAVIGATION_TIMEOUT", &value)?;
        }
        if let Ok(url) = std::env::var("WEBDRIVER_URL") {
            config.webdriver_url = url;
        }
        if let Ok(path) = std::env::var("CHROMEDRIVER") {
            config.chromedriver_path = Some(PathBuf::from(path));
        }
        Ok(config)
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_webdriver_url(mut self, url: &str) -> Self {
        self.webdriver_url = url.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_symbol_pause(mut self, pause: Duration) -> Self {
        self.symbol_pause = pause;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_enriched_path(mut self, path: Option<PathBuf>) -> Self {
        self.enriched_path = path;
        self
    }
}

fn parse_millis(name: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| {
            CotacoesError::ConfigError(format!(
                "{} must be milliseconds, got {:?}: {}",
                name, value, e
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_quote_page() {
        let config = Config::new();
        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert_eq!(config.max_tries, 2);
        assert_eq!(config.placeholder, "______");
        assert_eq!(config.selectors.price, "#cotacaoAtivo");
        assert_eq!(config.overlay_selectors[0], "#onetrust-close-btn-container button");
    }

    #[test]
    fn parses_timeout_override() {
        assert_eq!(parse_millis("TIMEOUT", " 12000 ").unwrap(), Duration::from_millis(12000));
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = parse_millis("TIMEOUT", "5s").unwrap_err();
        assert!(matches!(err, CotacoesError::ConfigError(msg) if msg.contains("TIMEOUT")));
    }

    #[test]
    fn builders_override_defaults() {
        let config = Config::new()
            .with_headless(true)
            .with_max_tries(4)
            .with_output_path("out/x.xlsx");
        assert!(config.headless);
        assert_eq!(config.max_tries, 4);
        assert_eq!(config.output_path, PathBuf::from("out/x.xlsx"));
    }
}
