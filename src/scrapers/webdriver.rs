use crate::config::Config;
use crate::errors::{CotacoesError, Result};
use crate::scrapers::base::{BrowserError, BrowserResult, ElementHandle, ErrorKind, QuotePage};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::{Client, ClientBuilder, Locator};
use log::{debug, error, info};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::Instant;

// WebDriver code point for the Enter key
const ENTER: &str = "\u{e007}";
const CONNECT_RETRY: Duration = Duration::from_millis(250);

fn classify(err: &CmdError) -> ErrorKind {
    if err.is_no_such_element() {
        return ErrorKind::NotFound;
    }
    match err {
        CmdError::WaitTimeout => ErrorKind::Timeout,
        CmdError::Lost(_) => ErrorKind::SessionClosed,
        CmdError::Standard(wd) => match wd.error {
            ErrorStatus::Timeout | ErrorStatus::ScriptTimeout => ErrorKind::Timeout,
            ErrorStatus::InvalidSessionId | ErrorStatus::NoSuchWindow => ErrorKind::SessionClosed,
            ErrorStatus::StaleElementReference => ErrorKind::NotFound,
            _ => ErrorKind::Other,
        },
        _ => ErrorKind::Other,
    }
}

fn browser_error(what: &str, err: CmdError) -> BrowserError {
    BrowserError::new(classify(&err), format!("{}: {}", what, err))
}

/// Chrome capabilities. Headless runs get a fixed 1920x1080 window since
/// there is no screen to maximize to.
pub fn capabilities(headless: bool) -> Map<String, Value> {
    let mut args = vec!["--start-maximized", "--window-position=0,0", "--disable-infobars"];
    if headless {
        args.push("--headless=new");
        args.push("--window-size=1920,1080");
    }

    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

/// Port of a `http://host:port` WebDriver URL, 4444 when none is given
pub fn driver_port(url: &str) -> u16 {
    url.trim_end_matches('/')
        .rsplit(':')
        .next()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(4444)
}

struct WebDriverElement(Element);

#[async_trait]
impl ElementHandle for WebDriverElement {
    async fn is_visible(&self) -> BrowserResult<bool> {
        self.0
            .is_displayed()
            .await
            .map_err(|e| browser_error("visibility check", e))
    }

    async fn click(&self) -> BrowserResult<()> {
        self.0.click().await.map_err(|e| browser_error("click", e))
    }

    async fn text_content(&self, timeout: Duration) -> BrowserResult<String> {
        match tokio::time::timeout(timeout, self.0.text()).await {
            Ok(text) => text.map_err(|e| browser_error("read text", e)),
            Err(_) => Err(BrowserError::timeout("read text", timeout)),
        }
    }
}

/// Chrome driven over WebDriver. Owns the driver process when it spawned one.
pub struct WebDriverPage {
    client: Option<Client>,
    driver: Option<Child>,
}

impl WebDriverPage {
    pub async fn open(config: &Config) -> Result<Self> {
        let (driver, patience) = match &config.chromedriver_path {
            Some(path) => (
                Some(spawn_driver(path, driver_port(&config.webdriver_url))?),
                config.navigation_timeout,
            ),
            None => (None, Duration::ZERO),
        };

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities(config.headless));

        let deadline = Instant::now() + patience;
        let client = loop {
            match builder.connect(&config.webdriver_url).await {
                Ok(client) => break client,
                Err(e) if Instant::now() < deadline => {
                    debug!("WebDriver not ready at {}: {}", config.webdriver_url, e);
                    tokio::time::sleep(CONNECT_RETRY).await;
                }
                Err(e) => {
                    return Err(CotacoesError::SessionError(format!(
                        "cannot start browser via {}: {}",
                        config.webdriver_url, e
                    )))
                }
            }
        };

        info!(
            "Browser ready ({})",
            if config.headless { "headless" } else { "maximized" }
        );
        Ok(Self {
            client: Some(client),
            driver,
        })
    }

    fn client(&self) -> BrowserResult<&Client> {
        self.client.as_ref().ok_or_else(BrowserError::closed)
    }
}

fn spawn_driver(path: &Path, port: u16) -> Result<Child> {
    info!("Starting {} on port {}", path.display(), port);
    Command::new(path)
        .arg(format!("--port={}", port))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| CotacoesError::SessionError(format!("cannot start {}: {}", path.display(), e)))
}

fn log_close_fault(resource: &str, err: &BrowserError) {
    if err.kind == ErrorKind::SessionClosed {
        debug!("{} already closed: {}", resource, err);
    } else {
        error!("Unexpected error closing {}: {}", resource, err);
    }
}

#[async_trait]
impl QuotePage for WebDriverPage {
    async fn goto(&self, url: &str, timeout: Duration) -> BrowserResult<()> {
        let client = self.client()?;
        match tokio::time::timeout(timeout, client.goto(url)).await {
            Ok(loaded) => loaded.map_err(|e| browser_error("navigation", e)),
            Err(_) => Err(BrowserError::timeout("navigation", timeout)),
        }
    }

    async fn locate(&self, selector: &str) -> BrowserResult<Option<Box<dyn ElementHandle>>> {
        let found = self
            .client()?
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| browser_error(selector, e))?;
        Ok(found
            .into_iter()
            .next()
            .map(|element| Box::new(WebDriverElement(element)) as Box<dyn ElementHandle>))
    }

    async fn fill(&self, selector: &str, text: &str, timeout: Duration) -> BrowserResult<()> {
        let client = self.client()?;
        let typing = async {
            let input = client.find(Locator::Css(selector)).await?;
            input.clear().await?;
            input.send_keys(text).await?;
            Ok::<(), CmdError>(())
        };
        match tokio::time::timeout(timeout, typing).await {
            Ok(done) => done.map_err(|e| browser_error(selector, e)),
            Err(_) => Err(BrowserError::timeout("fill", timeout)),
        }
    }

    async fn press_enter(&self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        let client = self.client()?;
        let pressing = async {
            let input = client.find(Locator::Css(selector)).await?;
            input.send_keys(ENTER).await?;
            Ok::<(), CmdError>(())
        };
        match tokio::time::timeout(timeout, pressing).await {
            Ok(done) => done.map_err(|e| browser_error(selector, e)),
            Err(_) => Err(BrowserError::timeout("press Enter", timeout)),
        }
    }

    async fn close(&mut self) -> BrowserResult<()> {
        let client = self.client.take().ok_or_else(BrowserError::closed)?;

        if let Err(e) = client.close_window().await {
            log_close_fault("page", &browser_error("close window", e));
        }
        if let Err(e) = client.close().await {
            log_close_fault("browser", &browser_error("end session", e));
        }
        if let Some(mut driver) = self.driver.take() {
            match driver.kill().await {
                Ok(()) => debug!("WebDriver process stopped"),
                Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {
                    debug!("WebDriver process already exited")
                }
                Err(e) => error!("Unexpected error stopping WebDriver process: {}", e),
            }
        }
        Ok(())
    }
}
