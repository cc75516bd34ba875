use crate::config::Config;
use crate::errors::{CotacoesError, Result};
use crate::models::quote::FetchResult;
use crate::scrapers::base::{BrowserError, ErrorKind, QuotePage};
use crate::util;
use log::{debug, error, info, warn};

/// Quote lookup on the B3 "outros ativos" page.
///
/// Owns the page for the whole run: one navigation, then one search per
/// symbol, strictly in sequence since the page keeps single-page-app state.
pub struct QuoteRetriever<P: QuotePage> {
    page: P,
    config: Config,
}

impl<P: QuotePage> QuoteRetriever<P> {
    pub fn new(page: P, config: Config) -> Self {
        Self { page, config }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Load the quote page and wait for the search box to show up
    pub async fn navigate(&self) -> Result<()> {
        info!("Opening {}", self.config.url);
        self.page
            .goto(&self.config.url, self.config.navigation_timeout)
            .await
            .map_err(|e| CotacoesError::NavigationError(format!("{}: {}", self.config.url, e)))?;

        let search = &self.config.selectors.search_input;
        let ready = util::wait_until(
            self.config.navigation_timeout,
            self.config.poll_interval,
            || async move { matches!(self.page.locate(search).await, Ok(Some(_))) },
        )
        .await;

        if !ready {
            return Err(CotacoesError::NavigationError(format!(
                "search input {} never appeared on {}",
                search, self.config.url
            )));
        }
        Ok(())
    }

    /// Close the cookie banner if one is showing. Never fails.
    pub async fn dismiss_overlay(&self) {
        for selector in &self.config.overlay_selectors {
            let element = match self.page.locate(selector).await {
                Ok(Some(element)) => element,
                Ok(None) => continue,
                Err(e) => {
                    debug!("Banner lookup {} failed: {}", selector, e);
                    continue;
                }
            };

            match element.is_visible().await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    debug!("Banner visibility {} failed: {}", selector, e);
                    continue;
                }
            }

            match element.click().await {
                Ok(()) => {
                    info!("Cookie banner closed ({})", selector);
                    // banner slides out before the page is usable
                    tokio::time::sleep(self.config.overlay_pause).await;
                    return;
                }
                Err(e) => warn!("Error closing cookie banner {}: {}", selector, e),
            }
        }
        debug!("No cookie banner to close");
    }

    async fn field_text(&self, selector: &str) -> Option<String> {
        match self.page.locate(selector).await {
            Ok(Some(element)) => element
                .text_content(self.config.poll_interval)
                .await
                .ok()
                .map(|text| text.trim().to_string()),
            _ => None,
        }
    }

    /// What the four quote fields currently show
    async fn displayed(&self) -> Vec<Option<String>> {
        let selectors = &self.config.selectors;
        let mut shown = Vec::with_capacity(4);
        for selector in [&selectors.price, &selectors.variation, &selectors.date, &selectors.time] {
            shown.push(self.field_text(selector).await);
        }
        shown
    }

    // The page does not always reset the fields between searches, so a real
    // price is not enough: something must have changed since `before`.
    async fn quote_loaded(&self, before: &[Option<String>]) -> bool {
        let now = self.displayed().await;
        let priced = match now.first() {
            Some(Some(price)) => !price.is_empty() && *price != self.config.placeholder,
            _ => false,
        };
        priced && now != before
    }

    async fn read_field(&self, selector: &str) -> String {
        let text = match self.page.locate(selector).await {
            Ok(Some(element)) => element.text_content(self.config.timeout).await,
            Ok(None) => Err(BrowserError::new(ErrorKind::NotFound, selector)),
            Err(e) => Err(e),
        };
        match text {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => self.config.placeholder.clone(),
            Err(e) => {
                debug!("Field {} unreadable: {}", selector, e);
                self.config.placeholder.clone()
            }
        }
    }

    /// Search one symbol and read its quote. Any field that cannot be read
    /// comes back as the placeholder.
    pub async fn fetch_one(&self, symbol: &str) -> Result<FetchResult> {
        let selectors = &self.config.selectors;
        let timeout = self.config.timeout;

        let before = self.displayed().await;
        let submitted = async {
            self.page.fill(&selectors.search_input, symbol, timeout).await?;
            self.page.press_enter(&selectors.search_input, timeout).await?;
            Ok::<(), BrowserError>(())
        };
        if let Err(e) = submitted.await {
            error!("Failed to search {}: {}", symbol, e);
            return Err(CotacoesError::DataNotLoaded(symbol.to_string()));
        }

        let interval = self.config.poll_interval;
        if !util::wait_until(timeout, interval, || self.quote_loaded(&before)).await {
            error!("Timeout waiting for quote of {}", symbol);
            return Err(CotacoesError::DataNotLoaded(symbol.to_string()));
        }

        let result = FetchResult {
            symbol: symbol.to_string(),
            price: self.read_field(&selectors.price).await,
            variation: self.read_field(&selectors.variation).await,
            date: util::normalize_date(&self.read_field(&selectors.date).await),
            time: self.read_field(&selectors.time).await,
        };
        info!(
            "Data collected for {}: price {}, variation {}, date {}, time {}",
            result.symbol, result.price, result.variation, result.date, result.time
        );
        Ok(result)
    }

    /// `fetch_one` with backoff between attempts; `None` once attempts run out
    pub async fn fetch_with_retry(&self, symbol: &str) -> Option<FetchResult> {
        let max_tries = self.config.max_tries;
        for attempt in 1..=max_tries {
            match self.fetch_one(symbol).await {
                Ok(result) => return Some(result),
                Err(e) if attempt < max_tries => {
                    let backoff = self.config.retry_backoff * attempt as u32;
                    debug!(
                        "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                        attempt, max_tries, symbol, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(_) => {}
            }
        }
        warn!("Giving up on {} after {} attempts", symbol, max_tries);
        None
    }

    /// Query every symbol in order. Symbols that never load are left out.
    pub async fn run(&self, symbols: &[String]) -> Vec<FetchResult> {
        let mut results = Vec::with_capacity(symbols.len());
        let mut queried = false;
        for (i, symbol) in symbols.iter().enumerate() {
            if symbol.trim().is_empty() {
                warn!("Skipping row {} without a symbol", i + 1);
                continue;
            }
            if queried {
                // pacing so the remote page is not hammered
                tokio::time::sleep(self.config.symbol_pause).await;
            }
            queried = true;

            info!("Fetching data for: {}", symbol);
            if let Some(result) = self.fetch_with_retry(symbol).await {
                results.push(result);
            }
        }
        results
    }

    /// Release the browser. Safe to call more than once.
    pub async fn close(&mut self) {
        match self.page.close().await {
            Ok(()) => info!("Browser closed"),
            Err(e) if e.kind == ErrorKind::SessionClosed => debug!("Browser already closed"),
            Err(e) => error!("Unexpected error while closing: {}", e),
        }
    }
}
