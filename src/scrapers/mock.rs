//! In-memory stand-in for the quote page, driven by fixtures per symbol.

use crate::config::{PageSelectors, PLACEHOLDER};
use crate::scrapers::base::{BrowserError, BrowserResult, ElementHandle, ErrorKind, QuotePage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MockQuote {
    pub price: Option<String>,
    pub variation: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    /// Searches that keep showing the placeholder before the quote appears
    pub failures: usize,
}

impl MockQuote {
    pub fn new(price: &str, variation: &str, date: &str, time: &str) -> Self {
        Self {
            price: Some(price.to_string()),
            variation: Some(variation.to_string()),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            failures: 0,
        }
    }

    pub fn failing(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Banner {
    visible: bool,
    broken: bool,
}

#[derive(Default)]
struct MockState {
    quotes: HashMap<String, MockQuote>,
    banners: HashMap<String, Banner>,
    typed: String,
    shown: Option<MockQuote>,
    searches: HashMap<String, usize>,
    clicks: Vec<String>,
    visited: Vec<String>,
    close_calls: usize,
    closed: bool,
    no_search_input: bool,
    navigation_fails: bool,
    keeps_stale_quote: bool,
}

#[derive(Clone, Default)]
pub struct MockPage {
    state: Arc<Mutex<MockState>>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn with_quote(self, symbol: &str, quote: MockQuote) -> Self {
        self.update(|s| {
            s.quotes.insert(symbol.to_string(), quote);
        })
    }

    pub fn with_banner(self, selector: &str, visible: bool) -> Self {
        self.update(|s| {
            s.banners.insert(selector.to_string(), Banner { visible, broken: false });
        })
    }

    pub fn with_broken_banner(self, selector: &str) -> Self {
        self.update(|s| {
            s.banners.insert(selector.to_string(), Banner { visible: true, broken: true });
        })
    }

    pub fn without_search_input(self) -> Self {
        self.update(|s| s.no_search_input = true)
    }

    pub fn failing_navigation(self) -> Self {
        self.update(|s| s.navigation_fails = true)
    }

    /// A search that does not load leaves the previous quote on screen
    /// instead of resetting the fields to the placeholder.
    pub fn keeping_stale_quote(self) -> Self {
        self.update(|s| s.keeps_stale_quote = true)
    }

    pub fn searches(&self, symbol: &str) -> usize {
        self.state.lock().unwrap().searches.get(symbol).copied().unwrap_or(0)
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn ensure_open(&self) -> BrowserResult<()> {
        if self.is_closed() {
            Err(BrowserError::closed())
        } else {
            Ok(())
        }
    }
}

struct MockElement {
    selector: String,
    text: Option<String>,
    banner: Option<Banner>,
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl ElementHandle for MockElement {
    async fn is_visible(&self) -> BrowserResult<bool> {
        Ok(self.banner.map(|b| b.visible).unwrap_or(true))
    }

    async fn click(&self) -> BrowserResult<()> {
        if self.banner.map(|b| b.broken).unwrap_or(false) {
            return Err(BrowserError::new(ErrorKind::Other, "element click intercepted"));
        }
        self.state.lock().unwrap().clicks.push(self.selector.clone());
        Ok(())
    }

    async fn text_content(&self, _timeout: Duration) -> BrowserResult<String> {
        self.text.clone().ok_or_else(|| {
            BrowserError::new(ErrorKind::Other, format!("{} detached", self.selector))
        })
    }
}

#[async_trait]
impl QuotePage for MockPage {
    async fn goto(&self, url: &str, timeout: Duration) -> BrowserResult<()> {
        self.ensure_open()?;
        let mut state = self.state.lock().unwrap();
        if state.navigation_fails {
            return Err(BrowserError::timeout("navigation", timeout));
        }
        state.visited.push(url.to_string());
        Ok(())
    }

    async fn locate(&self, selector: &str) -> BrowserResult<Option<Box<dyn ElementHandle>>> {
        self.ensure_open()?;
        let selectors = PageSelectors::default();
        let state = self.state.lock().unwrap();

        let shown = state.shown.as_ref();
        // nothing searched yet, or still loading: the page shows the placeholder
        let field = |value: Option<&Option<String>>| match value {
            Some(text) => text.clone(),
            None => Some(PLACEHOLDER.to_string()),
        };
        let (text, banner) = if selector == selectors.search_input {
            if state.no_search_input {
                return Ok(None);
            }
            (Some(state.typed.clone()), None)
        } else if selector == selectors.price {
            (field(shown.map(|q| &q.price)), None)
        } else if selector == selectors.variation {
            (field(shown.map(|q| &q.variation)), None)
        } else if selector == selectors.date {
            (field(shown.map(|q| &q.date)), None)
        } else if selector == selectors.time {
            (field(shown.map(|q| &q.time)), None)
        } else if let Some(banner) = state.banners.get(selector) {
            (None, Some(*banner))
        } else {
            return Ok(None);
        };

        Ok(Some(Box::new(MockElement {
            selector: selector.to_string(),
            text,
            banner,
            state: Arc::clone(&self.state),
        })))
    }

    async fn fill(&self, selector: &str, text: &str, _timeout: Duration) -> BrowserResult<()> {
        self.ensure_open()?;
        let mut state = self.state.lock().unwrap();
        if state.no_search_input {
            return Err(BrowserError::new(ErrorKind::NotFound, selector));
        }
        state.typed = text.to_string();
        Ok(())
    }

    async fn press_enter(&self, _selector: &str, _timeout: Duration) -> BrowserResult<()> {
        self.ensure_open()?;
        let mut state = self.state.lock().unwrap();
        let symbol = state.typed.clone();
        let count = {
            let count = state.searches.entry(symbol.clone()).or_insert(0);
            *count += 1;
            *count
        };
        let shown = state
            .quotes
            .get(&symbol)
            .filter(|quote| count > quote.failures)
            .cloned();
        if shown.is_some() || !state.keeps_stale_quote {
            state.shown = shown;
        }
        Ok(())
    }

    async fn close(&mut self) -> BrowserResult<()> {
        let mut state = self.state.lock().unwrap();
        state.close_calls += 1;
        if state.closed {
            return Err(BrowserError::closed());
        }
        state.closed = true;
        Ok(())
    }
}
