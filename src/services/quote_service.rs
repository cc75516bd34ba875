use crate::config::Config;
use crate::errors::Result;
use crate::models::quote::{FetchResult, RunReport, SymbolRow};
use crate::scrapers::b3::QuoteRetriever;
use crate::scrapers::base::QuotePage;
use crate::scrapers::webdriver::WebDriverPage;
use crate::util::excel_utils;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::future::Future;
use std::path::Path;

/// Runs one automation: load symbols, query the quote page, save results.
pub struct QuoteService {
    config: Config,
}

impl QuoteService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Full run against a real browser
    pub async fn execute(&self, input: &Path) -> Result<RunReport> {
        self.execute_with(input, || WebDriverPage::open(&self.config)).await
    }

    /// Full run with the page produced by `open`. The page is only opened once
    /// the input is known to be valid, and is always closed before returning.
    pub async fn execute_with<P, F, Fut>(&self, input: &Path, open: F) -> Result<RunReport>
    where
        P: QuotePage,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        let mut rows = excel_utils::load_symbols(input, &self.config.symbol_column)?;
        let symbols = unique_symbols(&rows);
        info!("Starting automation for {} symbols from {}", symbols.len(), input.display());

        let page = open().await?;
        let mut retriever = QuoteRetriever::new(page, self.config.clone());
        let outcome = Self::collect(&retriever, &symbols).await;
        retriever.close().await;
        let results = outcome?;

        merge_results(&mut rows, &results);
        excel_utils::save_results(&results, &self.config.output_path)?;
        if let Some(path) = &self.config.enriched_path {
            excel_utils::save_enriched(&rows, path)?;
        }

        let fetched: HashSet<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        let skipped = symbols
            .iter()
            .filter(|s| !fetched.contains(s.as_str()))
            .cloned()
            .collect();
        let report = RunReport {
            requested: symbols.len(),
            results,
            skipped,
            output_path: self.config.output_path.display().to_string(),
        };
        debug!("Run summary: {}", serde_json::to_string(&report)?);
        Ok(report)
    }

    async fn collect<P: QuotePage>(
        retriever: &QuoteRetriever<P>,
        symbols: &[String],
    ) -> Result<Vec<FetchResult>> {
        retriever.navigate().await?;
        retriever.dismiss_overlay().await;
        Ok(retriever.run(symbols).await)
    }
}

/// Symbols in sheet order, each once, blanks dropped
fn unique_symbols(rows: &[SymbolRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut symbols = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if row.symbol.is_empty() {
            warn!("Row {} has no symbol, skipping", i + 2);
        } else if seen.insert(row.symbol.as_str()) {
            symbols.push(row.symbol.clone());
        } else {
            debug!("Duplicate symbol {} on row {}", row.symbol, i + 2);
        }
    }
    symbols
}

fn merge_results(rows: &mut [SymbolRow], results: &[FetchResult]) {
    for row in rows.iter_mut() {
        if let Some(result) = results.iter().find(|r| r.symbol == row.symbol) {
            row.apply(result);
        }
    }
}
