use serde::Serialize;

/// One successful lookup on the quote page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchResult {
    pub symbol: String,
    #[serde(rename = "preco")]
    pub price: String,
    #[serde(rename = "oscilacao")]
    pub variation: String,
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "hora")]
    pub time: String,
}

/// A row of the input sheet. The four result fields are only ever set
/// together, through [`SymbolRow::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolRow {
    pub symbol: String,
    price: Option<String>,
    variation: Option<String>,
    date: Option<String>,
    time: Option<String>,
}

impl SymbolRow {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.trim().to_string(),
            price: None,
            variation: None,
            date: None,
            time: None,
        }
    }

    pub fn apply(&mut self, result: &FetchResult) {
        self.price = Some(result.price.clone());
        self.variation = Some(result.variation.clone());
        self.date = Some(result.date.clone());
        self.time = Some(result.time.clone());
    }

    pub fn is_fetched(&self) -> bool {
        self.price.is_some()
    }

    pub fn price(&self) -> Option<&str> {
        self.price.as_deref()
    }

    pub fn variation(&self) -> Option<&str> {
        self.variation.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }
}

/// Outcome of one automation run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub requested: usize,
    pub results: Vec<FetchResult>,
    pub skipped: Vec<String>,
    pub output_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(symbol: &str) -> FetchResult {
        FetchResult {
            symbol: symbol.to_string(),
            price: "38,50".to_string(),
            variation: "+1,20%".to_string(),
            date: "2024-03-15".to_string(),
            time: "17:05".to_string(),
        }
    }

    #[test]
    fn new_row_is_trimmed_and_empty() {
        let row = SymbolRow::new(" PETR4 ");
        assert_eq!(row.symbol, "PETR4");
        assert!(!row.is_fetched());
        assert_eq!(row.date(), None);
    }

    #[test]
    fn apply_sets_all_fields() {
        let mut row = SymbolRow::new("PETR4");
        row.apply(&result("PETR4"));
        assert_eq!(row.price(), Some("38,50"));
        assert_eq!(row.variation(), Some("+1,20%"));
        assert_eq!(row.date(), Some("2024-03-15"));
        assert_eq!(row.time(), Some("17:05"));
    }

    #[test]
    fn result_serializes_with_output_column_names() {
        let json = serde_json::to_value(result("VALE3")).unwrap();
        assert_eq!(json["preco"], "38,50");
        assert_eq!(json["hora"], "17:05");
    }
}
