// Public modules for library use
pub mod models;
pub mod errors;
pub mod logging;

// Used by the binaries; not meant as library API
#[doc(hidden)]
pub mod scrapers;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod services;
#[doc(hidden)]
pub mod util;

// Re-export the common types
pub use models::quote::{FetchResult, RunReport, SymbolRow};
pub use config::Config;
pub use errors::{Result, CotacoesError};
pub use scrapers::b3::QuoteRetriever;
pub use services::quote_service::QuoteService;
