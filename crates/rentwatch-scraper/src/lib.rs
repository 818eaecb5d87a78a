pub mod diagnose;
pub mod error;
pub mod evaluate;
pub mod executor;
pub mod fetch;
pub mod sweep;

pub use diagnose::{diagnose_selector, SelectorDiagnosis, SelectorMatch};
pub use error::FetchError;
pub use evaluate::{evaluate, evaluate_with_threshold, SelectorEvaluation, CONFIDENCE_THRESHOLD};
pub use executor::ScrapeExecutor;
pub use fetch::{ContentFetcher, FetchedPage, ProxyConfig};
pub use sweep::{run_sweep, SweepEntry};
