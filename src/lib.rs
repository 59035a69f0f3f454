pub mod analysis;
pub mod clients;
pub mod config;
pub mod contract;
pub mod error;
pub mod highlight;
pub mod http;
pub mod logging;
pub mod prompts;
pub mod report;
pub mod trend;

pub use analysis::{AnalysisOrchestrator, validate_reply};
pub use config::Config;
pub use contract::{AnalysisResult, Language, ResponseContract, StressLevel, StressfulKeyword};
pub use error::{AnalysisError, StressLensError};
pub use highlight::{HighlightSegment, IntensityTier, highlight};
pub use report::ReportRenderer;
pub use trend::{TREND_WINDOW, TrendTracker};
