//! Human-readable summaries over structured product and analytics data.
//!
//! Prompt construction is deterministic and pure; the provider call is a
//! stateless pass-through to whichever text-generation backend is
//! configured (OpenAI preferred, then Anthropic), falling back to fixed
//! templated text when neither is available or the call fails. Generation
//! never errors; availability is advisory via [`InsightHealth`].

use thiserror::Error;

mod prompts;
mod service;

pub use prompts::{
    analysis_prompt, insights_prompt, mock_analysis, mock_insights, AnalysisKind, InsightKind,
};
pub use service::{InsightHealth, InsightService};

/// Errors surfaced by service construction. Generation itself never errors.
#[derive(Debug, Error)]
pub enum InsightError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
