//! Interaction layer for Sentilytics.
//!
//! Adapters that talk to remote AI services on behalf of the orchestration layer.

pub mod gemini_analysis_service;
pub mod prompts;
pub mod response;

pub use gemini_analysis_service::GeminiAnalysisService;
