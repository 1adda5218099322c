//! LLM adapters for scouting narratives
//!
//! The model only rewrites a recommendation the rules already made into prose.
//! It never picks players or changes scores.
//!
//! - `llm`: `LlmClient` plus OpenAI and Ollama HTTP clients with retries
//! - `prompt`: the recommendation prompt
//! - `guardrails`: output checks before text is cached
//! - `runtime`: `LlmNarrativeGenerator`, the core `NarrativeGenerator` adapter

pub mod guardrails;
pub mod llm;
pub mod prompt;
pub mod runtime;

pub use llm::{client_from_config, LlmClient};
pub use runtime::LlmNarrativeGenerator;
