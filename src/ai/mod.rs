pub mod client;
pub mod generator;

// Public API exports
pub use client::{API_KEY_ENV, DEFAULT_MODEL, ModelConfig, OpenRouterClient, api_key_present};
pub use generator::{ContentProvider, GenerationError, OpenRouterProvider, parse_generated};
