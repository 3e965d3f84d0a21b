//! AI Integration
//!
//! Completion provider abstraction and prompt construction. The rest of the
//! pipeline treats this module as optional: when no provider is configured,
//! or a completion fails, the deterministic detector takes over.

pub mod prompt;
pub mod provider;

pub use provider::{
    CompletionProvider, OllamaProvider, OpenAiProvider, ProviderConfig, SharedProvider,
    create_provider,
};
