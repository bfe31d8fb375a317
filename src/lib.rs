pub mod chat;
pub mod config;
pub mod dataset;
pub mod filters;
pub mod intent;
pub mod llm;
pub mod normalize;
pub mod resolver;
pub mod search;
pub mod summary;

// Re-export primary types for convenience
pub use chat::engine::ChatEngine;
pub use chat::{ConversationState, PropertyCard, Role, Turn};
pub use config::AssistantConfig;
pub use dataset::{PropertyRecord, PropertyStore};
pub use filters::{FilterSet, FilterUpdate};
pub use intent::{Intent, IntentClassifier, KeywordIntentClassifier};
pub use llm::{ArgValue, GeminiProvider, NluProvider};
pub use resolver::FilterResolver;
pub use summary::Summarizer;

// Re-export common types
pub use anyhow::{Error, Result};
pub use uuid::Uuid;
