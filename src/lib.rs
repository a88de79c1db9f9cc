// Voice Bot Backend - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod error;
pub mod faq;
pub mod intent;
pub mod processor;
pub mod store;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use error::{BotError, Result};
pub use faq::{best_match, keyword_score, parse_keywords, FaqMatch};
pub use intent::{Intent, IntentDetector, IntentRule, DEFAULT_RULES};
pub use processor::{QueryProcessor, QueryRequest, QueryResponse};
pub use store::{
    Faq, KnowledgeStore, MemoryStore, SeedReport, SqliteStore, StoreStats, UserAccount,
};

/// Library version, reported by `GET /`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the `tracing` subscriber used by both binaries.
///
/// `RUST_LOG` wins when set; otherwise `voice_bot=info` plus tower-http request spans.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voice_bot=info,voice_bot_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
