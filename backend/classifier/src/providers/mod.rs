pub mod mock;
pub mod openai;

use std::sync::Arc;

use docket_config::ChatSettings;
use docket_core::LlmProvider;

pub use openai::{ChatCompletionsProvider, ChatFlavor};

/// Azure OpenAI when an API version is configured, otherwise an
/// OpenAI-compatible endpoint.
pub fn build_provider(chat: &ChatSettings) -> Arc<dyn LlmProvider> {
    match &chat.api_version {
        Some(version) => Arc::new(ChatCompletionsProvider::azure(
            chat.endpoint.clone(),
            chat.api_key.clone(),
            version.clone(),
        )),
        None => Arc::new(ChatCompletionsProvider::openai_compatible(
            chat.endpoint.clone(),
            chat.api_key.clone(),
        )),
    }
}
