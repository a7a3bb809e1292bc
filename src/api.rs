use std::collections::HashMap;

use strum::IntoEnumIterator;

use crate::{error::StartvalResult, evaluator, llm, search};

pub use crate::{
    category::Category,
    evaluator::{EvaluateOptions, Evaluation, Evaluator, build_prompt},
    llm::{
        CONFIG_OPTION_KEYS, ChatCompletionEvent, ChatCompletionOptions, ChatCompletionStream,
        ChatMessage, Config, ConfigOutcome, Protocol, Role, provider::ChatProvider,
        provider::open_ai::OpenAiProvider,
    },
    record::{EvaluationRecord, ResponseFormat},
    report::{Recommendation, Report},
    score::{FallbackRange, ScoreMap, score_record, score_value},
    search::{SnippetSource, WebSearch},
};

/// Evaluate a company against the configured LLM and the default search page.
///
/// Fails only when the LLM configuration is unusable, e.g. no API key.
pub async fn evaluate(company_name: &str, options: &EvaluateOptions) -> StartvalResult<Evaluation> {
    let config = Config::load()?;

    let evaluator = evaluator::Evaluator::new(
        search::WebSearch::default(),
        config.open_ai_provider(),
        options.clone(),
    );
    evaluator.run(company_name).await
}

pub async fn categories() -> Vec<Category> {
    Category::iter().collect()
}

/// Store the chat LLM settings given as `-O` options.
///
/// The result is rejected, and nothing is written, when an option key is
/// unknown or the settings would still lack an API key once the environment
/// is applied.
pub async fn llm_config(
    protocol: &str,
    options: &HashMap<String, String>,
) -> StartvalResult<ConfigOutcome> {
    llm::config_chat(protocol, options).await
}

pub async fn llm_chat_completion_stream(
    prompt: &str,
    options: &ChatCompletionOptions,
) -> StartvalResult<ChatCompletionStream> {
    let config = Config::load()?;
    llm::chat_completion_stream(&config, &[ChatMessage::user(prompt)], options).await
}
