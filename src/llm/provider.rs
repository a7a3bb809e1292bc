use crate::{
    error::StartvalResult,
    llm::{ChatCompletionOptions, ChatCompletionStream, ChatMessage},
};

pub mod open_ai;

pub trait ChatProvider {
    /// Complete the conversation in one request and return the whole reply.
    fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &ChatCompletionOptions,
    ) -> impl std::future::Future<Output = StartvalResult<ChatMessage>> + Send;

    fn chat_completion_stream(
        &self,
        messages: &[ChatMessage],
        options: &ChatCompletionOptions,
    ) -> impl std::future::Future<Output = StartvalResult<ChatCompletionStream>> + Send;
}
