use std::time::Duration;

use futures::StreamExt;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::{
    CHANNEL_BUFFER_DEFAULT, LLM_TIMEOUT_SECS_DEFAULT,
    error::{StartvalError, StartvalResult},
    llm::{
        ChatCompletionEvent, ChatCompletionOptions, ChatCompletionStream, ChatMessage, Role,
        provider::ChatProvider,
    },
    utils::net::join_url,
};

pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout: Duration::from_secs(LLM_TIMEOUT_SECS_DEFAULT),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request_body(
        &self,
        messages: &[ChatMessage],
        options: &ChatCompletionOptions,
        stream: bool,
    ) -> Value {
        let messages_json_value = messages
            .iter()
            .map(chat_message_to_json_value)
            .collect::<Vec<_>>();

        json!({
            "model": self.model,
            "messages": messages_json_value,
            "temperature": options.temperature,
            "stream": stream,
        })
    }

    async fn post(
        &self,
        client: reqwest::Client,
        request_body: &Value,
    ) -> StartvalResult<reqwest::Response> {
        let request_url = join_url(&self.base_url, "/chat/completions")?;

        let response = client
            .post(request_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request_body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(StartvalError::HttpStatusError(format!(
                "{} {}",
                response.status(),
                response.text().await.ok().unwrap_or_default()
            )))
        }
    }
}

impl ChatProvider for OpenAiProvider {
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &ChatCompletionOptions,
    ) -> StartvalResult<ChatMessage> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let response = self
            .post(client, &self.request_body(messages, options, false))
            .await?;

        let json: Value = response.json().await?;
        let message = &json["choices"][0]["message"];

        let content = message["content"]
            .as_str()
            .ok_or(StartvalError::Required(
                "COMPLETION_CONTENT_REQUIRED",
                "Missing content of the first completion choice".to_string(),
            ))?
            .to_string();
        let reasoning = message["reasoning_content"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        Ok(ChatMessage {
            role: Role::Bot,
            content,
            reasoning,
        })
    }

    async fn chat_completion_stream(
        &self,
        messages: &[ChatMessage],
        options: &ChatCompletionOptions,
    ) -> StartvalResult<ChatCompletionStream> {
        // Streams may legitimately outlive the request timeout, only bound the connect
        let client = reqwest::Client::builder()
            .connect_timeout(self.timeout)
            .build()?;
        let response = self
            .post(client, &self.request_body(messages, options, true))
            .await?;

        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_DEFAULT);

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut lines = SseLineBuffer::default();
            'chunks: while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        let _ = sender.send(ChatCompletionEvent::Error(err.into())).await;
                        break;
                    }
                };

                for line in lines.push(&chunk) {
                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };

                    if data == "[DONE]" {
                        break 'chunks;
                    }

                    let Some(event) = delta_to_event(data) else {
                        continue;
                    };
                    if sender.send(event).await.is_err() {
                        break 'chunks;
                    }
                }
            }
        });

        Ok(ChatCompletionStream::new(receiver))
    }
}

#[derive(strum::Display)]
enum OpenAiRole {
    #[strum(serialize = "user")]
    User,

    #[strum(serialize = "assistant")]
    Assistant,

    #[strum(serialize = "system")]
    System,
}

impl From<Role> for OpenAiRole {
    fn from(val: Role) -> Self {
        match val {
            Role::User => OpenAiRole::User,
            Role::Bot => OpenAiRole::Assistant,
            Role::System => OpenAiRole::System,
        }
    }
}

impl Serialize for OpenAiRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

fn chat_message_to_json_value(chat_message: &ChatMessage) -> Value {
    json!({
        "role": OpenAiRole::from(chat_message.role),
        "content": chat_message.content
    })
}

/// Reassembles SSE lines from network chunks, which may split a line or a
/// multibyte character anywhere.
#[derive(Default)]
struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    /// Complete lines made available by `chunk`, without line terminators.
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = vec![];
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            lines.push(line.trim_end_matches('\r').to_string());
        }

        lines
    }
}

fn delta_to_event(data: &str) -> Option<ChatCompletionEvent> {
    match serde_json::from_str::<Value>(data) {
        Ok(json) => {
            let delta = &json["choices"][0]["delta"];
            if let Some(content) = delta["content"].as_str() {
                Some(ChatCompletionEvent::Content(content.to_string()))
            } else {
                delta["reasoning_content"]
                    .as_str()
                    .map(|content| ChatCompletionEvent::ReasoningContent(content.to_string()))
            }
        }
        Err(err) => Some(ChatCompletionEvent::Error(err.into())),
    }
}
