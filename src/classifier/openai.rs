use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::classifier::{
    ChatMessage, ClassificationRequest, Classifier, ClassifierError, ClassifierResult,
    build_reqwest_client,
};

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Classifier backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiClassifier {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl OpenAiClassifier {
    /// Creates a client for `api_base`, e.g. `https://api.openai.com/v1`.
    ///
    /// `timeout` bounds every single call; a call that exceeds it fails with
    /// [`ClassifierError::Timeout`].
    pub fn new(
        api_base: &str,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> ClassifierResult<Self> {
        let base = Url::parse(&format!("{}/", api_base.trim_end_matches('/')))
            .map_err(|e| ClassifierError::Build(e.to_string()))?;
        let endpoint = base
            .join("chat/completions")
            .map_err(|e| ClassifierError::Build(e.to_string()))?;

        Ok(Self {
            client: build_reqwest_client(timeout)?,
            endpoint,
            api_key: api_key.filter(|key| !key.is_empty()),
            model: model.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(&self, request: &ClassificationRequest) -> ClassifierResult<String> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
        };

        let mut builder = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let res = builder.send().await.map_err(|e| self.map_reqwest(e))?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = res.text().await.map_err(|e| self.map_reqwest(e))?;
        let parsed: CompletionResponse =
            serde_json::from_str(&text).map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClassifierError::Malformed("no choices in response".to_string()))?
            .message
            .content
            .unwrap_or_default();

        let content = content.trim();
        if content.is_empty() {
            return Err(ClassifierError::EmptyCompletion);
        }
        Ok(content.to_string())
    }

    fn map_reqwest(&self, error: reqwest::Error) -> ClassifierError {
        if error.is_timeout() {
            ClassifierError::Timeout(self.timeout)
        } else {
            ClassifierError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    async fn complete(&self, request: &ClassificationRequest) -> ClassifierResult<String> {
        match tokio::time::timeout(self.timeout, self.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(ClassifierError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::OpenAiClassifier;

    #[test]
    fn endpoint_is_joined_under_the_base_path() {
        let classifier = OpenAiClassifier::new(
            "https://api.openai.com/v1/",
            None,
            "gpt-4.1-nano",
            Duration::from_secs(5),
        )
        .expect("valid base url");

        assert_eq!(
            classifier.endpoint().as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = OpenAiClassifier::new("not a url", None, "m", Duration::from_secs(5));
        assert!(result.is_err());
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let classifier = OpenAiClassifier::new(
            "http://localhost:1",
            Some(String::new()),
            "m",
            Duration::from_secs(5),
        )
        .expect("valid base url");
        assert!(classifier.api_key.is_none());
    }
}
