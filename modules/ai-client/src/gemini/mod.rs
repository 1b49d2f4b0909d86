mod client;
pub(crate) mod types;

use anyhow::{anyhow, Result};

use client::GeminiClient;
use types::*;

// =============================================================================
// Gemini Agent
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    model: String,
    base_url: Option<String>,
    http: reqwest::Client,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow!("GEMINI_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use a shared HTTP client (e.g. one with an application-wide timeout)
    /// instead of a per-instance default.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(&self.api_key, self.http.clone());
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// Send media bytes plus an instruction prompt and return the raw text
    /// reply. The media travels base64-encoded as an inline part.
    pub async fn classify_media(
        &self,
        bytes: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String> {
        use base64::Engine;

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

        let request = GenerateContentRequest::new()
            .content(Content::user(vec![
                Part::text(prompt),
                Part::inline_data(mime_type, encoded),
            ]))
            .temperature(0.0)
            .max_output_tokens(1024);

        let response = self.client().generate_content(&self.model, &request).await?;

        response
            .text()
            .ok_or_else(|| anyhow!("No text in Gemini response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_new() {
        let ai = Gemini::new("test-key", "gemini-1.5-flash");
        assert_eq!(ai.model(), "gemini-1.5-flash");
        assert_eq!(ai.api_key, "test-key");
    }

    #[test]
    fn test_gemini_with_base_url() {
        let ai = Gemini::new("test-key", "gemini-1.5-flash")
            .with_base_url("https://custom.api.com");
        assert_eq!(ai.base_url, Some("https://custom.api.com".to_string()));
    }
}
