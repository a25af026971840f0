use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::error::GeminiError;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part, Rewrite};

const API_URL: &str = "https://generativelanguage.googleapis.com";

/// Anything that can turn a raw incident report into the formal register.
pub trait TextRewriter {
    async fn rewrite(&self, text: &str) -> Result<Rewrite, GeminiError>;
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    generation: GenerationConfig,
    client: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, model, API_URL.to_string())
    }

    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: String,
    ) -> Result<Self, GeminiError> {
        if api_key.is_empty() {
            return Err(GeminiError::NotConfigured);
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            api_key,
            model,
            generation: GenerationConfig {
                temperature: 0.3,
                max_output_tokens: 2048,
            },
            client,
            base_url,
        })
    }

    pub fn with_generation(mut self, temperature: f32, max_output_tokens: u32) -> Self {
        self.generation = GenerationConfig {
            temperature,
            max_output_tokens,
        };
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

fn formal_rewrite_prompt(text: &str) -> String {
    format!(
        "Você é um assistente especializado em redação escolar e gestão de conflitos educacionais.\n\
         Reescreva o texto abaixo em registro estritamente formal, claro e objetivo, adequado \
         ao registro em um sistema de controle de ocorrências escolares.\n\
         \n\
         Instruções:\n\
         - Elimine gírias, hesitações e coloquialismos.\n\
         - Mantenha todo o contexto, os fatos relatados e os nomes citados.\n\
         - Escreva em terceira pessoa ou em primeira pessoa formal, coerente com o relato.\n\
         - NÃO invente fatos, opiniões nem resoluções.\n\
         - Seja impessoal e direto.\n\
         - Retorne APENAS o texto final, sem apresentações, aspas ou cumprimentos.\n\
         \n\
         Texto original:\n\
         \"{text}\""
    )
}

impl TextRewriter for GeminiClient {
    async fn rewrite(&self, text: &str) -> Result<Rewrite, GeminiError> {
        let original = text.trim();
        if original.is_empty() {
            return Err(GeminiError::EmptyInput);
        }

        let req = GenerateContentRequest {
            contents: vec![Content {
                role: "user".into(),
                parts: vec![Part {
                    text: formal_rewrite_prompt(original),
                }],
            }],
            generation_config: self.generation.clone(),
        };

        debug!(chars = original.len(), model = %self.model, "requesting formal rewrite");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!(status = status.as_u16(), %body, "formal rewrite failed, keeping original text");
            return Ok(Rewrite::degraded(
                original,
                format!("rewrite failed with status {}", status.as_u16()),
            ));
        }

        let body = response.json::<GenerateContentResponse>().await?;
        match body.first_text() {
            Some(formal) => Ok(Rewrite {
                original: original.to_string(),
                formal,
                rewrite_error: None,
            }),
            None => {
                warn!("formal rewrite returned no content, keeping original text");
                Ok(Rewrite::degraded(original, "rewrite returned no content"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::with_base_url(
            "test-key".into(),
            "gemini-2.5-flash".into(),
            server.uri(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn rewrite_returns_formal_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(query_param("key", "test-key"))
            .and(body_string_contains("maxOutputTokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "O aluno chegou atrasado.\n"}]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rewrite = client_for(&server)
            .rewrite("  o menino chegou tarde dnv  ")
            .await
            .unwrap();

        assert_eq!(rewrite.original, "o menino chegou tarde dnv");
        assert_eq!(rewrite.formal, "O aluno chegou atrasado.");
        assert!(!rewrite.is_degraded());
    }

    #[tokio::test]
    async fn http_error_degrades_to_original() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let rewrite = client_for(&server).rewrite("texto cru").await.unwrap();
        assert_eq!(rewrite.formal, "texto cru");
        assert_eq!(
            rewrite.rewrite_error.as_deref(),
            Some("rewrite failed with status 503")
        );
    }

    #[tokio::test]
    async fn empty_candidates_degrade_to_original() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let rewrite = client_for(&server).rewrite("texto cru").await.unwrap();
        assert_eq!(rewrite.formal, "texto cru");
        assert!(rewrite.is_degraded());
    }

    #[tokio::test]
    async fn empty_input_is_rejected_without_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server).rewrite("   ").await.unwrap_err();
        assert!(matches!(err, GeminiError::EmptyInput));
    }

    #[test]
    fn missing_api_key_is_not_configured() {
        let result = GeminiClient::new(String::new(), "gemini-2.5-flash".into());
        assert!(matches!(result, Err(GeminiError::NotConfigured)));
    }

    #[test]
    fn prompt_quotes_the_original() {
        let prompt = formal_rewrite_prompt("bateu no colega");
        assert!(prompt.contains("\"bateu no colega\""));
        assert!(prompt.contains("NÃO invente fatos"));
    }
}
