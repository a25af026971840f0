//! Tipos de dados para o endpoint `generateContent` da API Gemini.
//!
//! Os nomes de campo no JSON seguem o camelCase da API (`generationConfig`,
//! `maxOutputTokens`) via `serde(rename_all)`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

/// Um turno da conversa, composto de partes textuais.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    /// "user" ou "model". A API pode omitir o papel nas respostas.
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Texto da primeira parte do primeiro candidato, sem espaços nas pontas.
    /// `None` quando a resposta veio vazia.
    pub fn first_text(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(|p| p.text.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Resultado de uma reescrita: o texto original e a versão formal.
///
/// Quando a reescrita falha mas o texto original existe, `formal` repete o
/// original e `rewrite_error` descreve o problema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rewrite {
    pub original: String,
    pub formal: String,
    #[serde(default)]
    pub rewrite_error: Option<String>,
}

impl Rewrite {
    pub fn degraded(original: &str, reason: impl Into<String>) -> Self {
        Self {
            original: original.to_string(),
            formal: original.to_string(),
            rewrite_error: Some(reason.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.rewrite_error.is_some()
    }
}
