//! Tipos de erro para o cliente da API Gemini.
//!
//! Respostas HTTP com erro não aparecem aqui: a reescrita degrada para o texto
//! original (ver [`Rewrite::rewrite_error`](super::Rewrite::rewrite_error)).
//! Só chegam ao chamador as falhas que impedem obter qualquer texto.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeminiError {
    /// Nada para reescrever.
    #[error("no text provided")]
    EmptyInput,

    /// Chave da API ausente na configuração.
    #[error("Gemini API key not configured")]
    NotConfigured,

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
