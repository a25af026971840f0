//! Configuração do EscolaFlow carregada a partir de `escolaflow.toml`.
//!
//! A struct [`EscolaFlowConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! Variáveis de ambiente têm precedência sobre o arquivo.

use serde::Deserialize;
use std::path::Path;

use crate::error::{EscolaFlowError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "escolaflow.toml";

/// Configuração de nível superior carregada de `escolaflow.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EscolaFlowConfig {
    /// URL de conexão SQLite.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub evolution: EvolutionConfig,
}

/// Parâmetros do colaborador de reescrita formal.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

/// Parâmetros do gateway de WhatsApp (Evolution API).
#[derive(Debug, Clone, Deserialize)]
pub struct EvolutionConfig {
    #[serde(default)]
    pub api_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Nome da escola usado na mensagem aos responsáveis.
    #[serde(default = "default_school_name")]
    pub school_name: String,
}

fn default_database_url() -> String {
    "sqlite://escolaflow.db?mode=rwc".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_instance_name() -> String {
    "zap".to_string()
}

fn default_school_name() -> String {
    "EscolaFlow".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            instance_name: default_instance_name(),
            school_name: default_school_name(),
        }
    }
}

impl Default for EscolaFlowConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            gemini: GeminiConfig::default(),
            evolution: EvolutionConfig::default(),
        }
    }
}

impl GeminiConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl EvolutionConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty() && !self.api_key.is_empty()
    }
}

impl EscolaFlowConfig {
    /// Carrega a configuração do caminho dado (ou de `escolaflow.toml` no
    /// diretório atual) e aplica as variáveis de ambiente por cima.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<EscolaFlowConfig>(&contents)?
        } else {
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Sobrescreve campos com valores não vazios vindos de `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let targets: [(&str, &mut String); 6] = [
            ("DATABASE_URL", &mut self.database_url),
            ("GEMINI_API_KEY", &mut self.gemini.api_key),
            ("GEMINI_MODEL", &mut self.gemini.model),
            ("EVOLUTION_API_URL", &mut self.evolution.api_url),
            ("EVOLUTION_API_KEY", &mut self.evolution.api_key),
            ("EVOLUTION_INSTANCE_NAME", &mut self.evolution.instance_name),
        ];
        for (name, field) in targets {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            return Err(EscolaFlowError::Config("database_url must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            return Err(EscolaFlowError::Config(format!(
                "gemini.temperature must be between 0 and 2, got {}",
                self.gemini.temperature
            )));
        }
        Ok(())
    }
}
