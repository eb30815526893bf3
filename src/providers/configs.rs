pub const OLLAMA_HOST: &str = "http://localhost:11434";

/// Connection settings for an Ollama endpoint serving one model.
#[derive(Debug, Clone)]
pub struct OllamaProviderConfig {
    pub host: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl OllamaProviderConfig {
    pub fn new<H: Into<String>, M: Into<String>>(host: H, model: M) -> Self {
        Self {
            host: host.into(),
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Read the host from `OLLAMA_HOST`, falling back to the local default
    pub fn from_env<M: Into<String>>(model: M) -> Self {
        let host = std::env::var("OLLAMA_HOST").unwrap_or_else(|_| OLLAMA_HOST.to_string());
        Self::new(host, model)
    }
}
