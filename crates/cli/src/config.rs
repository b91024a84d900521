//! Optional TOML config with provider defaults, so API keys and model
//! names need not ride on every invocation.
//!
//! ```toml
//! [openai]
//! api_key = "sk-..."
//! base_url = "http://localhost:8000/v1"
//! model = "gpt-4o-mini"
//!
//! [anthropic]
//! api_key = "sk-ant-..."
//! ```

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    pub openai: Option<ProviderConfig>,
    pub anthropic: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

pub fn load(path: &Path) -> Result<CliConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}
