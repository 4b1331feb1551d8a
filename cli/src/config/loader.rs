//! Simple CLI configuration loader for fncall
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./fncall.json or ./.fncall/config.json
//! 3. Git repository root: <repo_root>/.fncall/config.json
//! 4. XDG config: $XDG_CONFIG_HOME/fncall/config.json or the platform config dir
//! 5. Environment variables only (no files)

use anyhow::{anyhow, Context, Result};
use fncall_core::{ModelParams, Protocol, ResolvedLlmConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Model used when neither a file nor the environment names one
pub const DEFAULT_MODEL: &str = "gpt-4o";

const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment lookup, injectable so tests never touch the process env
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Raw configuration file format (simple single-file schema)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawConfig {
    /// Protocol to use
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// API key (can be "env:VAR_NAME" for environment variable)
    pub api_key: String,
    /// Base URL (optional, uses protocol default if not specified)
    pub base_url: Option<String>,
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,
    /// Model parameters (optional)
    #[serde(default)]
    pub params: ModelParams,
}

fn default_protocol() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Build a config purely from environment variables.
///
/// `OPENAI_API_KEY` is required. The base URL and model come from the
/// OpenAI-specific variables first, then the generic `FNCALL_*` ones.
pub fn raw_config_from_env(
    lookup: &dyn Fn(&str) -> Option<String>,
    protocol_preference: Option<&str>,
) -> Result<RawConfig> {
    if let Some(preferred) = protocol_preference {
        if Protocol::parse(preferred) != Protocol::OpenAICompat {
            return Err(anyhow!(
                "Protocol '{}' specified but only openai-compatible services are supported",
                preferred
            ));
        }
    }

    let api_key = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()).ok_or_else(|| {
        anyhow!(
            "No configuration found. Please create a fncall.json file or set {}",
            API_KEY_ENV
        )
    })?;

    let base_url = lookup("OPENAI_BASE_URL").or_else(|| lookup("FNCALL_BASE_URL"));
    let model = lookup("OPENAI_MODEL")
        .or_else(|| lookup("FNCALL_MODEL"))
        .unwrap_or_else(default_model);

    Ok(RawConfig {
        protocol: default_protocol(),
        api_key,
        base_url,
        model,
        params: ModelParams::default(),
    })
}

/// CLI configuration loader
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    protocol_override: Option<String>,
    api_key_override: Option<String>,
    base_url_override: Option<String>,
    model_override: Option<String>,
    /// Directory searched first; the process cwd when unset
    working_dir: Option<PathBuf>,
    env: EnvLookup,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            protocol_override: None,
            api_key_override: None,
            base_url_override: None,
            model_override: None,
            working_dir: None,
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set protocol override
    pub fn with_protocol_override(mut self, protocol: String) -> Self {
        self.protocol_override = Some(protocol);
        self
    }

    /// Set API key override
    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    /// Set base URL override
    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    /// Set model override
    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    /// Search from this directory instead of the process cwd
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    /// Replace the environment lookup
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<ResolvedLlmConfig> {
        // Step 1: Find and load base configuration
        let mut config = if let Some(override_path) = &self.config_override {
            self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            self.search_and_load().await?
        };

        // Step 2: Apply flag overrides
        if let Some(protocol) = &self.protocol_override {
            config.protocol = protocol.clone();
        }
        if let Some(api_key) = &self.api_key_override {
            config.api_key = api_key.clone();
        }
        if let Some(base_url) = &self.base_url_override {
            config.base_url = Some(base_url.clone());
        }
        if let Some(model) = &self.model_override {
            config.model = model.clone();
        }

        // Step 3: Resolve to final LLM config
        self.resolve_config(config)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<RawConfig> {
        let cwd = self.current_dir()?;

        if let Some(config) = self.try_load_cwd(&cwd).await? {
            return Ok(config);
        }

        if let Some(config) = self.try_load_git_root(&cwd).await? {
            return Ok(config);
        }

        if let Some(config) = self.try_load_xdg().await? {
            return Ok(config);
        }

        tracing::debug!("No config file found, falling back to environment");
        let preference = self
            .protocol_override
            .clone()
            .or_else(|| (self.env)("FNCALL_PROTOCOL"));
        raw_config_from_env(self.env.as_ref(), preference.as_deref())
    }

    fn current_dir(&self) -> Result<PathBuf> {
        match &self.working_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Try loading from the working directory
    async fn try_load_cwd(&self, cwd: &Path) -> Result<Option<RawConfig>> {
        for candidate in [cwd.join("fncall.json"), cwd.join(".fncall").join("config.json")] {
            if candidate.is_file() {
                return Ok(Some(self.load_file(&candidate).await?));
            }
        }
        Ok(None)
    }

    /// Try loading from git repository root
    async fn try_load_git_root(&self, cwd: &Path) -> Result<Option<RawConfig>> {
        if let Some(git_root) = find_git_root(cwd) {
            let config_path = git_root.join(".fncall").join("config.json");
            if config_path.is_file() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }
        Ok(None)
    }

    /// Try loading from XDG config directory
    async fn try_load_xdg(&self) -> Result<Option<RawConfig>> {
        if let Some(config_dir) = self.xdg_config_dir() {
            let config_path = config_dir.join("fncall").join("config.json");
            if config_path.is_file() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }
        Ok(None)
    }

    fn xdg_config_dir(&self) -> Option<PathBuf> {
        (self.env)("XDG_CONFIG_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::config_dir)
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.is_file() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        tracing::debug!("Loading config from {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve raw config to ResolvedLlmConfig
    fn resolve_config(&self, config: RawConfig) -> Result<ResolvedLlmConfig> {
        let protocol = Protocol::parse(&config.protocol);

        // Resolve API key (handle env: prefix)
        let api_key = match config.api_key.strip_prefix("env:") {
            Some(var_name) => (self.env)(var_name)
                .ok_or_else(|| anyhow!("Environment variable not found: {}", var_name))?,
            None => config.api_key,
        };

        let base_url = match config.base_url {
            Some(url) => url,
            None => protocol
                .default_base_url()
                .ok_or_else(|| {
                    anyhow!(
                        "Protocol '{}' has no default base URL; set base_url",
                        protocol.as_str()
                    )
                })?
                .to_string(),
        };

        let resolved =
            ResolvedLlmConfig::new(protocol, base_url, api_key, config.model).with_params(config.params);

        resolved
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(resolved)
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk up from `start` looking for a `.git` entry
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn write_config(path: &Path, body: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    /// Loader rooted in an empty temp dir with an isolated XDG dir
    fn isolated(dir: &TempDir, pairs: &[(&str, &str)]) -> CliConfigLoader {
        let xdg = dir.path().join("xdg").to_string_lossy().to_string();
        let mut all: Vec<(&str, &str)> = pairs.to_vec();
        all.push(("XDG_CONFIG_HOME", xdg.as_str()));
        CliConfigLoader::new()
            .with_working_dir(dir.path().join("work"))
            .with_env_lookup(env_of(&all))
    }

    #[test]
    fn test_env_requires_api_key() {
        let err = raw_config_from_env(&env_of(&[]), None).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_env_defaults_and_overrides() {
        let config = raw_config_from_env(&env_of(&[("OPENAI_API_KEY", "sk-test")]), None).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, None);

        let config = raw_config_from_env(
            &env_of(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("FNCALL_MODEL", "generic-model"),
                ("FNCALL_BASE_URL", "http://localhost:8080/v1"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(config.model, "generic-model");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));

        let config = raw_config_from_env(
            &env_of(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("OPENAI_MODEL", "gpt-4o-mini"),
                ("FNCALL_MODEL", "generic-model"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn test_env_rejects_unsupported_protocol() {
        let err = raw_config_from_env(&env_of(&[("OPENAI_API_KEY", "sk")]), Some("anthropic"))
            .unwrap_err();
        assert!(err.to_string().contains("anthropic"));
        assert!(raw_config_from_env(&env_of(&[("OPENAI_API_KEY", "sk")]), Some("openai")).is_ok());
    }

    #[tokio::test]
    async fn test_env_only_resolution() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("work")).unwrap();
        let resolved = isolated(&dir, &[("OPENAI_API_KEY", "sk-env")])
            .load()
            .await
            .unwrap();
        assert_eq!(resolved.protocol, Protocol::OpenAICompat);
        assert_eq!(resolved.api_key, "sk-env");
        assert_eq!(resolved.base_url, "https://api.openai.com/v1");
        assert_eq!(resolved.model, "gpt-4o");
    }

    #[tokio::test]
    async fn test_cwd_file_wins_over_env() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("work").join("fncall.json"),
            r#"{"protocol": "openai", "api_key": "sk-file", "model": "file-model"}"#,
        );

        let resolved = isolated(&dir, &[("OPENAI_API_KEY", "sk-env")])
            .load()
            .await
            .unwrap();
        assert_eq!(resolved.api_key, "sk-file");
        assert_eq!(resolved.model, "file-model");
    }

    #[tokio::test]
    async fn test_dot_dir_and_git_root_and_xdg_locations() {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work");

        // XDG only
        write_config(
            &dir.path().join("xdg").join("fncall").join("config.json"),
            r#"{"api_key": "sk-xdg"}"#,
        );
        std::fs::create_dir_all(&work).unwrap();
        assert_eq!(isolated(&dir, &[]).load().await.unwrap().api_key, "sk-xdg");

        // Git root beats XDG
        let nested = dir.path().join("repo").join("sub");
        std::fs::create_dir_all(dir.path().join("repo").join(".git")).unwrap();
        write_config(
            &dir.path().join("repo").join(".fncall").join("config.json"),
            r#"{"api_key": "sk-git"}"#,
        );
        std::fs::create_dir_all(&nested).unwrap();
        let loader = isolated(&dir, &[]).with_working_dir(nested.clone());
        assert_eq!(loader.load().await.unwrap().api_key, "sk-git");

        // ./.fncall/config.json beats the git root
        write_config(
            &nested.join(".fncall").join("config.json"),
            r#"{"api_key": "sk-dot"}"#,
        );
        let loader = isolated(&dir, &[]).with_working_dir(nested);
        assert_eq!(loader.load().await.unwrap().api_key, "sk-dot");
    }

    #[tokio::test]
    async fn test_config_override_and_flags() {
        let dir = TempDir::new().unwrap();
        let explicit = dir.path().join("custom");
        write_config(
            &explicit.join("config.json"),
            r#"{"api_key": "env:MY_KEY", "model": "m1", "params": {"temperature": 0.5}}"#,
        );

        let resolved = isolated(&dir, &[("MY_KEY", "sk-from-var")])
            .with_config_override(explicit)
            .with_model_override("m2".to_string())
            .with_base_url_override("http://127.0.0.1:9000/v1".to_string())
            .load()
            .await
            .unwrap();
        assert_eq!(resolved.api_key, "sk-from-var");
        assert_eq!(resolved.model, "m2");
        assert_eq!(resolved.base_url, "http://127.0.0.1:9000/v1");
        assert_eq!(resolved.params.temperature, Some(0.5));
    }

    #[tokio::test]
    async fn test_failures_are_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("work")).unwrap();

        // Missing override path
        let err = isolated(&dir, &[])
            .with_config_override(dir.path().join("nope.json"))
            .load()
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("does not exist"));

        // Unset env: reference
        write_config(
            &dir.path().join("work").join("fncall.json"),
            r#"{"api_key": "env:MISSING_KEY"}"#,
        );
        let err = isolated(&dir, &[]).load().await.unwrap_err();
        assert!(err.to_string().contains("MISSING_KEY"));

        // Invalid base URL fails validation
        let err = isolated(&dir, &[])
            .with_api_key_override("sk".to_string())
            .with_base_url_override("ftp://example.com".to_string())
            .load()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }
}
