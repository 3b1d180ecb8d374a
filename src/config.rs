use crate::chatbot::DEFAULT_INTRO;
use serde::{Deserialize, Serialize};

/// Main configuration structure loaded from calidad_agua.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub chatbot: ChatbotConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Where the dataset lives and how it is delimited
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    pub csv_path: String,
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: "dataset/Calidad_del_Agua_para_Consumo_Humano_en_Colombia.csv".to_string(),
            delimiter: ';',
        }
    }
}

impl DataConfig {
    /// Delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> anyhow::Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            anyhow::bail!("CSV delimiter must be an ASCII character, got '{}'", self.delimiter)
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Hard cap on the list route
    pub list_cap: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { list_cap: 100 }
    }
}

/// Chatbot behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatbotConfig {
    pub intro: String,
    /// TOML `[keywords]` table; the built-in table when unset
    pub keywords_path: Option<String>,
    /// TOML `[[synset]]` lexicon; the built-in lexicon when unset
    pub lexicon_path: Option<String>,
    /// Let synonyms of a query token select an answer
    pub match_synonyms: bool,
    /// Tokens per query sent to the lexicon
    pub max_expanded_tokens: usize,
    /// 0 disables the synonym cache
    pub synonym_cache_max: usize,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            intro: DEFAULT_INTRO.to_string(),
            keywords_path: None,
            lexicon_path: None,
            match_synonyms: false,
            max_expanded_tokens: 32,
            synonym_cache_max: 4096,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_level: String,
    pub http_bind: std::net::SocketAddr,
    pub http_request_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: "calidad_agua=info,tower_http=info".to_string(),
            http_bind: "127.0.0.1:9000"
                .parse()
                .expect("default bind address should parse"),
            http_request_timeout_ms: 10_000,
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(level) = std::env::var("RUST_LOG") {
            cfg.log_level = level;
        }
        if let Ok(v) = std::env::var("AGUA_HTTP_BIND") {
            match v.parse::<std::net::SocketAddr>() {
                Ok(bind) => cfg.http_bind = bind,
                Err(_) => tracing::warn!("Ignoring invalid AGUA_HTTP_BIND '{}'", v),
            }
        }
        if let Some(timeout) = std::env::var("AGUA_HTTP_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            && timeout > 0
        {
            cfg.http_request_timeout_ms = timeout;
        }
        cfg
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses CALIDAD_AGUA_CONFIG environment variable or defaults to "calidad_agua.toml"
    pub fn load() -> anyhow::Result<Self> {
        Self::load_env_files();

        let config_path = std::env::var("CALIDAD_AGUA_CONFIG")
            .unwrap_or_else(|_| "calidad_agua.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load AGUA_ENV_FILE if set, otherwise ./.env when present. Variables
    /// already in the process environment win. Safe to call more than once.
    pub fn load_env_files() {
        if let Ok(env_path) = std::env::var("AGUA_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::dotenv();
        }
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Env-first overrides for file-backed settings
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("AGUA_CSV_PATH") {
            tracing::debug!("AGUA_CSV_PATH env override applied");
            self.data.csv_path = path;
        }
        if let Some(d) = std::env::var("AGUA_CSV_DELIMITER")
            .ok()
            .and_then(|v| v.chars().next())
        {
            self.data.delimiter = d;
        }
        if let Some(cap) = std::env::var("AGUA_LIST_CAP")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            self.query.list_cap = cap;
        }
        if let Ok(path) = std::env::var("AGUA_KEYWORDS_PATH") {
            self.chatbot.keywords_path = Some(path);
        }
        if let Ok(path) = std::env::var("AGUA_LEXICON_PATH") {
            self.chatbot.lexicon_path = Some(path);
        }
        if let Some(flag) = env_flag("AGUA_MATCH_SYNONYMS") {
            self.chatbot.match_synonyms = flag;
        }
        if let Some(max) = std::env::var("AGUA_SYNONYM_CACHE_MAX")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            self.chatbot.synonym_cache_max = max;
        }
    }

    /// Validate and clamp
    pub fn validate(&mut self) -> anyhow::Result<()> {
        self.data.delimiter_byte()?;
        if self.data.csv_path.trim().is_empty() {
            anyhow::bail!("data.csv_path must not be empty");
        }
        if !(1..=10_000).contains(&self.query.list_cap) {
            let clamped = self.query.list_cap.clamp(1, 10_000);
            tracing::warn!(
                "list_cap {} out of range, clamping to {}",
                self.query.list_cap,
                clamped
            );
            self.query.list_cap = clamped;
        }
        if self.chatbot.max_expanded_tokens == 0 {
            self.chatbot.max_expanded_tokens = 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let cfg = Config::from_toml_str("[query]\nlist_cap = 50\n").unwrap();
        assert_eq!(cfg.query.list_cap, 50);
        assert_eq!(cfg.data.delimiter, ';');
        assert_eq!(cfg.chatbot.intro, DEFAULT_INTRO);
        assert!(!cfg.chatbot.match_synonyms);
    }

    #[test]
    fn validate_clamps_list_cap() {
        let mut cfg = Config::default();
        cfg.query.list_cap = 0;
        cfg.validate().unwrap();
        assert_eq!(cfg.query.list_cap, 1);
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let mut cfg = Config::default();
        cfg.data.delimiter = '¦';
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn env_file_is_loaded_before_config() {
        let path = std::env::temp_dir().join(format!("agua-env-{}.env", std::process::id()));
        std::fs::write(&path, "AGUA_TEST_ENV_MARKER=from-file\n").unwrap();
        unsafe {
            std::env::set_var("AGUA_ENV_FILE", &path);
        }

        Config::load_env_files();
        assert_eq!(
            std::env::var("AGUA_TEST_ENV_MARKER").as_deref(),
            Ok("from-file")
        );

        unsafe {
            std::env::remove_var("AGUA_ENV_FILE");
            std::env::remove_var("AGUA_TEST_ENV_MARKER");
        }
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn runtime_defaults() {
        let rt = RuntimeConfig::default();
        assert_eq!(rt.http_bind.port(), 9000);
        assert_eq!(rt.http_request_timeout_ms, 10_000);
    }
}
