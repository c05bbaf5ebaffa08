use std::time::Duration;

use crate::{
    ai::{AiSettings, DEFAULT_TIMEOUT_MS},
    search::{
        HybridOptions, MergeStrategy, SmartOptions, DEFAULT_AI_LIMIT, DEFAULT_AI_THRESHOLD,
        DEFAULT_LOCAL_LIMIT,
    },
    storage::{self, StorageManager},
};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.yaml";

/// Overrides `ai.api_key` so the credential can stay out of the config file.
pub const AI_KEY_ENV: &str = "BB_AI_KEY";

/// Connection details for the chat-completion endpoint. AI search is
/// enabled only when endpoint, key and model are all set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_local_limit")]
    pub local_limit: usize,

    #[serde(default = "default_ai_limit")]
    pub ai_limit: usize,

    #[serde(default)]
    pub merge_strategy: MergeStrategy,

    /// Ask the AI when local search finds fewer results than this
    #[serde(default = "default_ai_threshold")]
    pub ai_threshold: usize,

    #[serde(default)]
    pub prefer_ai: bool,

    #[serde(default = "default_use_hybrid")]
    pub use_hybrid: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            local_limit: DEFAULT_LOCAL_LIMIT,
            ai_limit: DEFAULT_AI_LIMIT,
            merge_strategy: MergeStrategy::default(),
            ai_threshold: DEFAULT_AI_THRESHOLD,
            prefer_ai: false,
            use_hybrid: true,
        }
    }
}

fn default_local_limit() -> usize {
    DEFAULT_LOCAL_LIMIT
}

fn default_ai_limit() -> usize {
    DEFAULT_AI_LIMIT
}

fn default_ai_threshold() -> usize {
    DEFAULT_AI_THRESHOLD
}

fn default_use_hybrid() -> bool {
    true
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Config {
    fn validate(&mut self) -> anyhow::Result<()> {
        if self.ai.timeout_ms == 0 {
            bail!("ai.timeout_ms must be greater than 0");
        }

        if self.search.local_limit == 0 {
            self.search.local_limit = 1
        }

        if self.search.ai_limit == 0 {
            self.search.ai_limit = 1
        }

        Ok(())
    }

    pub fn load_with(base_path: &str) -> anyhow::Result<Self> {
        let store = storage::BackendLocal::new(base_path)
            .with_context(|| format!("failed to create {base_path}"))?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str =
            String::from_utf8(store.read(CONFIG_FILE)?).context("config file is not valid utf8")?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_string();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let store = storage::BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }

    /// Resolves the AI settings, letting `BB_AI_KEY` replace the stored key.
    pub fn ai_settings(&self) -> AiSettings {
        let env_key = std::env::var(AI_KEY_ENV).ok();
        self.ai_settings_with_key(env_key.as_deref())
    }

    fn ai_settings_with_key(&self, key_override: Option<&str>) -> AiSettings {
        AiSettings::from_parts(
            self.ai.endpoint.as_deref(),
            key_override.or(self.ai.api_key.as_deref()),
            self.ai.model.as_deref(),
        )
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_millis(self.ai.timeout_ms)
    }

    pub fn smart_options(&self) -> SmartOptions {
        SmartOptions {
            prefer_ai: self.search.prefer_ai,
            ai_threshold: self.search.ai_threshold,
            use_hybrid: self.search.use_hybrid,
            hybrid: HybridOptions {
                local_limit: self.search.local_limit,
                ai_limit: self.search.ai_limit,
                merge_strategy: self.search.merge_strategy,
            },
        }
    }
}
