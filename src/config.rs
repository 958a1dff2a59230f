use std::env;
use std::time::Duration;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_body_bytes: Option<usize>,
}

/// Whether the standalone monument is rendered on a neutral background or
/// in a setting of the model's choosing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonumentSetting {
    #[default]
    Isolated,
    Contextual,
}

/// How strictly the composite keeps the user's background photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScenePolicy {
    #[default]
    PreservePixels,
    LooseInspiration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblerConfig {
    pub monument_setting: MonumentSetting,
    pub scene_policy: ScenePolicy,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub assembler: AssemblerConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: None,
            base_url: None,
            timeout_secs: None,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY").ok();
        let model = env::var("GEMINI_MODEL").ok();
        let base_url = env::var("GEMINI_API_BASE").ok();
        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok());

        GeminiConfig {
            api_key,
            model,
            base_url,
            timeout_secs,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// The key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_GEMINI_API_BASE)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url(), self.model())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: None,
            port: None,
            max_body_bytes: None,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let host = env::var("HOST").ok();
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());
        let max_body_bytes = env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|bytes| bytes.parse().ok());

        ServerConfig {
            host,
            port,
            max_body_bytes,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = Some(bytes);
        self
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }
}

impl MonumentSetting {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "isolated" | "isolate" => Some(MonumentSetting::Isolated),
            "contextual" | "context" => Some(MonumentSetting::Contextual),
            _ => None,
        }
    }
}

impl ScenePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "preserve" | "pixel" => Some(ScenePolicy::PreservePixels),
            "inspire" | "loose" => Some(ScenePolicy::LooseInspiration),
            _ => None,
        }
    }
}

impl AssemblerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let monument_setting = env::var("MONUMENT_SETTING")
            .ok()
            .and_then(|value| {
                let parsed = MonumentSetting::parse(&value);
                if parsed.is_none() {
                    log::warn!("Ignoring unknown MONUMENT_SETTING '{}'", value);
                }
                parsed
            })
            .unwrap_or_default();
        let scene_policy = env::var("SCENE_POLICY")
            .ok()
            .and_then(|value| {
                let parsed = ScenePolicy::parse(&value);
                if parsed.is_none() {
                    log::warn!("Ignoring unknown SCENE_POLICY '{}'", value);
                }
                parsed
            })
            .unwrap_or_default();

        AssemblerConfig {
            monument_setting,
            scene_policy,
        }
    }

    pub fn with_setting(mut self, setting: MonumentSetting) -> Self {
        self.monument_setting = setting;
        self
    }

    pub fn with_scene_policy(mut self, policy: ScenePolicy) -> Self {
        self.scene_policy = policy;
        self
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            server: ServerConfig::from_env(),
            gemini: GeminiConfig::from_env(),
            assembler: AssemblerConfig::from_env(),
        }
    }

    pub fn with_server(mut self, config: ServerConfig) -> Self {
        self.server = config;
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_assembler(mut self, config: AssemblerConfig) -> Self {
        self.assembler = config;
        self
    }
}
