use log::Level;
use std::str::FromStr;

const DEFAULT_API_BASE: &str = "/api";
const DEFAULT_PREDICT_TIMEOUT_MS: u32 = 60_000;
const DEFAULT_CHAT_TIMEOUT_MS: u32 = 45_000;

/// Settings baked in at build time (`PHYTO_*` variables seen by trunk/cargo).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    pub predict_timeout_ms: u32,
    pub chat_timeout_ms: u32,
    pub log_level: Level,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            predict_timeout_ms: DEFAULT_PREDICT_TIMEOUT_MS,
            chat_timeout_ms: DEFAULT_CHAT_TIMEOUT_MS,
            log_level: Level::Info,
        }
    }
}

impl AppConfig {
    pub fn from_build_env() -> (Self, Vec<String>) {
        Self::resolve(|key| {
            let value = match key {
                "PHYTO_API_BASE" => option_env!("PHYTO_API_BASE"),
                "PHYTO_PREDICT_TIMEOUT_MS" => option_env!("PHYTO_PREDICT_TIMEOUT_MS"),
                "PHYTO_CHAT_TIMEOUT_MS" => option_env!("PHYTO_CHAT_TIMEOUT_MS"),
                "PHYTO_LOG_LEVEL" => option_env!("PHYTO_LOG_LEVEL"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    /// Builds a config from a key lookup. Bad values keep their default and
    /// produce a warning line for the caller to log once logging is up.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();

        if let Some(base) = lookup("PHYTO_API_BASE") {
            let trimmed = base.trim().trim_end_matches('/');
            if trimmed.is_empty() && !base.trim().starts_with('/') {
                warnings.push(format!("PHYTO_API_BASE is empty, using {}", DEFAULT_API_BASE));
            } else {
                config.api_base = trimmed.to_string();
            }
        }

        for (key, slot) in [
            ("PHYTO_PREDICT_TIMEOUT_MS", &mut config.predict_timeout_ms),
            ("PHYTO_CHAT_TIMEOUT_MS", &mut config.chat_timeout_ms),
        ] {
            if let Some(raw) = lookup(key) {
                match raw.trim().parse::<u32>() {
                    Ok(ms) if ms > 0 => *slot = ms,
                    _ => warnings.push(format!("{}={:?} is not a positive number, using {}", key, raw, slot)),
                }
            }
        }

        if let Some(raw) = lookup("PHYTO_LOG_LEVEL") {
            match Level::from_str(raw.trim()) {
                Ok(level) => config.log_level = level,
                Err(_) => warnings.push(format!("PHYTO_LOG_LEVEL={:?} is not a log level, using info", raw)),
            }
        }

        (config, warnings)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}
