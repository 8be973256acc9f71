use std::net::SocketAddr;
use std::num::ParseIntError;
use std::time::Duration;

use common_sdoc::{env_or, is_env_set};
use thiserror::Error;

use crate::common::listen_addr::{ListenAddrError, get_listen_addr};
use crate::common::max_concurrency::{MaxConcurrencyError, max_concurrent_crawls};
use crate::llms::LlmConfig;

pub const DEFAULT_PROJECT_NAME: &str = "SmartDoc Assistant";
pub const DEFAULT_API_V1_STR: &str = "/api/v1";
pub const DEFAULT_MODEL: &str = "qwen-max";
pub const DEFAULT_API_BASE: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_TARGET_LANGUAGE: &str = "Simplified Chinese";
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 60;

/// Env var holding the key for the OpenAI-compatible endpoint.
pub const API_KEY_ENV_VAR: &str = "DASHSCOPE_API_KEY";

/// Process configuration. Read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_name: String,
    /// Prefix for all versioned API routes.
    pub api_v1_str: String,
    pub llm: LlmConfig,
    /// Capacity of the fetch stage's concurrency gate.
    pub max_concurrent_crawls: usize,
    /// Language that explanatory prose is translated into.
    pub target_language: String,
    pub render_timeout: Duration,
    pub listen_addr: SocketAddr,
}

impl Settings {
    /// Reads every setting from the environment.
    /// Only the API key is required, everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !is_env_set(API_KEY_ENV_VAR) {
            return Err(ConfigError::MissingEnvVar(API_KEY_ENV_VAR));
        }
        let api_key = env_or(API_KEY_ENV_VAR, "");

        let render_timeout_secs = match std::env::var("RENDER_TIMEOUT_SECS") {
            Ok(v) => v.trim().parse::<u64>().map_err(ConfigError::InvalidRenderTimeout)?,
            Err(_) => DEFAULT_RENDER_TIMEOUT_SECS,
        };

        Ok(Self {
            project_name: env_or("PROJECT_NAME", DEFAULT_PROJECT_NAME),
            api_v1_str: env_or("API_V1_STR", DEFAULT_API_V1_STR),
            llm: LlmConfig {
                model: env_or("OPENAI_MODEL", DEFAULT_MODEL),
                api_base: env_or("OPENAI_URL", DEFAULT_API_BASE),
                api_key,
                ..LlmConfig::default()
            },
            max_concurrent_crawls: max_concurrent_crawls()?,
            target_language: env_or("TARGET_LANGUAGE", DEFAULT_TARGET_LANGUAGE),
            render_timeout: Duration::from_secs(render_timeout_secs),
            listen_addr: get_listen_addr()?,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required and must not be empty")]
    MissingEnvVar(&'static str),

    #[error(transparent)]
    MaxConcurrency(#[from] MaxConcurrencyError),

    #[error(transparent)]
    ListenAddr(#[from] ListenAddrError),

    #[error("RENDER_TIMEOUT_SECS must be a number of seconds: {0}")]
    InvalidRenderTimeout(ParseIntError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Use a mutex to ensure tests that modify env vars run serially
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 10] = [
        API_KEY_ENV_VAR,
        "PROJECT_NAME",
        "API_V1_STR",
        "OPENAI_MODEL",
        "OPENAI_URL",
        "MAX_CONCURRENT_CRAWLS",
        "TARGET_LANGUAGE",
        "RENDER_TIMEOUT_SECS",
        "HOST",
        "PORT",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_from_env_requires_api_key() {
        let _guard = TEST_MUTEX.lock().unwrap();
        clear_env();
        assert!(matches!(
            Settings::from_env(),
            Err(ConfigError::MissingEnvVar(API_KEY_ENV_VAR))
        ));
    }

    #[test]
    fn test_from_env_rejects_blank_api_key() {
        let _guard = TEST_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var(API_KEY_ENV_VAR, "   ");
        }
        assert!(matches!(
            Settings::from_env(),
            Err(ConfigError::MissingEnvVar(API_KEY_ENV_VAR))
        ));

        unsafe {
            std::env::set_var(API_KEY_ENV_VAR, " sk-test ");
        }
        assert_eq!(Settings::from_env().unwrap().llm.api_key, "sk-test");
        clear_env();
    }

    #[test]
    fn test_from_env_defaults() {
        let _guard = TEST_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var(API_KEY_ENV_VAR, "sk-test");
        }

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.project_name, DEFAULT_PROJECT_NAME);
        assert_eq!(settings.api_v1_str, DEFAULT_API_V1_STR);
        assert_eq!(settings.llm.model, DEFAULT_MODEL);
        assert_eq!(settings.llm.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.llm.api_key, "sk-test");
        assert_eq!(settings.max_concurrent_crawls, 2);
        assert_eq!(settings.target_language, DEFAULT_TARGET_LANGUAGE);
        assert_eq!(settings.render_timeout, Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS));
        clear_env();
    }

    #[test]
    fn test_from_env_overrides() {
        let _guard = TEST_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var(API_KEY_ENV_VAR, "sk-test");
            std::env::set_var("OPENAI_MODEL", "gpt-4o");
            std::env::set_var("MAX_CONCURRENT_CRAWLS", "5");
            std::env::set_var("PORT", "9100");
        }

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.llm.model, "gpt-4o");
        assert_eq!(settings.max_concurrent_crawls, 5);
        assert_eq!(settings.listen_addr.port(), 9100);
        clear_env();
    }

    #[test]
    fn test_from_env_rejects_zero_concurrency() {
        let _guard = TEST_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var(API_KEY_ENV_VAR, "sk-test");
            std::env::set_var("MAX_CONCURRENT_CRAWLS", "0");
        }

        assert!(matches!(
            Settings::from_env(),
            Err(ConfigError::MaxConcurrency(MaxConcurrencyError::NonPositive))
        ));
        clear_env();
    }
}
