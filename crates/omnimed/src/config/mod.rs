pub mod loader;
pub mod schema;

pub use loader::{
    load_config, load_config_from_env, load_config_from_str, validate_config, ConfigFormat,
    CONFIG_ENV_VAR,
};
pub use schema::{
    Config, LoggingConfig, ModelsConfig, PipelineSettings, SessionConfig,
    PROMPT_CLINICAL_REASONING, PROMPT_VOICE_SUMMARY,
};
