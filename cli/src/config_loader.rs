use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use framer_application::error::{AppError, AppResult};
use framer_application::infrastructure_config::Config;
use std::fs;
use std::path::Path;

pub const ENV_PREFIX: &str = "FRAMER_";

/// Whether `.env` was generated from `.env.example` during loading.
pub struct LoadedConfig {
    pub config: Config,
    pub generated_env_file: bool,
}

pub fn load_config() -> AppResult<LoadedConfig> {
    let generated_env_file = generate_env_template_if_missing()?;

    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if Path::new("config.toml").exists() {
        figment = figment.merge(Toml::file("config.toml"));
    }

    if Path::new("config.json").exists() {
        figment = figment.merge(Json::file("config.json"));
    }

    let config = extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))?;

    Ok(LoadedConfig {
        config,
        generated_env_file,
    })
}

fn extract(figment: Figment) -> AppResult<Config> {
    let config: Config = figment.extract().map_err(|e| AppError::ConfigError {
        message: format!("Failed to load configuration: {e}"),
    })?;

    config.validate()?;
    Ok(config)
}

fn generate_env_template_if_missing() -> AppResult<bool> {
    let env_file = ".env";
    let template_file = ".env.example";

    if Path::new(env_file).exists() || !Path::new(template_file).exists() {
        return Ok(false);
    }

    fs::copy(template_file, env_file).map_err(|e| AppError::ConfigError {
        message: format!("Failed to generate .env file from template: {e}"),
    })?;

    Ok(true)
}
