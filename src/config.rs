use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub admin_rps: u32,
    pub attempt_rps: u32,
    pub max_look_aways: u32,
    pub max_face_visibility_issues: u32,
    pub max_head_tilts: u32,
    pub max_heads_turned: u32,
    pub max_audio_incidents: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            admin_rps: get_env_parse("ADMIN_RPS")?,
            attempt_rps: get_env_parse("ATTEMPT_RPS")?,
            max_look_aways: get_env_parse_or("MAX_LOOK_AWAYS", 10)?,
            max_face_visibility_issues: get_env_parse_or("MAX_FACE_VISIBILITY_ISSUES", 5)?,
            max_head_tilts: get_env_parse_or("MAX_HEAD_TILTS", 15)?,
            max_heads_turned: get_env_parse_or("MAX_HEADS_TURNED", 15)?,
            max_audio_incidents: get_env_parse_or("MAX_AUDIO_INCIDENTS", 5)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
