//! Handles settings for the application. Configuration is read from
//! `settings.toml` (optional) with `OBLIGO_`-prefixed environment variables
//! taking precedence, e.g. `OBLIGO_SERVER__PORT=8080`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 3000_i64)?
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("OBLIGO").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
