use std::env;

use anyhow::Context;
use config::{Config, Environment, File};
use dotenvy::dotenv;
use folio_common::database::DatabaseSettings;
use serde::Deserialize;

use crate::domain::VerificationSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_port: String,
    pub app_url: String,
    pub app_key: String,
    #[serde(default = "default_verification_expire_minutes")]
    pub verification_expire_minutes: i64,
    pub database: DatabaseSettings,
}

fn default_verification_expire_minutes() -> i64 {
    60
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        let run_mode = load_env("RUN_MODE", "development");

        let s = Config::builder()
            .add_source(File::with_name("./config/default"))
            .add_source(File::with_name(&format!("./config/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("app").separator("__"))
            .build()?;

        s.try_deserialize().with_context(|| "failed to read config")
    }

    pub fn verification(&self) -> VerificationSettings {
        VerificationSettings {
            app_url: self.app_url.clone(),
            app_key: self.app_key.clone(),
            expire_minutes: self.verification_expire_minutes,
        }
    }
}

fn load_env(key: &str, default_value: &'static str) -> String {
    env::var(key).unwrap_or_else(|_| default_value.into())
}
