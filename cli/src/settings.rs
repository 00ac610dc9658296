use client::ClientOptions;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use telemetry::TelemetryConfig;

#[derive(Debug, Deserialize)]
#[allow(unused)]
pub struct Api {
    pub base_url: String,
    pub graphql_path: String,
    pub track_path: String,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6543".into(),
            graphql_path: "/graphql".into(),
            track_path: "/api/track".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[allow(unused)]
pub struct Otlp {
    pub endpoint: String,
    pub service_name: String,
}

impl Default for Otlp {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4318".into(),
            service_name: "eventflow-cli".into(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[allow(unused)]
pub struct Settings {
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub otlp: Otlp,
}

impl Settings {
    pub(crate) fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("api.base_url", "http://localhost:6543")?
            .set_default("api.graphql_path", "/graphql")?
            .set_default("api.track_path", "/api/track")?
            .set_default("otlp.endpoint", "http://localhost:4318")?
            .set_default("otlp.service_name", "eventflow-cli")?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::default().separator("_"))
            .build()?;

        config.try_deserialize()
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.api.base_url.clone(),
            graphql_path: self.api.graphql_path.clone(),
            track_path: self.api.track_path.clone(),
        }
    }

    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig::default()
            .with_endpoint(self.otlp.endpoint.clone())
            .with_service_name(self.otlp.service_name.clone())
    }
}
