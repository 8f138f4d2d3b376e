use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub wompi: WompiConfig,
    pub twilio: TwilioConfig,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WompiConfig {
    pub public_key: String,
    pub private_key: String,
    pub integrity_key: String,
    pub base_url: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub whatsapp_from: String,
    #[serde(default)]
    pub template_sid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str)
                    .map_err(|e| format!("Failed to parse configuration file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No config file: build from environment with defaults
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 3000u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        token_expires_in: get_env_parse("JWT_EXPIRES_IN", 86_400i64),
                    },
                    wompi: WompiConfig {
                        public_key: get_env("WOMPI_PUBLIC_KEY").unwrap_or_default(),
                        private_key: get_env("WOMPI_PRIVATE_KEY").unwrap_or_default(),
                        integrity_key: get_env("WOMPI_INTEGRITY_KEY").unwrap_or_default(),
                        base_url: get_env("WOMPI_BASE_URL")
                            .unwrap_or_else(|| "https://api.wompi.co/v1".to_string()),
                        redirect_url: get_env("WOMPI_REDIRECT_URL")
                            .unwrap_or_else(|| "https://tiendasupercasa.com/".to_string()),
                    },
                    twilio: TwilioConfig {
                        account_sid: get_env("TWILIO_ACCOUNT_SID").unwrap_or_default(),
                        auth_token: get_env("TWILIO_AUTH_TOKEN").unwrap_or_default(),
                        whatsapp_from: get_env("TWILIO_WHATSAPP_NUMBER").unwrap_or_default(),
                        template_sid: get_env("WHATSAPP_TEMPLATE_SID"),
                    },
                    openai: OpenAiConfig {
                        api_key: get_env("OPENAI_API_KEY").unwrap_or_default(),
                        model: get_env("OPENAI_MODEL")
                            .unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
                        base_url: get_env("OPENAI_BASE_URL")
                            .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
                    },
                }
            }
            Err(e) => {
                return Err(format!("Failed to read configuration file {config_path}: {e}").into());
            }
        };

        // Environment overrides apply even when a file exists
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.token_expires_in = n;
        }
        if let Ok(v) = env::var("WOMPI_PUBLIC_KEY") {
            config.wompi.public_key = v;
        }
        if let Ok(v) = env::var("WOMPI_PRIVATE_KEY") {
            config.wompi.private_key = v;
        }
        if let Ok(v) = env::var("WOMPI_INTEGRITY_KEY") {
            config.wompi.integrity_key = v;
        }
        if let Ok(v) = env::var("WOMPI_BASE_URL") {
            config.wompi.base_url = v;
        }
        if let Ok(v) = env::var("WOMPI_REDIRECT_URL") {
            config.wompi.redirect_url = v;
        }
        if let Ok(v) = env::var("TWILIO_ACCOUNT_SID") {
            config.twilio.account_sid = v;
        }
        if let Ok(v) = env::var("TWILIO_AUTH_TOKEN") {
            config.twilio.auth_token = v;
        }
        if let Ok(v) = env::var("TWILIO_WHATSAPP_NUMBER") {
            config.twilio.whatsapp_from = v;
        }
        if let Ok(v) = env::var("WHATSAPP_TEMPLATE_SID") {
            config.twilio.template_sid = Some(v);
        }
        if let Ok(v) = env::var("OPENAI_API_KEY") {
            config.openai.api_key = v;
        }
        if let Ok(v) = env::var("OPENAI_MODEL") {
            config.openai.model = v;
        }
        if let Ok(v) = env::var("OPENAI_BASE_URL") {
            config.openai.base_url = v;
        }

        Ok(config)
    }
}
