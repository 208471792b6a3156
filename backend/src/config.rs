use log::warn;
use std::path::PathBuf;

/// Runtime settings of the server, read from `FORMS_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Maximum accepted JSON body, in bytes.
    pub json_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from("forms.sqlite"),
            json_limit: 1024 * 1024, // 1 MB
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset keys keep their default;
    /// unparseable numbers are reported and fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("FORMS_HOST").unwrap_or(defaults.host),
            port: parse_or("FORMS_PORT", lookup("FORMS_PORT"), defaults.port),
            database_path: lookup("FORMS_DATABASE")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            json_limit: parse_or(
                "FORMS_JSON_LIMIT",
                lookup("FORMS_JSON_LIMIT"),
                defaults.json_limit,
            ),
        }
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_or<T: std::str::FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default", key, raw);
            default
        }),
    }
}
