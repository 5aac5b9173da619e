use std::path::PathBuf;

use crate::color::Palette;
use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DATA_PATH: &str = "data/especies.xlsx";

/// Process configuration, passed explicitly to everything that needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub palette: Palette,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            palette: Palette::ecological(),
        }
    }
}

impl DashboardConfig {
    /// Read `.env` (if any) and then the process environment.
    ///
    /// | variable            | default              |
    /// |---------------------|----------------------|
    /// | `PORT`              | `8080`               |
    /// | `DASHBOARD_HOST`    | `0.0.0.0`            |
    /// | `DASHBOARD_DATA`    | `data/especies.xlsx` |
    /// | `DASHBOARD_PALETTE` | ecological palette   |
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("ignoring unreadable .env file: {e}"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(port) = get("PORT") {
            config.port = port
                .parse()
                .map_err(|source| ConfigError::Port { value: port, source })?;
        }
        if let Some(host) = get("DASHBOARD_HOST") {
            config.host = host;
        }
        if let Some(path) = get("DASHBOARD_DATA") {
            config.data_path = PathBuf::from(path);
        }
        if let Some(list) = get("DASHBOARD_PALETTE") {
            config.palette = Palette::parse_list(&list)?;
        }
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn environment_overrides() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("PORT", "5000"),
            ("DASHBOARD_DATA", "/srv/capturas.csv"),
            ("DASHBOARD_PALETTE", "#000000, #FFFFFF"),
            ("DASHBOARD_HOST", "  "),
        ]))
        .unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.data_path, PathBuf::from("/srv/capturas.csv"));
        assert_eq!(config.palette.len(), 2);
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            DashboardConfig::from_lookup(lookup(&[("PORT", "eighty")])),
            Err(ConfigError::Port { .. })
        ));
        assert!(matches!(
            DashboardConfig::from_lookup(lookup(&[("DASHBOARD_PALETTE", "green")])),
            Err(ConfigError::Color(_))
        ));
    }
}
