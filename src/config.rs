use std::path::PathBuf;

use crate::error::{Result, TimetableError};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind: String,
    pub port: u16,
    pub static_dir: PathBuf,
    /// Schedule CSV loaded at startup, if any
    pub schedule_csv: Option<PathBuf>,
    /// Room inventory CSV loaded at startup, if any
    pub rooms_csv: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("static"),
            schedule_csv: None,
            rooms_csv: None,
        }
    }
}

impl AppConfig {
    /// Reads `TIMETABLE_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(bind) = non_empty(lookup("TIMETABLE_BIND")) {
            config.bind = bind;
        }
        if let Some(port) = non_empty(lookup("TIMETABLE_PORT")) {
            config.port = parse_port("TIMETABLE_PORT", &port)?;
        }
        if let Some(dir) = non_empty(lookup("TIMETABLE_STATIC_DIR")) {
            config.static_dir = PathBuf::from(dir);
        }
        config.schedule_csv = non_empty(lookup("TIMETABLE_SCHEDULE_CSV")).map(PathBuf::from);
        config.rooms_csv = non_empty(lookup("TIMETABLE_ROOMS_CSV")).map(PathBuf::from);

        Ok(config)
    }

    /// Applies a port given on the command line; it wins over the environment.
    pub fn with_port_arg(mut self, arg: Option<&str>) -> Result<Self> {
        if let Some(port) = arg {
            self.port = parse_port("port argument", port)?;
        }
        Ok(self)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_port(key: &str, value: &str) -> Result<u16> {
    value.trim().parse::<u16>().map_err(|e| TimetableError::Config {
        key: key.to_string(),
        message: format!("`{}` is not a valid port ({})", value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn reads_all_variables() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TIMETABLE_BIND", "127.0.0.1"),
            ("TIMETABLE_PORT", "9000"),
            ("TIMETABLE_STATIC_DIR", "public"),
            ("TIMETABLE_SCHEDULE_CSV", "data/horario.csv"),
            ("TIMETABLE_ROOMS_CSV", " "),
        ]))
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.schedule_csv, Some(PathBuf::from("data/horario.csv")));
        assert_eq!(config.rooms_csv, None);
    }

    #[test]
    fn rejects_invalid_port() {
        let err = AppConfig::from_lookup(lookup_from(&[("TIMETABLE_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, TimetableError::Config { .. }));
    }

    #[test]
    fn port_argument_overrides_environment() {
        let config = AppConfig::from_lookup(lookup_from(&[("TIMETABLE_PORT", "9000")]))
            .unwrap()
            .with_port_arg(Some("3000"))
            .unwrap();
        assert_eq!(config.port, 3000);
        assert!(AppConfig::default().with_port_arg(Some("99999")).is_err());
    }
}
