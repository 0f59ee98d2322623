use log::LevelFilter;
use pandascore_api::client::PANDASCORE_BASE;
use std::path::PathBuf;

pub const APP_DIR: &str = "eswatch";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_token: Option<String>,
    pub api_base: String,
    pub data_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_token: None,
            api_base: PANDASCORE_BASE.to_string(),
            data_dir: PathBuf::from("."),
        }
    }
}

impl AppSettings {
    /// Reads `.env` (when present) and then the process environment.
    pub fn load() -> Self {
        let _ = dotenv::dotenv();
        Self::from_env(|key| std::env::var(key).ok())
    }

    pub fn from_env(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            full_screen: false,
            log_level: non_empty("ESWATCH_LOG").and_then(|l| l.parse().ok()),
            api_token: non_empty("PANDASCORE_TOKEN"),
            api_base: non_empty("ESWATCH_API_BASE").unwrap_or_else(|| PANDASCORE_BASE.to_string()),
            data_dir: data_dir(&non_empty),
        }
    }
}

fn data_dir(var: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = var("ESWATCH_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(xdg) = var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join(APP_DIR);
    }
    if let Some(home) = var("HOME") {
        return PathBuf::from(home).join(".config").join(APP_DIR);
    }
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_env(|key| vars.get(key).cloned())
    }

    #[test]
    fn data_dir_prefers_explicit_then_xdg_then_home() {
        assert_eq!(
            settings(&[("ESWATCH_DATA_DIR", "/data"), ("HOME", "/home/u")]).data_dir,
            PathBuf::from("/data")
        );
        assert_eq!(
            settings(&[("XDG_CONFIG_HOME", "/xdg"), ("HOME", "/home/u")]).data_dir,
            PathBuf::from("/xdg/eswatch")
        );
        assert_eq!(settings(&[("HOME", "/home/u")]).data_dir, PathBuf::from("/home/u/.config/eswatch"));
        assert_eq!(settings(&[]).data_dir, PathBuf::from("."));
    }

    #[test]
    fn token_base_and_log_level() {
        let s = settings(&[
            ("PANDASCORE_TOKEN", "  abc "),
            ("ESWATCH_API_BASE", "http://localhost:9000"),
            ("ESWATCH_LOG", "debug"),
        ]);
        assert_eq!(s.api_token.as_deref(), Some("abc"));
        assert_eq!(s.api_base, "http://localhost:9000");
        assert_eq!(s.log_level, Some(LevelFilter::Debug));

        let blank = settings(&[("PANDASCORE_TOKEN", "   "), ("ESWATCH_LOG", "loud")]);
        assert_eq!(blank.api_token, None);
        assert_eq!(blank.log_level, None);
        assert_eq!(blank.api_base, PANDASCORE_BASE);
    }
}
