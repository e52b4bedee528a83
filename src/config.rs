use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub translate_base_url: String,
    pub vertex_location: String,
    pub vertex_model: String,
    /// Empty means `https://{vertex_location}-aiplatform.googleapis.com`.
    pub vertex_base_url: String,
    pub source_lang: String,
    pub target_lang: String,
    /// Pause before each network call. 0 disables it.
    pub request_delay_ms: u64,
    pub flash_duration_ms: u64,
    pub http_timeout_secs: u64,
    /// Persisted form fields, relative to the executable's directory.
    pub form_file: String,
    /// Used when the persisted form has no project id yet.
    pub default_project_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translate_base_url: "https://translation.googleapis.com".to_string(),
            vertex_location: "us-central1".to_string(),
            vertex_model: "gemini-1.5-flash-002".to_string(),
            vertex_base_url: String::new(),
            source_lang: "pt".to_string(),
            target_lang: "en".to_string(),
            request_delay_ms: 1000,
            flash_duration_ms: 3000,
            http_timeout_secs: 30,
            form_file: "form.json".to_string(),
            default_project_id: String::new(),
        }
    }
}

pub fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    pub fn path() -> PathBuf {
        exe_dir().join("config.json")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str::<Config>(&s).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let s = serde_json::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }

    /// Env vars override the file when set and non-empty.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| var(key).filter(|v| !v.is_empty());
        if let Some(v) = var("PTCOPYEDIT_PROJECT_ID") { self.default_project_id = v; }
        if let Some(v) = var("PTCOPYEDIT_MODEL") { self.vertex_model = v; }
        if let Some(v) = var("PTCOPYEDIT_LOCATION") { self.vertex_location = v; }
        if let Some(v) = var("PTCOPYEDIT_DELAY_MS") {
            match v.parse() {
                Ok(ms) => self.request_delay_ms = ms,
                Err(_) => tracing::warn!(value = %v, "ignoring non-numeric PTCOPYEDIT_DELAY_MS"),
            }
        }
    }

    pub fn form_path(&self) -> PathBuf {
        let p = PathBuf::from(&self.form_file);
        if p.is_absolute() { p } else { exe_dir().join(p) }
    }

    pub fn translate_endpoint(&self, project_id: &str) -> String {
        format!(
            "{}/v3/projects/{}:translateText",
            self.translate_base_url.trim_end_matches('/'),
            project_id
        )
    }

    pub fn generate_endpoint(&self, project_id: &str) -> String {
        let base = if self.vertex_base_url.is_empty() {
            format!("https://{}-aiplatform.googleapis.com", self.vertex_location)
        } else {
            self.vertex_base_url.trim_end_matches('/').to_string()
        };
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            base, project_id, self.vertex_location, self.vertex_model
        )
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_the_google_url_layout() {
        let cfg = Config::default();
        assert_eq!(
            cfg.translate_endpoint("my-proj"),
            "https://translation.googleapis.com/v3/projects/my-proj:translateText"
        );
        assert_eq!(
            cfg.generate_endpoint("my-proj"),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/my-proj/locations/us-central1/publishers/google/models/gemini-1.5-flash-002:generateContent"
        );
    }

    #[test]
    fn explicit_vertex_base_url_wins() {
        let cfg = Config {
            vertex_base_url: "http://127.0.0.1:9000/".to_string(),
            ..Config::default()
        };
        assert!(cfg
            .generate_endpoint("p")
            .starts_with("http://127.0.0.1:9000/v1/projects/p/"));
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"request_delay_ms": 0}"#).unwrap();
        let cfg = Config::load_from(&path);
        assert_eq!(cfg.request_delay_ms, 0);
        assert_eq!(cfg.vertex_model, "gemini-1.5-flash-002");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(Config::load_from(&path).flash_duration_ms, 3000);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let cfg = Config { vertex_model: "gemini-2.0".into(), ..Config::default() };
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).vertex_model, "gemini-2.0");
    }

    #[test]
    fn env_overrides_skip_empty_and_bad_values() {
        let mut cfg = Config::default();
        cfg.apply_overrides(|key| match key {
            "PTCOPYEDIT_MODEL" => Some("gemini-pro".into()),
            "PTCOPYEDIT_LOCATION" => Some(String::new()),
            "PTCOPYEDIT_DELAY_MS" => Some("soon".into()),
            _ => None,
        });
        assert_eq!(cfg.vertex_model, "gemini-pro");
        assert_eq!(cfg.vertex_location, "us-central1");
        assert_eq!(cfg.request_delay_ms, 1000);
    }
}
