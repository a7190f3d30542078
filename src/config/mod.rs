//! Runtime configuration: defaults, `.ledisrc` file, then environment.

use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;

pub const DEFAULT_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(default_config_path())
    }

    /// Load using an explicit rc file. Environment variables still take precedence.
    pub fn load_from(config_path: PathBuf) -> Self {
        let mut map = default_map();

        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                merge_rc_lines(&mut map, BufReader::new(file));
            }
        }

        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if let Ok(v) = env::var(key) {
            return Some(v);
        }
        self.inner.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn server_url(&self) -> String {
        self.get("LEDIS_URL").unwrap_or_else(|| DEFAULT_URL.to_string())
    }

    /// `None` when unset or `0`: requests wait forever.
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.get_u64("REQUEST_TIMEOUT") {
            Some(0) | None => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        }
    }

    pub fn ordered_replies(&self) -> bool {
        self.get_bool("ORDERED_REPLIES")
    }

    pub fn bind_addr(&self) -> String {
        self.get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string())
    }

    pub fn static_dir(&self) -> Option<PathBuf> {
        self.get("STATIC_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    }

    pub fn gc_interval(&self) -> Duration {
        let ms = self.get_u64("GC_INTERVAL_MS").filter(|ms| *ms > 0).unwrap_or(1000);
        Duration::from_millis(ms)
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.get("LOG_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    }
}

fn merge_rc_lines<R: BufRead>(map: &mut HashMap<String, String>, reader: R) {
    for line in reader.lines().map_while(Result::ok) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            map.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "REQUEST_TIMEOUT",
        "ORDERED_REPLIES",
        "BIND_ADDR",
        "STATIC_DIR",
        "GC_INTERVAL_MS",
        "LOG_LEVEL",
        "LOG_FILE",
    ];

    KEYS.contains(&k) || k.starts_with("LEDIS_")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join(".ledisrc")
}

fn config_dir() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| Path::new("~/.config").to_path_buf());
    base.join("ledis")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    m.insert("LEDIS_URL".into(), DEFAULT_URL.into());
    m.insert("BIND_ADDR".into(), "0.0.0.0:8080".into());
    m.insert("STATIC_DIR".into(), "frontend".into());

    m.insert("REQUEST_TIMEOUT".into(), "0".into());
    m.insert("GC_INTERVAL_MS".into(), "1000".into());

    m.insert("ORDERED_REPLIES".into(), "false".into());

    m
}
