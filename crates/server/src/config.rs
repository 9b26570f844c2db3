use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use shared::protocol::MAX_UPLOAD_BYTES;

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".into(),
            upload_dir: "./uploads".into(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.bind_addr = v.clone();
            }
            if let Some(v) = file_cfg.get("upload_dir") {
                settings.upload_dir = v.into();
            }
            if let Some(v) = file_cfg.get("max_upload_bytes") {
                if let Ok(parsed) = v.parse::<usize>() {
                    settings.max_upload_bytes = parsed;
                }
            }
        }
    }

    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }
    if let Ok(v) = std::env::var("APP__UPLOAD_DIR") {
        settings.upload_dir = v.into();
    }
    if let Ok(v) = std::env::var("APP__MAX_UPLOAD_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_upload_bytes = parsed;
        }
    }

    settings
}

pub fn prepare_upload_dir(upload_dir: &Path) -> Result<()> {
    fs::create_dir_all(upload_dir).with_context(|| {
        format!(
            "failed to create upload directory '{}'",
            upload_dir.display()
        )
    })
}
