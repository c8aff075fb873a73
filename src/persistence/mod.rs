use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::Result;

const APP_NAME: &str = "anki-card-translator";
const CONFIG_FILE: &str = "config.json";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        data_dir.join(APP_NAME)
    } else {
        PathBuf::from(".")
    }
}

pub fn default_config_path() -> PathBuf {
    get_app_data_dir().join(CONFIG_FILE)
}

pub fn save_json<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    log::debug!("Data saved to: {}", path.display());
    Ok(())
}

/// `Ok(None)` when the file does not exist yet.
pub fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(path)?;
    let data: T = serde_json::from_str(&json)?;
    log::debug!("Data loaded from: {}", path.display());
    Ok(Some(data))
}

pub fn delete_data_file(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_file(path)?;
        log::debug!("Deleted: {}", path.display());
        return Ok(true);
    }
    Ok(false)
}
