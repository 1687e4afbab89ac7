use std::path::PathBuf;

use crate::api::ApiConfig;

/// Everything the application reads at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub output_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let output_dir = std::env::var_os("MEDIA_DL_OUTPUT_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_output_dir);

        Self {
            api: ApiConfig::from_env(),
            output_dir,
        }
    }
}

/// The user's download folder, or the working directory when there is none
pub fn default_output_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
