//! `splatprep.toml` loading.
//!
//! Lookup order:
//! 1. `--config <path>`
//! 2. `SPLATPREP_CONFIG` environment variable
//! 3. `./splatprep.toml`, if it exists
//!
//! With none of these the built-in defaults apply. Command-line flags are
//! applied on top by the commands themselves.

use serde::Deserialize;
use splatprep_colmap::CameraExportOptions;
use splatprep_sampling::{DEFAULT_BITS, MAX_BITS};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const CONFIG_ENV: &str = "SPLATPREP_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "splatprep.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub subsample: SubsampleConfig,
    pub ply: PlyConfig,
    pub cameras: CamerasConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubsampleConfig {
    pub target_count: usize,
    pub bits: u32,
}

impl Default for SubsampleConfig {
    fn default() -> Self {
        Self {
            target_count: 15_000,
            bits: DEFAULT_BITS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlyConfig {
    /// Write binary_little_endian instead of ascii.
    pub binary: bool,
}

impl Default for PlyConfig {
    fn default() -> Self {
        Self { binary: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CamerasConfig {
    pub camera_id: u32,
    pub model: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub image_extension: String,
}

impl Default for CamerasConfig {
    fn default() -> Self {
        let options = CameraExportOptions::default();
        Self {
            camera_id: options.camera_id,
            model: options.model,
            width: options.width,
            height: options.height,
            image_extension: options.image_extension,
        }
    }
}

impl CamerasConfig {
    pub fn export_options(&self) -> CameraExportOptions {
        CameraExportOptions {
            camera_id: self.camera_id,
            model: self.model.clone(),
            width: self.width,
            height: self.height,
            image_extension: self.image_extension.clone(),
        }
    }
}

impl Config {
    /// Parse and validate a TOML document. `path` only labels errors.
    pub fn from_toml_str(content: &str, path: &Path) -> ConfigResult<Self> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let s = &self.subsample;
        if s.target_count == 0 {
            return Err(ConfigError::Invalid(
                "subsample.target_count must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_BITS).contains(&s.bits) {
            return Err(ConfigError::Invalid(format!(
                "subsample.bits must be in 1..={}, got {}",
                MAX_BITS, s.bits
            )));
        }

        let c = &self.cameras;
        if c.camera_id == 0 {
            return Err(ConfigError::Invalid(
                "cameras.camera_id must be at least 1".to_string(),
            ));
        }
        if c.model.is_empty() || c.model.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "cameras.model must be a single word, got {:?}",
                c.model
            )));
        }
        if c.width == Some(0) || c.height == Some(0) {
            return Err(ConfigError::Invalid(
                "cameras.width and cameras.height must be positive".to_string(),
            ));
        }
        let ext = &c.image_extension;
        if ext.is_empty()
            || ext.starts_with('.')
            || ext.contains(|ch: char| ch == '/' || ch == '\\' || ch.is_whitespace())
        {
            return Err(ConfigError::Invalid(format!(
                "cameras.image_extension must be a bare extension like \"png\", got {:?}",
                ext
            )));
        }
        Ok(())
    }
}

/// Pick the config file to read, if any.
pub fn locate_config(explicit: Option<&Path>) -> Option<PathBuf> {
    let cwd = env::current_dir().unwrap_or_default();
    locate_config_in(explicit, env::var_os(CONFIG_ENV), &cwd)
}

fn locate_config_in(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    cwd: &Path,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(value));
    }
    let local = cwd.join(DEFAULT_CONFIG_FILE);
    local.is_file().then_some(local)
}

/// Load the located config file, or defaults when there is none. An explicitly
/// named file that cannot be read is an error.
pub fn load_config(explicit: Option<&Path>) -> ConfigResult<Config> {
    match locate_config(explicit) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Config::load(&path)
        }
        None => {
            debug!("no config file, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(s: &str) -> ConfigResult<Config> {
        Config::from_toml_str(s, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.subsample.target_count, 15_000);
        assert_eq!(config.subsample.bits, 10);
        assert!(config.ply.binary);
        assert_eq!(config.cameras.export_options(), CameraExportOptions::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse(
            r#"
            [subsample]
            bits = 16

            [cameras]
            width = 1600
            height = 900
            image_extension = "jpg"
            "#,
        )
        .unwrap();
        assert_eq!(config.subsample.bits, 16);
        assert_eq!(config.subsample.target_count, 15_000);
        assert!(config.ply.binary);

        let options = config.cameras.export_options();
        assert_eq!(options.width, Some(1600));
        assert_eq!(options.height, Some(900));
        assert_eq!(options.image_name(3), "003.jpg");
        assert_eq!(options.model, "PINHOLE");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            parse("[subsample]\ncount = 5\n"),
            Err(ConfigError::Toml { .. })
        ));
        assert!(matches!(parse("[render]\n"), Err(ConfigError::Toml { .. })));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for doc in [
            "[subsample]\ntarget_count = 0\n",
            "[subsample]\nbits = 0\n",
            "[subsample]\nbits = 22\n",
            "[cameras]\ncamera_id = 0\n",
            "[cameras]\nmodel = \"\"\n",
            "[cameras]\nmodel = \"SIMPLE PINHOLE\"\n",
            "[cameras]\nwidth = 0\n",
            "[cameras]\nimage_extension = \".png\"\n",
            "[cameras]\nimage_extension = \"a/b\"\n",
        ] {
            assert!(
                matches!(parse(doc), Err(ConfigError::Invalid(_))),
                "accepted {doc:?}"
            );
        }
    }

    #[test]
    fn negative_count_is_a_toml_error() {
        assert!(matches!(
            parse("[subsample]\ntarget_count = -1\n"),
            Err(ConfigError::Toml { .. })
        ));
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "").unwrap();
        let explicit = Path::new("/somewhere/else.toml");
        assert_eq!(
            locate_config_in(Some(explicit), Some("env.toml".into()), dir.path()),
            Some(explicit.to_path_buf())
        );
    }

    #[test]
    fn env_var_beats_working_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "").unwrap();
        assert_eq!(
            locate_config_in(None, Some("env.toml".into()), dir.path()),
            Some(PathBuf::from("env.toml"))
        );
        assert_eq!(
            locate_config_in(None, Some(OsString::new()), dir.path()),
            Some(dir.path().join(DEFAULT_CONFIG_FILE))
        );
    }

    #[test]
    fn no_file_means_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(locate_config_in(None, None, dir.path()), None);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[ply]\nbinary = false\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert!(!config.ply.binary);
    }
}
