//! Conversion configuration
//!
//! Every path and option of a run lives in [`ConversionConfig`]. Values come
//! from an optional TOML file and from the command line, layered with
//! [`ConfigLayer`] so command-line values win.
//!
//! ```toml
//! [input]
//! data = "scene_L2.hdf5"
//! geolocation = "scene_geo.dat"
//! header = "scene_geo.hdr"
//! temperature_keys = ["L2_LST"]
//!
//! [output]
//! path = "out/"
//! compression = "deflate"
//!
//! [processing]
//! progress = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::{ConvertError, ConvertResult};
use crate::loader::DEFAULT_TEMPERATURE_KEYS;

/// Strip compression used when none is configured
pub const DEFAULT_COMPRESSION: &str = "none";

/// Extensions removed from the data file name when deriving the output name
const DATA_EXTENSIONS: [&str; 2] = [".hdf5", ".h5"];

/// A complete, validated conversion configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConfig {
    /// Level-2 data file holding the temperature dataset
    pub data: PathBuf,
    /// Geolocation binary
    pub geolocation: PathBuf,
    /// Header describing the geolocation binary
    pub header: PathBuf,
    /// Output file, or an existing directory to place it in
    pub output: PathBuf,
    /// Temperature dataset keys, tried in order
    pub temperature_keys: Vec<String>,
    /// Strip compression name
    pub compression: String,
    /// Draw progress bars
    pub progress: bool,
}

impl ConversionConfig {
    /// Configuration with default options
    pub fn new(
        data: impl Into<PathBuf>,
        geolocation: impl Into<PathBuf>,
        header: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        ConversionConfig {
            data: data.into(),
            geolocation: geolocation.into(),
            header: header.into(),
            output: output.into(),
            temperature_keys: DEFAULT_TEMPERATURE_KEYS.iter().map(|k| k.to_string()).collect(),
            compression: DEFAULT_COMPRESSION.to_string(),
            progress: true,
        }
    }

    /// Output file path
    ///
    /// When `output` is an existing directory the file is named after the
    /// data file, see [`output_file_name`].
    pub fn output_path(&self) -> PathBuf {
        if self.output.is_dir() {
            self.output.join(output_file_name(&self.data))
        } else {
            self.output.clone()
        }
    }
}

/// `<stem>.tif` for a data file, dropping any `.hdf5`/`.h5` suffixes
pub fn output_file_name(data: &Path) -> String {
    let mut stem = data.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    while let Some(ext) = DATA_EXTENSIONS.iter().find(|ext| {
        stem.len() > ext.len() && stem.to_ascii_lowercase().ends_with(*ext)
    }) {
        stem.truncate(stem.len() - ext.len());
    }

    format!("{}.tif", stem)
}

/// A partial configuration from one source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigLayer {
    pub data: Option<PathBuf>,
    pub geolocation: Option<PathBuf>,
    pub header: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub temperature_keys: Option<Vec<String>>,
    pub compression: Option<String>,
    pub progress: Option<bool>,
}

impl ConfigLayer {
    /// Read a TOML configuration file
    ///
    /// Relative paths in the file are taken relative to the file's directory.
    pub fn from_file(path: &Path) -> ConvertResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| ConvertError::input_read(path, e))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        debug!("Loading configuration from {}", path.display());
        Self::from_toml_str(&text, base)
    }

    /// Parse TOML text, resolving relative paths against `base`
    pub fn from_toml_str(text: &str, base: &Path) -> ConvertResult<Self> {
        let value: toml::Value = text.parse()
            .map_err(|e: toml::de::Error| ConvertError::Config(format!("invalid TOML: {}", e)))?;

        let input = section(&value, "input")?;
        let output = section(&value, "output")?;
        let processing = section(&value, "processing")?;

        let path_of = |table: Option<&toml::value::Table>, section: &str, key: &str| -> ConvertResult<Option<PathBuf>> {
            Ok(string_value(table, section, key)?.map(|s| resolve(base, &s)))
        };

        Ok(ConfigLayer {
            data: path_of(input, "input", "data")?,
            geolocation: path_of(input, "input", "geolocation")?,
            header: path_of(input, "input", "header")?,
            output: path_of(output, "output", "path")?,
            temperature_keys: string_list(input, "input", "temperature_keys")?,
            compression: string_value(output, "output", "compression")?,
            progress: bool_value(processing, "processing", "progress")?,
        })
    }

    /// Layer `other` on top of `self`; values set in `other` win
    pub fn merge(self, other: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            data: other.data.or(self.data),
            geolocation: other.geolocation.or(self.geolocation),
            header: other.header.or(self.header),
            output: other.output.or(self.output),
            temperature_keys: other.temperature_keys.or(self.temperature_keys),
            compression: other.compression.or(self.compression),
            progress: other.progress.or(self.progress),
        }
    }

    /// Complete configuration, failing on a missing path
    pub fn build(self) -> ConvertResult<ConversionConfig> {
        let required = |value: Option<PathBuf>, name: &str| {
            value.ok_or_else(|| ConvertError::Config(format!("missing {} path", name)))
        };

        let mut config = ConversionConfig::new(
            required(self.data, "data")?,
            required(self.geolocation, "geolocation")?,
            required(self.header, "header")?,
            required(self.output, "output")?,
        );

        if let Some(keys) = self.temperature_keys {
            if keys.is_empty() {
                return Err(ConvertError::Config("temperature_keys must not be empty".to_string()));
            }
            config.temperature_keys = keys;
        }
        if let Some(compression) = self.compression {
            config.compression = compression;
        }
        if let Some(progress) = self.progress {
            config.progress = progress;
        }

        Ok(config)
    }
}

fn resolve(base: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_relative() {
        base.join(path)
    } else {
        path
    }
}

fn section<'a>(value: &'a toml::Value, name: &str) -> ConvertResult<Option<&'a toml::value::Table>> {
    match value.get(name) {
        None => Ok(None),
        Some(v) => v.as_table()
            .map(Some)
            .ok_or_else(|| ConvertError::Config(format!("[{}] must be a table", name))),
    }
}

fn string_value(table: Option<&toml::value::Table>, section: &str, key: &str) -> ConvertResult<Option<String>> {
    match table.and_then(|t| t.get(key)) {
        None => Ok(None),
        Some(v) => v.as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ConvertError::Config(format!("{}.{} must be a string", section, key))),
    }
}

fn string_list(table: Option<&toml::value::Table>, section: &str, key: &str) -> ConvertResult<Option<Vec<String>>> {
    let Some(value) = table.and_then(|t| t.get(key)) else {
        return Ok(None);
    };
    let not_list = || ConvertError::Config(format!("{}.{} must be a list of strings", section, key));

    let items = value.as_array().ok_or_else(not_list)?;
    items.iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(not_list))
        .collect::<ConvertResult<Vec<String>>>()
        .map(Some)
}

fn bool_value(table: Option<&toml::value::Table>, section: &str, key: &str) -> ConvertResult<Option<bool>> {
    match table.and_then(|t| t.get(key)) {
        None => Ok(None),
        Some(v) => v.as_bool()
            .map(Some)
            .ok_or_else(|| ConvertError::Config(format!("{}.{} must be true or false", section, key))),
    }
}
