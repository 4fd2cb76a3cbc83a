//! Product conversion command
//!
//! Turns the command-line arguments, layered over an optional TOML file,
//! into a [`ConversionConfig`] and runs the conversion.

use std::path::PathBuf;

use clap::ArgMatches;
use log::info;

use crate::api;
use crate::commands::command_traits::Command;
use crate::config::{ConfigLayer, ConversionConfig};
use crate::errors::ConvertResult;

/// Command converting one HyTES product into a GeoTIFF
pub struct ConvertCommand {
    config: ConversionConfig,
}

impl ConvertCommand {
    /// Create a new convert command
    ///
    /// Values given on the command line override those of `--config`.
    pub fn new(args: &ArgMatches) -> ConvertResult<Self> {
        let file_layer = match args.get_one::<String>("config") {
            Some(path) => ConfigLayer::from_file(&PathBuf::from(path))?,
            None => ConfigLayer::default(),
        };

        let config = file_layer.merge(Self::cli_layer(args)).build()?;
        Ok(ConvertCommand { config })
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    fn cli_layer(args: &ArgMatches) -> ConfigLayer {
        let path = |id: &str| args.get_one::<String>(id).map(PathBuf::from);

        let keys: Vec<String> = args.get_many::<String>("key")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        ConfigLayer {
            data: path("data"),
            geolocation: path("geolocation"),
            header: path("header"),
            output: path("output"),
            temperature_keys: if keys.is_empty() { None } else { Some(keys) },
            compression: args.get_one::<String>("compression").cloned(),
            progress: if args.get_flag("no-progress") { Some(false) } else { None },
        }
    }
}

impl Command for ConvertCommand {
    fn execute(&self) -> ConvertResult<()> {
        info!("Converting {} with geolocation {} ({})",
              self.config.data.display(), self.config.geolocation.display(), self.config.header.display());

        let report = api::convert(&self.config)?;
        println!("{}", report);

        info!("Conversion successful");
        Ok(())
    }
}
