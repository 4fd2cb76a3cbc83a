//! GeoTIFF inspection command

use std::path::PathBuf;

use clap::ArgMatches;
use log::debug;

use crate::api;
use crate::commands::command_traits::Command;
use crate::errors::{ConvertError, ConvertResult};

/// Command summarising a written raster
pub struct InspectCommand {
    input_file: PathBuf,
}

impl InspectCommand {
    pub fn new(args: &ArgMatches) -> ConvertResult<Self> {
        let input_file = args.get_one::<String>("inspect")
            .map(PathBuf::from)
            .ok_or_else(|| ConvertError::Config("Missing raster to inspect".to_string()))?;

        Ok(InspectCommand { input_file })
    }
}

impl Command for InspectCommand {
    fn execute(&self) -> ConvertResult<()> {
        debug!("Inspecting {}", self.input_file.display());
        let summary = api::inspect(&self.input_file)?;
        println!("{}", summary);
        Ok(())
    }
}
