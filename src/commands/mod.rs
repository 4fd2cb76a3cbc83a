//! CLI command implementations
//!
//! This module contains implementations of the commands supported by the
//! CLI application using the Command pattern.

pub mod command_traits;
pub mod convert_command;
pub mod inspect_command;

pub use command_traits::{Command, CommandFactory};
pub use convert_command::ConvertCommand;
pub use inspect_command::InspectCommand;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use crate::errors::{ConvertResult, EXIT_INPUT_PARSE, EXIT_SUCCESS};

/// Command-line interface of `hytes2tiff`
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("hytes2tiff")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert a HyTES Level-2 surface temperature product into a WGS84 GeoTIFF")
        .arg(
            Arg::new("data")
                .help("Level-2 data file (HDF5) holding the temperature dataset")
                .value_name("DATA")
                .index(1)
                .required_unless_present_any(["inspect", "config"]),
        )
        .arg(
            Arg::new("geolocation")
                .help("Geolocation binary (.dat)")
                .value_name("GEO")
                .index(2)
                .required_unless_present_any(["inspect", "config"]),
        )
        .arg(
            Arg::new("header")
                .help("Header of the geolocation binary (.hdr)")
                .value_name("HDR")
                .index(3)
                .required_unless_present_any(["inspect", "config"]),
        )
        .arg(
            Arg::new("output")
                .help("Output GeoTIFF, or an existing directory to write <stem>.tif into")
                .value_name("OUTPUT")
                .index(4)
                .required_unless_present_any(["inspect", "config"]),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML configuration file; command-line values take precedence")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("compression")
                .long("compression")
                .help("Strip compression (none, deflate, zstd)")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("key")
                .long("key")
                .help("Temperature dataset key to try; repeat to give several in order")
                .value_name("NAME")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Also write log records to this file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-progress")
                .long("no-progress")
                .help("Do not draw progress bars")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("inspect")
                .long("inspect")
                .help("Summarise an existing GeoTIFF instead of converting")
                .value_name("FILE"),
        )
}

/// Exit code for a command line clap refused to parse
///
/// Help and version requests succeed; every usage error is an input-parse
/// failure so that it never collides with the dataset-not-found code.
pub fn usage_exit_code(error: &clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
        _ => EXIT_INPUT_PARSE,
    }
}

/// Factory for creating command instances based on CLI arguments
#[derive(Debug, Default)]
pub struct HytesCommandFactory;

impl HytesCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        HytesCommandFactory
    }
}

impl CommandFactory for HytesCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> ConvertResult<Box<dyn Command>> {
        if args.get_one::<String>("inspect").is_some() {
            Ok(Box::new(InspectCommand::new(args)?))
        } else {
            Ok(Box::new(ConvertCommand::new(args)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = build_cli()
            .try_get_matches_from(["hytes2tiff", "scene.hdf5", "geo.dat", "geo.hdr", "out.tif",
                                   "--key", "LST", "--key", "L2_LST", "--compression", "zstd", "--no-progress"])
            .unwrap();

        let command = ConvertCommand::new(&args).unwrap();
        let config = command.config();
        assert_eq!(config.data, std::path::PathBuf::from("scene.hdf5"));
        assert_eq!(config.output, std::path::PathBuf::from("out.tif"));
        assert_eq!(config.temperature_keys, ["LST", "L2_LST"]);
        assert_eq!(config.compression, "zstd");
        assert!(!config.progress);
    }

    #[test]
    fn test_paths_are_required_without_config() {
        assert!(build_cli().try_get_matches_from(["hytes2tiff", "scene.hdf5"]).is_err());
        assert!(build_cli().try_get_matches_from(["hytes2tiff", "--inspect", "out.tif"]).is_ok());
    }

    #[test]
    fn test_usage_errors_exit_as_input_failures() {
        let missing = build_cli().try_get_matches_from(["hytes2tiff", "only_one"]).unwrap_err();
        assert_eq!(usage_exit_code(&missing), EXIT_INPUT_PARSE);

        let unknown = build_cli().try_get_matches_from(["hytes2tiff", "--bogus"]).unwrap_err();
        assert_eq!(usage_exit_code(&unknown), EXIT_INPUT_PARSE);

        let help = build_cli().try_get_matches_from(["hytes2tiff", "--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&help), EXIT_SUCCESS);

        let version = build_cli().try_get_matches_from(["hytes2tiff", "--version"]).unwrap_err();
        assert_eq!(usage_exit_code(&version), EXIT_SUCCESS);
    }

    #[test]
    fn test_config_file_supplies_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("run.toml");
        std::fs::write(&config_path, "[input]\ndata = \"a.hdf5\"\ngeolocation = \"g.dat\"\nheader = \"g.hdr\"\n[output]\npath = \"a.tif\"\ncompression = \"deflate\"\n").unwrap();

        let args = build_cli()
            .try_get_matches_from(["hytes2tiff", "--config", config_path.to_str().unwrap(), "--compression", "none"])
            .unwrap();
        let command = ConvertCommand::new(&args).unwrap();

        assert_eq!(command.config().header, dir.path().join("g.hdr"));
        assert_eq!(command.config().compression, "none");
    }
}
