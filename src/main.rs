use std::path::PathBuf;
use std::process;

use log::{error, LevelFilter};

use hytes_geotiff::commands::{build_cli, usage_exit_code, CommandFactory, HytesCommandFactory};
use hytes_geotiff::errors::{EXIT_INPUT_PARSE, EXIT_SUCCESS};
use hytes_geotiff::utils::logger::Logger;

fn main() {
    let matches = match build_cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let code = usage_exit_code(&e);
            let _ = e.print();
            process::exit(code);
        }
    };

    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_file = matches.get_one::<String>("log-file").map(PathBuf::from);

    if let Err(e) = Logger::init_global_logger(log_file.as_deref(), level) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(EXIT_INPUT_PARSE);
    }

    let factory = HytesCommandFactory::new();
    let result = factory.create_command(&matches).and_then(|command| command.execute());

    match result {
        Ok(()) => process::exit(EXIT_SUCCESS),
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}
