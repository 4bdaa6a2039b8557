// `billdiff config`: validate and print configuration

use std::path::PathBuf;

use clap::Subcommand;

use billdiff_recon::ReconConfig;

use crate::{load_config, CliError};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Parse and validate a config file
    #[command(after_help = "\
Exit code 5 if the file does not parse or fails validation.

Examples:
  billdiff config validate vendor.toml")]
    Validate {
        /// Config file (TOML)
        file: PathBuf,
    },

    /// Print the effective config as TOML (defaults when no file is given)
    Show {
        /// Config file (TOML)
        file: Option<PathBuf>,
    },
}

pub fn cmd_config(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Validate { file } => {
            load_config(&file)?;
            println!("ok: {}", file.display());
            Ok(())
        }
        ConfigCommands::Show { file } => {
            let config = match file {
                Some(path) => load_config(&path)?,
                None => ReconConfig::default(),
            };
            let text = config
                .to_toml()
                .map_err(|e| CliError::config(e.to_string()))?;
            print!("{text}");
            Ok(())
        }
    }
}
