//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success (for `diff`: no differences)                 |
//! | 1    | `diff` found added, removed, or modified items       |
//! | 2    | Usage error (bad arguments, conflicting options)     |
//! | 3    | I/O error (cannot read input or write output)        |
//! | 4    | Input has no header row plus at least one data row   |
//! | 5    | Invalid configuration file                           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `recon_exit_code` / `io_exit_code` if it maps an error type

use billdiff_io::IoError;
use billdiff_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Differences found. Like `diff(1)`, exit 1 means "inputs differ."
pub const EXIT_DIFFERENCES: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read an input or write an output.
pub const EXIT_IO: u8 = 3;

/// An input decoded to fewer than two rows.
pub const EXIT_INSUFFICIENT_DATA: u8 = 4;

/// Config file failed to parse or validate.
pub const EXIT_CONFIG: u8 = 5;

pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::InsufficientData { .. } => EXIT_INSUFFICIENT_DATA,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::MissingDataset(_) => EXIT_USAGE,
    }
}

pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Recon(inner) => recon_exit_code(inner),
        IoError::Read { .. }
        | IoError::Write { .. }
        | IoError::Xlsx(_)
        | IoError::Csv(_)
        | IoError::Json(_) => EXIT_IO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_DIFFERENCES,
            EXIT_USAGE,
            EXIT_IO,
            EXIT_INSUFFICIENT_DATA,
            EXIT_CONFIG,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn recon_errors_map() {
        let err = ReconError::InsufficientData {
            label: "a".into(),
            rows: 0,
        };
        assert_eq!(recon_exit_code(&err), EXIT_INSUFFICIENT_DATA);
        assert_eq!(
            recon_exit_code(&ReconError::ConfigValidation("x".into())),
            EXIT_CONFIG
        );
        assert_eq!(io_exit_code(&IoError::Recon(err)), EXIT_INSUFFICIENT_DATA);
    }
}
