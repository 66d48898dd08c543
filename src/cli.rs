use std::ffi::OsString;

use crate::error::{AppError, AppResult};

pub const PROGRAM_NAME: &str = "thunderbird-metrics";

/// The binary takes no arguments: the period comes from deployment
/// configuration, not from the command line.
pub fn check_usage(args: impl IntoIterator<Item = OsString>) -> AppResult<()> {
    let mut args = args.into_iter();
    let program = args
        .next()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| PROGRAM_NAME.to_string());

    if args.next().is_some() {
        return Err(AppError::Usage(program));
    }
    Ok(())
}
