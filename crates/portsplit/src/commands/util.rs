//! Shared helpers for command handlers.

use std::io::{IsTerminal, Read};
use std::path::Path;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the caller must pass `--yes`.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read configuration text from a file, or stdin for `-`.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    let display = path.display().to_string();
    let input_err = |source| CliError::Input {
        path: display.clone(),
        source,
    };

    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map_err(input_err)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).map_err(input_err)
    }
}
