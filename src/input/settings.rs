use std::fs;
use std::path::Path;

use crate::input::InputError;
use crate::model::RunSettings;

/// Reads a settings profile; absent keys keep their `standard_v1` values.
pub fn load_settings(path: Option<&Path>) -> Result<RunSettings, InputError> {
    let Some(path) = path else {
        return Ok(RunSettings::standard_v1());
    };
    if !path.is_file() {
        return Err(InputError::MissingInput(format!(
            "settings file {} does not exist",
            path.display()
        )));
    }
    let settings = parse_settings(&fs::read_to_string(path)?)?;
    crate::debug!("loaded settings from {}: {:?}", path.display(), settings);
    Ok(settings)
}

pub fn parse_settings(json: &str) -> Result<RunSettings, InputError> {
    Ok(serde_json::from_str(json)?)
}
