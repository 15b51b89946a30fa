use crate::app::command_handlers::CommandError;
use crate::config::{default_workspace_root, ConfigError, Settings};

pub fn map_config_err(err: ConfigError) -> CommandError {
    CommandError::failure(err.to_string())
}

pub fn load_settings() -> Result<Settings, CommandError> {
    let root = default_workspace_root().map_err(map_config_err)?;
    Settings::load(&root).map_err(map_config_err)
}

/// Splits `args` into `--flag value` pairs and bare switches. Only names listed in
/// `valued` or `switches` are accepted.
pub fn parse_flags(
    args: &[String],
    valued: &[&str],
    switches: &[&str],
) -> Result<Vec<(String, Option<String>)>, CommandError> {
    let mut parsed = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if switches.contains(&arg.as_str()) {
            parsed.push((arg.clone(), None));
            continue;
        }
        if !valued.contains(&arg.as_str()) {
            return Err(CommandError::failure(format!("unexpected argument `{arg}`")));
        }
        let value = iter
            .next()
            .filter(|value| !value.starts_with("--"))
            .ok_or_else(|| CommandError::failure(format!("{arg} requires a value")))?;
        parsed.push((arg.clone(), Some(value.clone())));
    }
    Ok(parsed)
}

/// Last occurrence wins.
pub fn flag_value(flags: &[(String, Option<String>)], name: &str) -> Option<String> {
    flags
        .iter()
        .rev()
        .find(|(flag, _)| flag == name)
        .and_then(|(_, value)| value.clone())
}
