use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_yaml::Value;

use super::{normalize_key, Config};
use crate::error::{ResolveError, Result};

/// File names looked for in the working directory when no config file is given
pub const CONFIG_FILE_NAMES: [&str; 2] = ["peaclock_config.yaml", "peaclock_config.yml"];

/// Locate the config file.
///
/// An explicit path (relative to `cwd` if not absolute) must exist.  Otherwise
/// the working directory is searched for one of [`CONFIG_FILE_NAMES`], and if
/// none is present we carry on with the defaults.
pub fn look_for_config(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    if let Some(p) = explicit {
        let path = cwd.join(p);
        if path.is_file() {
            Ok(Some(path))
        } else {
            Err(ResolveError::ConfigNotFound(path))
        }
    } else {
        let found = CONFIG_FILE_NAMES
            .iter()
            .map(|name| cwd.join(name))
            .find(|p| p.is_file());
        if found.is_none() {
            debug!("No config file found in {}", cwd.display());
        }
        Ok(found)
    }
}

/// Overlay the contents of a YAML config file onto `cfg`.
///
/// The whole file is validated before anything is merged.
pub fn parse_yaml_file(path: &Path, mut cfg: Config) -> Result<Config> {
    let parse_err = |reason: String| ResolveError::ConfigParse {
        path: path.to_owned(),
        reason,
    };

    let s = fs::read_to_string(path)
        .map_err(|e| ResolveError::io(format!("Could not read config file {}", path.display()), e))?;

    if s.trim().is_empty() {
        debug!("Config file {} is empty", path.display());
        return Ok(cfg);
    }

    let entries = match serde_yaml::from_str::<Value>(&s).map_err(|e| parse_err(e.to_string()))? {
        // Document with only comments
        Value::Null => Vec::new(),
        Value::Mapping(m) => m
            .into_iter()
            .map(|(k, v)| match k {
                Value::String(k) => Ok((k, v)),
                k => Err(parse_err(format!("invalid key {:?}", k))),
            })
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(parse_err("expected a mapping of key: value pairs".to_string())),
    };

    debug!(
        "Read {} entries from config file {}",
        entries.len(),
        path.display()
    );
    for (k, v) in entries {
        if !cfg.contains_key(&normalize_key(&k)) {
            debug!("Passing through unrecognized config key {}", k)
        }
        cfg.set(&k, v)
    }
    Ok(cfg)
}
