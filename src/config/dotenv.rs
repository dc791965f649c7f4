//! `.env` file loading
//!
//! Values from the file never shadow variables already present in the
//! process environment.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::errors::FlowpulseError;

/// Variables visible to configuration lookups
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a .env file
    pub fn load_file(path: &Path) -> Result<Self, FlowpulseError> {
        let content = fs::read_to_string(path)
            .map_err(|e| FlowpulseError::Config(format!("Failed to read .env file: {}", e)))?;
        Self::parse(&content)
    }

    /// `.env` in the working directory overlaid by the process environment
    pub fn load_default() -> Result<Self, FlowpulseError> {
        let path = Path::new(".env");
        let mut vars = if path.exists() {
            let vars = Self::load_file(path)?;
            info!(count = vars.len(), "Loaded .env file");
            vars
        } else {
            debug!("No .env file found, using process environment");
            Self::new()
        };
        vars.merge_with_system();
        Ok(vars)
    }

    /// Parse .env file content
    pub fn parse(content: &str) -> Result<Self, FlowpulseError> {
        let mut vars = HashMap::new();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = parse_env_line(line) else {
                return Err(FlowpulseError::Config(format!(
                    "Invalid .env syntax at line {}: {}",
                    line_num + 1,
                    line
                )));
            };

            // Blank assignments leave the variable unset
            if !value.is_empty() {
                vars.insert(key, value);
            }
        }

        Ok(Self { vars })
    }

    /// Overlay the process environment (process wins over file)
    pub fn merge_with_system(&mut self) {
        self.vars.extend(std::env::vars());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    /// First non-empty value among `keys`
    pub fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .find(|v| !v.trim().is_empty())
            .map(str::to_string)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// `KEY=value`, `KEY="value"`, `KEY='value'`, optionally prefixed by `export`
fn parse_env_line(line: &str) -> Option<(String, String)> {
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value_part) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }

    let value_part = value_part.trim();
    let value = if value_part.len() >= 2 && value_part.starts_with('"') && value_part.ends_with('"') {
        unescape_double_quoted(&value_part[1..value_part.len() - 1])
    } else if value_part.len() >= 2 && value_part.starts_with('\'') && value_part.ends_with('\'') {
        value_part[1..value_part.len() - 1].to_string()
    } else {
        match value_part.find(" #") {
            Some(pos) => value_part[..pos].trim_end().to_string(),
            None => value_part.to_string(),
        }
    };

    Some((key.to_string(), value))
}

fn unescape_double_quoted(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}
