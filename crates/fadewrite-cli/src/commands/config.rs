use clap::Subcommand;
use fadewrite_core::{Config, ConfigError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting
    Get {
        /// Dot-path key, e.g. "decay.timeout_seconds", "decay.easing", "history.min_words"
        key: String,
    },
    /// Change one setting and save it
    Set {
        /// Dot-path key, e.g. "decay.timeout_seconds"
        key: String,
        /// New value; timeouts must be 1-30 seconds, easing linear|quadratic|cubic
        value: String,
    },
    /// Print every setting as `key = value`
    List {
        /// Print the whole configuration as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Restore the default timeout, easing, colours and archive threshold
    Reset,
}

/// Flatten a JSON tree into sorted `section.key = value` lines.
fn dot_lines(prefix: &str, value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                dot_lines(&path, child, out);
            }
        }
        serde_json::Value::String(s) => out.push(format!("{prefix} = {s}")),
        other => out.push(format!("{prefix} = {other}")),
    }
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::List { json } => {
            let config = Config::load()?;
            let tree = serde_json::to_value(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                let mut lines = Vec::new();
                dot_lines("", &tree, &mut lines);
                lines.sort();
                for line in lines {
                    println!("{line}");
                }
            }
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
