use crate::cli::SettingsCommand;
use crate::config::Config;
use crate::error::Result;
use crate::preferences::ChatPreferences;
use crate::storage::settings::decode_setting;
use crate::storage::ConversationStore;
use colored::Colorize;
use prettytable::{format, Table};
use serde_json::Value;

/// Handle settings commands
pub fn handle_settings(config: &Config, command: SettingsCommand) -> Result<()> {
    let store = ConversationStore::from_config(&config.storage)?;

    match command {
        SettingsCommand::List => {
            let settings = store.list_settings()?;
            if settings.is_empty() {
                println!("{}", "No settings stored.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row!["Key".bold(), "Value".bold()]);
            for (key, value) in settings {
                table.add_row(prettytable::row![key.cyan(), value.as_str()]);
            }
            table.printstd();
        }
        SettingsCommand::Get { key } => match store.get_setting_value(&key)? {
            Some(stored) => {
                let value: Value = decode_setting(&key, &stored)?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            None => {
                println!("{}", format!("Setting '{}' is not set.", key).yellow());
            }
        },
        SettingsCommand::Set { key, value } => {
            let value = parse_setting_value(&value);
            store.save_setting(&key, &value)?;
            println!("{}", format!("Saved {} = {}", key, value).green());
        }
        SettingsCommand::Delete { key } => {
            store.delete_setting(&key)?;
            println!("{}", format!("Deleted setting {}", key).green());
        }
        SettingsCommand::Prefs => {
            let prefs = ChatPreferences::load(&store)?;

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row!["Model".bold(), prefs.model]);
            table.add_row(prettytable::row!["Temperature".bold(), prefs.temperature]);
            table.add_row(prettytable::row!["Max Tokens".bold(), prefs.max_tokens]);
            table.add_row(prettytable::row!["Preset".bold(), prefs.preset]);
            table.printstd();
            println!();
            println!("{}", prefs.system_message().dimmed());
        }
    }

    Ok(())
}

/// Interpret a command-line value as JSON, falling back to a plain string
pub fn parse_setting_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
