//! `config settings`: resolved console settings with their sources.

use crate::config::{ConsoleSettings, SettingEntry, SettingsReport};

use super::Output;

pub fn settings_report(settings: &ConsoleSettings) -> SettingsReport {
    settings.report()
}

impl Output for SettingsReport {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "Settings file: {}",
            self.config_path.as_deref().unwrap_or("(none)")
        ));
        let mut row = |name: &str, entry: Option<&SettingEntry>| {
            if let Some(entry) = entry {
                lines.push(format!("  {:<22} {:<24} ({})", name, entry.value, entry.source));
            }
        };
        row("host", Some(&self.host));
        row("port", Some(&self.port));
        row("reconnect-delay-ms", Some(&self.reconnect_delay_ms));
        row("log-retention", Some(&self.log_retention));
        row("request-timeout-secs", Some(&self.request_timeout_secs));
        row("editor", self.editor.as_ref());
        row("username", self.username.as_ref());
        row("password", self.password.as_ref());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_human_lists_sources() {
        let report = settings_report(&ConsoleSettings::default());
        let human = report.to_human();
        assert!(human.contains("Settings file: (none)"));
        assert!(human.contains("localhost"));
        assert!(human.contains("(default)"));
        assert!(!human.contains("password"));
    }

    #[test]
    fn test_report_json_omits_unset_credentials() {
        let json = settings_report(&ConsoleSettings::default()).to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["port"]["value"], "3000");
        assert!(value.get("username").is_none());
    }
}
