// SPDX-License-Identifier: GPL-3.0-only

//! Core types for scan results

use chrono::{DateTime, Local};

/// Scan orchestration state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Not scanning; frames are ignored
    #[default]
    Idle,
    /// Actively feeding frames to the decoder
    Scanning,
    /// A result was just found; frames are ignored until the cooldown ends
    Paused,
}

impl ScanState {
    pub fn display_name(&self) -> &'static str {
        match self {
            ScanState::Idle => "Idle",
            ScanState::Scanning => "Scanning",
            ScanState::Paused => "Paused",
        }
    }
}

/// An immutable decoded result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Decoded payload
    pub text: String,
    /// Symbology label, e.g. "CODE_128" or "QR_CODE"
    pub format: String,
    /// When the decode succeeded
    pub scanned_at: DateTime<Local>,
}

impl ScanResult {
    pub fn new(text: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: format.into(),
            scanned_at: Local::now(),
        }
    }

    /// Classify the payload for display
    pub fn action(&self) -> ScanAction {
        ScanAction::parse(&self.text)
    }
}

/// Content classification of a decoded payload
///
/// Codes carry various kinds of data; this drives the label shown next to a
/// result in the UI and history. Unrecognized content falls back to `Text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanAction {
    /// Web link
    Url(String),
    /// WiFi network credentials
    Wifi {
        ssid: String,
        password: Option<String>,
    },
    /// Phone number (tel: URI)
    Phone(String),
    /// Email address (mailto: URI)
    Email(String),
    /// Anything else
    Text(String),
}

impl ScanAction {
    pub fn parse(content: &str) -> Self {
        let trimmed = content.trim();

        if trimmed.starts_with("WIFI:") {
            return Self::parse_wifi(trimmed);
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Self::Url(trimmed.to_string());
        }

        if let Some(number) = trimmed.strip_prefix("tel:") {
            return Self::Phone(number.to_string());
        }

        if let Some(rest) = trimmed.strip_prefix("mailto:") {
            let (address, _params) = rest.split_once('?').unwrap_or((rest, ""));
            return Self::Email(address.to_string());
        }

        Self::Text(trimmed.to_string())
    }

    /// Format: WIFI:S:<ssid>;T:<security>;P:<password>;;
    fn parse_wifi(content: &str) -> Self {
        let mut ssid = String::new();
        let mut password = None;

        let content = content.strip_prefix("WIFI:").unwrap_or(content);
        let content = content.trim_end_matches(';');

        for part in content.split(';') {
            if let Some((key, value)) = part.split_once(':') {
                let value = value
                    .replace("\\;", ";")
                    .replace("\\:", ":")
                    .replace("\\\\", "\\")
                    .replace("\\,", ",");

                match key {
                    "S" => ssid = value,
                    "P" => password = Some(value),
                    _ => {}
                }
            }
        }

        Self::Wifi { ssid, password }
    }

    /// Short label for the UI
    pub fn label(&self) -> &'static str {
        match self {
            Self::Url(_) => "Link",
            Self::Wifi { .. } => "WiFi",
            Self::Phone(_) => "Phone",
            Self::Email(_) => "Email",
            Self::Text(_) => "Text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(matches!(
            ScanAction::parse("https://example.com"),
            ScanAction::Url(_)
        ));
        assert!(matches!(
            ScanAction::parse("http://example.com/path"),
            ScanAction::Url(_)
        ));
    }

    #[test]
    fn test_parse_wifi() {
        let action = ScanAction::parse("WIFI:S:MyNetwork;T:WPA;P:mypassword;;");
        match action {
            ScanAction::Wifi { ssid, password } => {
                assert_eq!(ssid, "MyNetwork");
                assert_eq!(password, Some("mypassword".to_string()));
            }
            _ => panic!("Expected Wifi action"),
        }
    }

    #[test]
    fn test_parse_wifi_open_network() {
        let action = ScanAction::parse("WIFI:S:OpenNet;T:nopass;;");
        match action {
            ScanAction::Wifi { ssid, password } => {
                assert_eq!(ssid, "OpenNet");
                assert_eq!(password, None);
            }
            _ => panic!("Expected Wifi action"),
        }
    }

    #[test]
    fn test_parse_phone() {
        let action = ScanAction::parse("tel:+1234567890");
        match action {
            ScanAction::Phone(number) => assert_eq!(number, "+1234567890"),
            _ => panic!("Expected Phone action"),
        }
    }

    #[test]
    fn test_parse_mailto_drops_params() {
        let action = ScanAction::parse("mailto:test@example.com?subject=Hello");
        match action {
            ScanAction::Email(address) => assert_eq!(address, "test@example.com"),
            _ => panic!("Expected Email action"),
        }
    }

    #[test]
    fn test_parse_plain_text() {
        assert!(matches!(
            ScanAction::parse("Hello World!"),
            ScanAction::Text(_)
        ));
    }
}
