// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON configuration file

use std::{fs, path::Path};

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use serde::Deserialize;

/// How numbers are rendered in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// Decimal
    #[default]
    Dec,
    /// Hexadecimal, `0x` prefixed
    Hex,
}

impl NumberFormat {
    pub fn id(self, id: u8) -> String {
        match self {
            Self::Dec => id.to_string(),
            Self::Hex => format!("0x{id:02x}"),
        }
    }

    pub fn address(self, address: u16) -> String {
        match self {
            Self::Dec => address.to_string(),
            Self::Hex => format!("0x{address:04x}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub slave_id_format: NumberFormat,
    pub register_address_format: NumberFormat,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Missing configuration file: {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config() {
        let config = Config::from_json(
            r#"{
                "slaveIdFormat": "hex",
                "registerAddressFormat": "dec"
            }"#,
        )
        .unwrap();
        assert_eq!(config.slave_id_format, NumberFormat::Hex);
        assert_eq!(config.register_address_format, NumberFormat::Dec);
    }

    #[test]
    fn missing_keys_fall_back_to_decimal() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());

        let config = Config::from_json(r#"{"registerAddressFormat": "hex"}"#).unwrap();
        assert_eq!(config.slave_id_format, NumberFormat::Dec);
        assert_eq!(config.register_address_format, NumberFormat::Hex);
    }

    #[test]
    fn reject_unknown_format() {
        assert!(Config::from_json(r#"{"slaveIdFormat": "oct"}"#).is_err());
        assert!(Config::from_json("not json").is_err());
    }

    #[test]
    fn missing_file() {
        let err = Config::load(Path::new("/nonexistent/modbus-sniffer.json")).unwrap_err();
        assert!(err.to_string().starts_with("Missing configuration file"));
    }

    #[test]
    fn render_numbers() {
        assert_eq!(NumberFormat::Dec.id(17), "17");
        assert_eq!(NumberFormat::Hex.id(17), "0x11");
        assert_eq!(NumberFormat::Dec.address(10), "10");
        assert_eq!(NumberFormat::Hex.address(10), "0x000a");
    }
}
