// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command line arguments

use std::{path::PathBuf, time::Duration};

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use modbus_sniffer::rtu::inter_frame_timeout;

use crate::config::NumberFormat;

pub const DEFAULT_BAUD_RATE: u32 = 57_600;

/// Passive Modbus RTU sniffer
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Serial port to listen on
    #[arg(short, long, required_unless_present = "input")]
    pub port: Option<String>,

    /// Communication baud rate
    #[arg(short, long = "baudrate", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud_rate: u32,

    /// Parity bit
    #[arg(short = 'a', long, value_enum, default_value_t = Parity::Even)]
    pub parity: Parity,

    #[arg(short, long, value_name = "SECONDS", help = timeout_help())]
    pub timeout: Option<f64>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Decode a raw capture file instead of a serial port
    #[arg(short, long, conflicts_with = "port")]
    pub input: Option<PathBuf>,

    /// Slave id format, overrides the configuration file
    #[arg(long, value_enum)]
    pub id_format: Option<NumberFormat>,

    /// Register address format, overrides the configuration file
    #[arg(long, value_enum)]
    pub address_format: Option<NumberFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => Self::None,
            Parity::Even => Self::Even,
            Parity::Odd => Self::Odd,
        }
    }
}

fn timeout_help() -> String {
    format!(
        "Override the calculated inter-frame timeout [default at {DEFAULT_BAUD_RATE} baud: {}s]",
        inter_frame_timeout(DEFAULT_BAUD_RATE).as_secs_f64()
    )
}

impl Cli {
    /// The read timeout of the serial port.
    pub fn inter_frame_timeout(&self) -> Result<Duration> {
        match self.timeout {
            Some(secs) => Duration::try_from_secs_f64(secs)
                .with_context(|| format!("Invalid timeout: {secs}")),
            None => Ok(inter_frame_timeout(self.baud_rate)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_command() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["modbus-sniffer", "-p", "/dev/ttyUSB0"]).unwrap();
        assert_eq!(cli.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(cli.baud_rate, 57_600);
        assert_eq!(cli.parity, Parity::Even);
        assert_eq!(cli.inter_frame_timeout().unwrap(), Duration::from_micros(1_750));
        assert!(cli.config.is_none());
        assert!(cli.id_format.is_none());
    }

    #[test]
    fn serial_line_options() {
        let cli = Cli::try_parse_from([
            "modbus-sniffer",
            "--port",
            "COM3",
            "--baudrate",
            "9600",
            "--parity",
            "none",
            "--id-format",
            "hex",
        ])
        .unwrap();
        assert_eq!(cli.baud_rate, 9600);
        assert_eq!(cli.parity, Parity::None);
        assert_eq!(cli.id_format, Some(NumberFormat::Hex));
        assert_eq!(cli.inter_frame_timeout().unwrap(), Duration::from_nanos(3_437_500));
    }

    #[test]
    fn timeout_override() {
        let cli = Cli::try_parse_from(["modbus-sniffer", "-p", "COM1", "-t", "0.5"]).unwrap();
        assert_eq!(cli.inter_frame_timeout().unwrap(), Duration::from_millis(500));

        let cli = Cli::try_parse_from(["modbus-sniffer", "-p", "COM1", "--timeout=-1"]).unwrap();
        assert!(cli.inter_frame_timeout().is_err());
    }

    #[test]
    fn port_or_input_required() {
        assert!(Cli::try_parse_from(["modbus-sniffer"]).is_err());
        assert!(Cli::try_parse_from(["modbus-sniffer", "-i", "capture.bin"]).is_ok());
        assert!(Cli::try_parse_from(["modbus-sniffer", "-p", "COM1", "-i", "capture.bin"]).is_err());
    }

    #[test]
    fn reject_unknown_parity() {
        assert!(Cli::try_parse_from(["modbus-sniffer", "-p", "COM1", "-a", "mark"]).is_err());
    }
}
