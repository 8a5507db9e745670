// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{
    fs,
    io::{self, Read},
    path::Path,
    time::Duration,
};

use anyhow::{Context as _, Result};
use clap::Parser;
use modbus_sniffer::{Event, rtu::Reassembler};
use serialport::{DataBits, StopBits};

mod cli;
mod config;
mod render;

use self::{
    cli::{Cli, Parity},
    config::Config,
    render::Render,
};

const READ_BUF_LEN: usize = 256;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(format) = cli.id_format {
        config.slave_id_format = format;
    }
    if let Some(format) = cli.address_format {
        config.register_address_format = format;
    }
    let render = Render::from(config);
    let mut on_event = |event: Event| log_event(&render, &event);

    let mut reassembler = Reassembler::new();
    if let Some(input) = &cli.input {
        return replay(input, &mut reassembler, &mut on_event);
    }
    let Some(port) = &cli.port else {
        anyhow::bail!("No serial port given");
    };
    let timeout = cli.inter_frame_timeout()?;
    sniff(port, cli.baud_rate, cli.parity, timeout, &mut reassembler, &mut on_event)
}

fn log_event(render: &Render, event: &Event) {
    match event {
        Event::Noise(_) => log::warn!("{}", render.event(event)),
        Event::Frame { .. } => log::info!("{}", render.event(event)),
    }
}

/// Listen on a serial port until reading fails.
fn sniff(
    port_name: &str,
    baud_rate: u32,
    parity: Parity,
    timeout: Duration,
    reassembler: &mut Reassembler,
    on_event: &mut impl FnMut(Event),
) -> Result<()> {
    log::info!(
        "Opening serial interface: port: {port_name}, baudrate: {baud_rate}, bytesize: 8, \
         parity: {parity:?}, stopbits: 1, timeout: {}s",
        timeout.as_secs_f64()
    );
    let mut port = serialport::new(port_name, baud_rate)
        .data_bits(DataBits::Eight)
        .parity(parity.into())
        .stop_bits(StopBits::One)
        .timeout(timeout)
        .open()
        .with_context(|| format!("Failed to open serial port {port_name}"))?;

    let mut buf = [0; READ_BUF_LEN];
    loop {
        let Some(chunk) = read_chunk(&mut port, &mut buf)
            .with_context(|| format!("Failed to read from {port_name}"))?
        else {
            continue;
        };
        reassembler.ingest_with(chunk, &mut *on_event);
    }
}

/// Read the next chunk from the bus.
///
/// A timeout yields an empty chunk (silence on the bus). `None` means the
/// read was interrupted and should be retried.
fn read_chunk<'b>(source: &mut impl Read, buf: &'b mut [u8]) -> io::Result<Option<&'b [u8]>> {
    match source.read(buf) {
        Ok(n) => Ok(Some(&buf[..n])),
        Err(err) if err.kind() == io::ErrorKind::TimedOut => Ok(Some(&[])),
        Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(err) => Err(err),
    }
}

/// Decode a raw capture file.
fn replay(
    path: &Path,
    reassembler: &mut Reassembler,
    on_event: &mut impl FnMut(Event),
) -> Result<()> {
    let capture =
        fs::read(path).with_context(|| format!("Failed to read capture {}", path.display()))?;
    log::info!("Replaying {} byte(s) from {}", capture.len(), path.display());
    reassembler.ingest_with(&capture, &mut *on_event);
    reassembler.ingest_with(&[], &mut *on_event);
    if let Some(noise) = reassembler.finish() {
        on_event(Event::Noise(noise));
    }
    Ok(())
}
