// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::vec::Vec;
use core::fmt;

mod coils;
mod data;

pub use self::{coils::*, data::*};
use byteorder::{BigEndian, ByteOrder};

/// The location of all bytes that belong to a frame or noise run,
/// counted from the first byte ever fed into the reassembler.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLocation {
    /// The index where the frame starts
    pub start: usize,
    /// Number of bytes that belong to the frame
    pub size: usize,
}

impl FrameLocation {
    /// One past the last byte of the frame.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.size
    }
}

/// A Modbus function code.
///
/// Only the codes with a known frame shape get their own variant.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCode {
    /// Modbus Function Code: `01` (`0x01`).
    ReadCoils,

    /// Modbus Function Code: `02` (`0x02`).
    ReadDiscreteInputs,

    /// Modbus Function Code: `05` (`0x05`).
    WriteSingleCoil,

    /// Modbus Function Code: `06` (`0x06`).
    WriteSingleRegister,

    /// Modbus Function Code: `03` (`0x03`).
    ReadHoldingRegisters,

    /// Modbus Function Code: `04` (`0x04`).
    ReadInputRegisters,

    /// Modbus Function Code: `15` (`0x0F`).
    WriteMultipleCoils,

    /// Modbus Function Code: `16` (`0x10`).
    WriteMultipleRegisters,

    /// Modbus Function Code: `23` (`0x17`).
    ReadWriteMultipleRegisters,

    /// Any other function code.
    Custom(u8),
}

impl FunctionCode {
    /// Create a new [`FunctionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        match value {
            0x01 => Self::ReadCoils,
            0x02 => Self::ReadDiscreteInputs,
            0x05 => Self::WriteSingleCoil,
            0x06 => Self::WriteSingleRegister,
            0x03 => Self::ReadHoldingRegisters,
            0x04 => Self::ReadInputRegisters,
            0x0F => Self::WriteMultipleCoils,
            0x10 => Self::WriteMultipleRegisters,
            0x17 => Self::ReadWriteMultipleRegisters,
            code => FunctionCode::Custom(code),
        }
    }

    /// Get the [`u8`] value of the current [`FunctionCode`].
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::ReadCoils => 0x01,
            Self::ReadDiscreteInputs => 0x02,
            Self::WriteSingleCoil => 0x05,
            Self::WriteSingleRegister => 0x06,
            Self::ReadHoldingRegisters => 0x03,
            Self::ReadInputRegisters => 0x04,
            Self::WriteMultipleCoils => 0x0F,
            Self::WriteMultipleRegisters => 0x10,
            Self::ReadWriteMultipleRegisters => 0x17,
            Self::Custom(code) => code,
        }
    }

    /// Human readable name of the operation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ReadCoils => "Read Coils",
            Self::ReadDiscreteInputs => "Read Discrete Inputs",
            Self::WriteSingleCoil => "Write Single Coil",
            Self::WriteSingleRegister => "Write Single Register",
            Self::ReadHoldingRegisters => "Read Holding Registers",
            Self::ReadInputRegisters => "Read Input Registers",
            Self::WriteMultipleCoils => "Write Multiple Coils",
            Self::WriteMultipleRegisters => "Write Multiple Registers",
            Self::ReadWriteMultipleRegisters => "Read/Write Multiple Registers",
            Self::Custom(_) => "Custom",
        }
    }
}

impl From<u8> for FunctionCode {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value().fmt(f)
    }
}

/// The address of a bus participant (slave id).
pub type UnitId = u8;

/// A Modbus address is represented by 16 bit (from `0` to `65535`).
pub type Address = u16;

/// A Coil represents a single bit.
///
/// - `true` is equivalent to `ON`, `1` and `0xFF00`.
/// - `false` is equivalent to `OFF`, `0` and `0x0000`.
pub type Coil = bool;

/// Modbus uses 16 bit for its data items (big-endian representation).
pub type Word = u16;

/// Number of items to process (`0` - `65535`).
pub type Quantity = u16;

/// A request represents a message from the client (master) to the server (slave).
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ReadCoils(Address, Quantity),
    ReadDiscreteInputs(Address, Quantity),
    /// The raw value is kept; `0xFF00` means ON, `0x0000` OFF.
    WriteSingleCoil(Address, Word),
    WriteMultipleCoils(Address, Coils),
    ReadInputRegisters(Address, Quantity),
    ReadHoldingRegisters(Address, Quantity),
    WriteSingleRegister(Address, Word),
    WriteMultipleRegisters(Address, Quantity, Data),
    ReadWriteMultipleRegisters {
        read_address: Address,
        read_quantity: Quantity,
        write_address: Address,
        write_quantity: Quantity,
        data: Data,
    },
}

impl Request {
    /// The state a [`Request::WriteSingleCoil`] switches to.
    ///
    /// `None` for other requests and for values other than `0xFF00`/`0x0000`.
    #[must_use]
    pub fn coil_state(&self) -> Option<Coil> {
        match self {
            Self::WriteSingleCoil(_, value) => crate::util::u16_coil_to_bool(*value).ok(),
            _ => None,
        }
    }
}

/// The response data of a successful request.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    ReadCoils(Coils),
    ReadDiscreteInputs(Coils),
    /// Only the address is echoed on this bus.
    WriteSingleCoil(Address),
    WriteMultipleCoils(Address, Quantity),
    ReadInputRegisters(Data),
    ReadHoldingRegisters(Data),
    WriteSingleRegister(Address, Word),
    WriteMultipleRegisters(Address, Quantity),
    ReadWriteMultipleRegisters(Data),
}

impl From<&Request> for FunctionCode {
    fn from(r: &Request) -> Self {
        use Request as R;

        match r {
            R::ReadCoils(_, _) => Self::ReadCoils,
            R::ReadDiscreteInputs(_, _) => Self::ReadDiscreteInputs,
            R::WriteSingleCoil(_, _) => Self::WriteSingleCoil,
            R::WriteMultipleCoils(_, _) => Self::WriteMultipleCoils,
            R::ReadInputRegisters(_, _) => Self::ReadInputRegisters,
            R::ReadHoldingRegisters(_, _) => Self::ReadHoldingRegisters,
            R::WriteSingleRegister(_, _) => Self::WriteSingleRegister,
            R::WriteMultipleRegisters(_, _, _) => Self::WriteMultipleRegisters,
            R::ReadWriteMultipleRegisters { .. } => Self::ReadWriteMultipleRegisters,
        }
    }
}

impl From<&Response> for FunctionCode {
    fn from(r: &Response) -> Self {
        use Response as R;

        match r {
            R::ReadCoils(_) => Self::ReadCoils,
            R::ReadDiscreteInputs(_) => Self::ReadDiscreteInputs,
            R::WriteSingleCoil(_) => Self::WriteSingleCoil,
            R::WriteMultipleCoils(_, _) => Self::WriteMultipleCoils,
            R::ReadInputRegisters(_) => Self::ReadInputRegisters,
            R::ReadHoldingRegisters(_) => Self::ReadHoldingRegisters,
            R::WriteSingleRegister(_, _) => Self::WriteSingleRegister,
            R::WriteMultipleRegisters(_, _) => Self::WriteMultipleRegisters,
            R::ReadWriteMultipleRegisters(_) => Self::ReadWriteMultipleRegisters,
        }
    }
}

/// A server (slave) exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
    ServerDeviceFailure = 0x04,
    Acknowledge = 0x05,
    ServerDeviceBusy = 0x06,
    MemoryParityError = 0x08,
    GatewayPathUnavailable = 0x0A,
    GatewayTargetDevice = 0x0B,
}

impl Exception {
    const fn get_name(self) -> &'static str {
        match self {
            Self::IllegalFunction => "Illegal function",
            Self::IllegalDataAddress => "Illegal data address",
            Self::IllegalDataValue => "Illegal data value",
            Self::ServerDeviceFailure => "Server device failure",
            Self::Acknowledge => "Acknowledge",
            Self::ServerDeviceBusy => "Server device busy",
            Self::MemoryParityError => "Memory parity error",
            Self::GatewayPathUnavailable => "Gateway path unavailable",
            Self::GatewayTargetDevice => "Gateway target device failed to respond",
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.get_name())
    }
}

#[cfg(all(feature = "defmt", target_os = "none"))]
impl defmt::Format for Exception {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.get_name())
    }
}

/// A server (slave) exception response.
///
/// The exception code is kept as captured; codes outside the
/// [`Exception`] table are still valid frames on the wire.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionResponse {
    /// The function code of the failed request (exception bit cleared).
    pub function: FunctionCode,
    /// The raw exception code.
    pub code: u8,
}

impl ExceptionResponse {
    /// The known [`Exception`] for [`Self::code`], if any.
    #[must_use]
    pub fn exception(&self) -> Option<Exception> {
        Exception::try_from(self.code).ok()
    }
}

/// One classified unit of bus traffic.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedFrame {
    Request { unit_id: UnitId, request: Request },
    Response { unit_id: UnitId, response: Response },
    Exception { unit_id: UnitId, exception: ExceptionResponse },
}

impl DecodedFrame {
    /// Address of the bus participant.
    #[must_use]
    pub const fn unit_id(&self) -> UnitId {
        match self {
            Self::Request { unit_id, .. }
            | Self::Response { unit_id, .. }
            | Self::Exception { unit_id, .. } => *unit_id,
        }
    }

    /// Function code of the operation; for exceptions the code of the failed request.
    #[must_use]
    pub fn function_code(&self) -> FunctionCode {
        match self {
            Self::Request { request, .. } => request.into(),
            Self::Response { response, .. } => response.into(),
            Self::Exception { exception, .. } => exception.function,
        }
    }
}

/// A contiguous run of bytes that matched no frame shape.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseRun {
    pub(crate) start: usize,
    pub(crate) bytes: Vec<u8>,
}

impl NoiseRun {
    pub(crate) fn open(start: usize, byte: u8) -> Self {
        let mut bytes = Vec::new();
        bytes.push(byte);
        Self { start, bytes }
    }

    pub(crate) fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// The quarantined bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Where the run sits in the stream.
    #[must_use]
    pub fn location(&self) -> FrameLocation {
        FrameLocation {
            start: self.start,
            size: self.bytes.len(),
        }
    }
}

/// Output of the reassembler, in stream order.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Bytes that were ignored while resynchronizing.
    Noise(NoiseRun),
    /// A frame with a valid checksum.
    Frame {
        location: FrameLocation,
        frame: DecodedFrame,
    },
}

impl Event {
    /// Where the event's bytes sit in the stream.
    #[must_use]
    pub fn location(&self) -> FrameLocation {
        match self {
            Self::Noise(run) => run.location(),
            Self::Frame { location, .. } => *location,
        }
    }
}
