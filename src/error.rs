// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;

/// modbus-sniffer Error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Invalid coil value
    CoilValue(u16),
    /// Invalid buffer size
    BufferSize,
    /// Function code without a known frame shape
    FnCode(u8),
    /// Function code without the exception bit
    ExceptionFnCode(u8),
    /// Invalid exception code
    ExceptionCode(u8),
    /// Invalid CRC
    Crc(u16, u16),
    /// Byte count does not match the available payload
    ByteCount(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;

        match self {
            CoilValue(v) => write!(f, "Invalid coil value: 0x{v:0>4X}"),
            BufferSize => write!(f, "Invalid buffer size"),
            FnCode(fn_code) => write!(f, "Invalid function code: 0x{fn_code:0>2X}"),
            ExceptionFnCode(code) => write!(f, "Invalid exception function code: 0x{code:0>2X}"),
            ExceptionCode(code) => write!(f, "Invalid exception code: 0x{code:0>2X}"),
            Crc(expected, actual) => write!(
                f,
                "Invalid CRC: expected = 0x{expected:0>4X}, actual = 0x{actual:0>4X}"
            ),
            ByteCount(cnt) => write!(f, "Invalid byte count: {cnt}"),
        }
    }
}

impl core::error::Error for Error {}
