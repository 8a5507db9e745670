// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Byte layout of the RTU frames a sniffer can recognize.

use super::*;

/// Number of bytes of the trailing CRC.
pub const CRC_LEN: usize = 2;

/// Number of bytes needed before any shape can be probed:
/// unit id, function code and at least one more byte.
pub const MIN_PROBE_LEN: usize = 3;

/// Set on the function code of an exception response.
pub const EXCEPTION_BIT: u8 = 0x80;

/// Layout of one frame form (request or response) on the wire.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameShape {
    /// Bytes in front of the variable payload (or the CRC), including the
    /// unit id, the function code and the byte count field.
    header_len: usize,
    /// Offset of the one byte count field of variable length frames.
    byte_count_idx: Option<usize>,
}

impl FrameShape {
    /// A shape with a fixed total length (including CRC).
    #[must_use]
    pub const fn fixed(len: usize) -> Self {
        Self {
            header_len: len - CRC_LEN,
            byte_count_idx: None,
        }
    }

    /// A shape whose payload length is given by the byte at `byte_count_idx`.
    #[must_use]
    pub const fn counted(byte_count_idx: usize) -> Self {
        Self {
            header_len: byte_count_idx + 1,
            byte_count_idx: Some(byte_count_idx),
        }
    }

    /// The offset of the byte count field, if any.
    #[must_use]
    pub const fn byte_count_idx(&self) -> Option<usize> {
        self.byte_count_idx
    }

    /// The shortest possible frame of this shape.
    #[must_use]
    pub const fn min_len(&self) -> usize {
        self.header_len + CRC_LEN
    }

    /// Total frame length, or `None` if the byte count has not been received yet.
    #[must_use]
    pub fn frame_len(&self, adu_buf: &[u8]) -> Option<usize> {
        let Some(idx) = self.byte_count_idx else {
            return Some(self.min_len());
        };
        adu_buf
            .get(idx)
            .map(|&byte_count| self.min_len() + usize::from(byte_count))
    }
}

/// Request and response layout of a function code.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapePair {
    pub request: FrameShape,
    pub response: FrameShape,
}

impl ShapePair {
    /// The shape to probe for the given decoder type.
    #[must_use]
    pub const fn get(&self, decoder_type: DecoderType) -> FrameShape {
        match decoder_type {
            DecoderType::Request => self.request,
            DecoderType::Response => self.response,
        }
    }
}

/// unit, fc, address, quantity, crc
const READ_REQUEST: FrameShape = FrameShape::fixed(8);
/// unit, fc, byte count, data, crc
const READ_RESPONSE: FrameShape = FrameShape::counted(2);
/// unit, fc, address, quantity, byte count, data, crc
const WRITE_MULTIPLE_REQUEST: FrameShape = FrameShape::counted(6);
/// unit, fc, address, quantity, crc
const WRITE_MULTIPLE_RESPONSE: FrameShape = FrameShape::fixed(8);

/// unit, fc, exception code, crc
pub const EXCEPTION_SHAPE: FrameShape = FrameShape::fixed(5);

/// Look up the frame shapes of a function code.
///
/// Exception responses are not part of the catalog, see [`is_exception`].
#[must_use]
pub const fn shapes(fn_code: FunctionCode) -> Option<ShapePair> {
    use FunctionCode::*;
    let (request, response) = match fn_code {
        ReadCoils | ReadDiscreteInputs | ReadHoldingRegisters | ReadInputRegisters => {
            (READ_REQUEST, READ_RESPONSE)
        }
        // The address is echoed without the written value.
        WriteSingleCoil => (FrameShape::fixed(8), FrameShape::fixed(6)),
        WriteSingleRegister => (FrameShape::fixed(8), FrameShape::fixed(8)),
        WriteMultipleCoils | WriteMultipleRegisters => {
            (WRITE_MULTIPLE_REQUEST, WRITE_MULTIPLE_RESPONSE)
        }
        // unit, fc, read address, read quantity, write address, write quantity,
        // byte count, data, crc
        ReadWriteMultipleRegisters => (FrameShape::counted(10), READ_RESPONSE),
        Custom(_) => return None,
    };
    Some(ShapePair { request, response })
}

/// Any function code with the exception bit set denotes an exception response.
#[must_use]
pub const fn is_exception(fn_code: u8) -> bool {
    fn_code & EXCEPTION_BIT != 0
}
