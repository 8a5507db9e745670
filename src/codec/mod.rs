// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{error::*, frame::*};
use byteorder::{BigEndian, ByteOrder};
use core::convert::TryFrom;

pub mod rtu;

/// The type of decoding
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderType {
    Request,
    Response,
}

type Result<T> = core::result::Result<T, Error>;

impl TryFrom<u8> for Exception {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        use crate::frame::Exception::*;
        let ex = match code {
            0x01 => IllegalFunction,
            0x02 => IllegalDataAddress,
            0x03 => IllegalDataValue,
            0x04 => ServerDeviceFailure,
            0x05 => Acknowledge,
            0x06 => ServerDeviceBusy,
            0x08 => MemoryParityError,
            0x0A => GatewayPathUnavailable,
            0x0B => GatewayTargetDevice,
            _ => {
                return Err(Error::ExceptionCode(code));
            }
        };
        Ok(ex)
    }
}

impl TryFrom<&[u8]> for ExceptionResponse {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(Error::BufferSize);
        }
        let fn_err_code = bytes[0];
        if fn_err_code < 0x80 {
            return Err(Error::ExceptionFnCode(fn_err_code));
        }
        Ok(ExceptionResponse {
            function: (fn_err_code & 0x7F).into(),
            code: bytes[1],
        })
    }
}

impl TryFrom<&[u8]> for Request {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::BufferSize);
        }

        let fn_code = bytes[0];

        if bytes.len() < min_request_pdu_len(fn_code.into()) {
            return Err(Error::BufferSize);
        }

        use crate::frame::Request::*;
        use FunctionCode as f;

        let req = match FunctionCode::from(fn_code) {
            f::ReadCoils
            | f::ReadDiscreteInputs
            | f::ReadInputRegisters
            | f::ReadHoldingRegisters
            | f::WriteSingleCoil
            | f::WriteSingleRegister => {
                let addr = BigEndian::read_u16(&bytes[1..3]);
                let word = BigEndian::read_u16(&bytes[3..5]);

                match FunctionCode::from(fn_code) {
                    f::ReadCoils => ReadCoils(addr, word),
                    f::ReadDiscreteInputs => ReadDiscreteInputs(addr, word),
                    f::ReadInputRegisters => ReadInputRegisters(addr, word),
                    f::ReadHoldingRegisters => ReadHoldingRegisters(addr, word),
                    f::WriteSingleCoil => WriteSingleCoil(addr, word),
                    f::WriteSingleRegister => WriteSingleRegister(addr, word),
                    _ => unreachable!(),
                }
            }
            f::WriteMultipleCoils => {
                let address = BigEndian::read_u16(&bytes[1..3]);
                let quantity = BigEndian::read_u16(&bytes[3..5]);
                let data = counted_payload(bytes, 5)?;
                WriteMultipleCoils(address, Coils::new(usize::from(quantity), data))
            }
            f::WriteMultipleRegisters => {
                let address = BigEndian::read_u16(&bytes[1..3]);
                let quantity = BigEndian::read_u16(&bytes[3..5]);
                let data = counted_payload(bytes, 5)?;
                WriteMultipleRegisters(address, quantity, Data::new(data))
            }
            f::ReadWriteMultipleRegisters => {
                let data = counted_payload(bytes, 9)?;
                ReadWriteMultipleRegisters {
                    read_address: BigEndian::read_u16(&bytes[1..3]),
                    read_quantity: BigEndian::read_u16(&bytes[3..5]),
                    write_address: BigEndian::read_u16(&bytes[5..7]),
                    write_quantity: BigEndian::read_u16(&bytes[7..9]),
                    data: Data::new(data),
                }
            }
            f::Custom(code) => return Err(Error::FnCode(code)),
        };
        Ok(req)
    }
}

impl TryFrom<&[u8]> for Response {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        use crate::frame::Response::*;
        if bytes.is_empty() {
            return Err(Error::BufferSize);
        }
        let fn_code = bytes[0];
        if bytes.len() < min_response_pdu_len(fn_code.into()) {
            return Err(Error::BufferSize);
        }
        use FunctionCode as f;
        let rsp = match FunctionCode::from(fn_code) {
            f::ReadCoils | f::ReadDiscreteInputs => {
                let data = counted_payload(bytes, 1)?;
                // Here we have not information about the exact requested quantity
                // therefore we just assume that the whole byte is meant.
                let coils = Coils::new(data.len() * 8, data);

                match FunctionCode::from(fn_code) {
                    f::ReadCoils => ReadCoils(coils),
                    f::ReadDiscreteInputs => ReadDiscreteInputs(coils),
                    _ => unreachable!(),
                }
            }
            f::WriteSingleCoil => WriteSingleCoil(BigEndian::read_u16(&bytes[1..3])),

            f::WriteMultipleCoils | f::WriteSingleRegister | f::WriteMultipleRegisters => {
                let addr = BigEndian::read_u16(&bytes[1..3]);
                let payload = BigEndian::read_u16(&bytes[3..5]);
                match FunctionCode::from(fn_code) {
                    f::WriteMultipleCoils => WriteMultipleCoils(addr, payload),
                    f::WriteSingleRegister => WriteSingleRegister(addr, payload),
                    f::WriteMultipleRegisters => WriteMultipleRegisters(addr, payload),
                    _ => unreachable!(),
                }
            }
            f::ReadInputRegisters | f::ReadHoldingRegisters | f::ReadWriteMultipleRegisters => {
                let data = Data::new(counted_payload(bytes, 1)?);

                match FunctionCode::from(fn_code) {
                    f::ReadInputRegisters => ReadInputRegisters(data),
                    f::ReadHoldingRegisters => ReadHoldingRegisters(data),
                    f::ReadWriteMultipleRegisters => ReadWriteMultipleRegisters(data),
                    _ => unreachable!(),
                }
            }
            f::Custom(code) => return Err(Error::FnCode(code)),
        };
        Ok(rsp)
    }
}

/// The payload announced by the byte count at `count_idx`.
fn counted_payload(bytes: &[u8], count_idx: usize) -> Result<&[u8]> {
    let byte_count = *bytes.get(count_idx).ok_or(Error::BufferSize)?;
    let start = count_idx + 1;
    let end = start + usize::from(byte_count);
    bytes.get(start..end).ok_or(Error::ByteCount(byte_count))
}

const fn min_request_pdu_len(fn_code: FunctionCode) -> usize {
    use FunctionCode::*;
    match fn_code {
        ReadCoils | ReadDiscreteInputs | ReadInputRegisters | WriteSingleCoil
        | ReadHoldingRegisters | WriteSingleRegister => 5,
        WriteMultipleCoils => 6,
        WriteMultipleRegisters => 6,
        ReadWriteMultipleRegisters => 10,
        Custom(_) => 1,
    }
}

const fn min_response_pdu_len(fn_code: FunctionCode) -> usize {
    use FunctionCode::*;
    match fn_code {
        ReadCoils
        | ReadDiscreteInputs
        | ReadInputRegisters
        | ReadHoldingRegisters
        | ReadWriteMultipleRegisters => 2,
        WriteSingleCoil => 3,
        WriteMultipleCoils | WriteSingleRegister | WriteMultipleRegisters => 5,
        Custom(_) => 1,
    }
}
