// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human readable event lines

use modbus_sniffer::{
    DecodedFrame, Event, ExceptionResponse, FunctionCode, NoiseRun, Request, Response, UnitId,
    util::hex_bytes,
};

use crate::config::{Config, NumberFormat};

#[derive(Debug, Clone, Copy, Default)]
pub struct Render {
    id_format: NumberFormat,
    address_format: NumberFormat,
}

impl From<Config> for Render {
    fn from(config: Config) -> Self {
        Self {
            id_format: config.slave_id_format,
            address_format: config.register_address_format,
        }
    }
}

impl Render {
    pub fn event(&self, event: &Event) -> String {
        match event {
            Event::Noise(noise) => Self::noise(noise),
            Event::Frame { frame, .. } => self.frame(frame),
        }
    }

    pub fn noise(noise: &NoiseRun) -> String {
        format!("Ignoring data: [{}]", hex_bytes(noise.bytes()))
    }

    pub fn frame(&self, frame: &DecodedFrame) -> String {
        match frame {
            DecodedFrame::Request { unit_id, request } => self.request(*unit_id, request),
            DecodedFrame::Response { unit_id, response } => self.response(*unit_id, response),
            DecodedFrame::Exception { unit_id, exception } => self.exception(*unit_id, exception),
        }
    }

    fn header(&self, direction: &str, unit_id: UnitId, fn_code: FunctionCode) -> String {
        format!(
            "{direction} -> ID: {}, {}: 0x{:02x}",
            self.id_format.id(unit_id),
            fn_code.name(),
            fn_code.value()
        )
    }

    fn request(&self, unit_id: UnitId, request: &Request) -> String {
        use Request as R;

        let header = self.header("Master", unit_id, request.into());
        let addr = |address| self.address_format.address(address);
        match request {
            R::ReadCoils(address, quantity)
            | R::ReadDiscreteInputs(address, quantity)
            | R::ReadInputRegisters(address, quantity)
            | R::ReadHoldingRegisters(address, quantity) => format!(
                "{header}, Read address: {}, Read Quantity: {quantity}",
                addr(*address)
            ),
            R::WriteSingleCoil(address, value) | R::WriteSingleRegister(address, value) => {
                format!(
                    "{header}, Write address: {}, Write data: [{}]",
                    addr(*address),
                    hex_bytes(&value.to_be_bytes())
                )
            }
            R::WriteMultipleCoils(address, coils) => format!(
                "{header}, Write address: {}, Write quantity: {}, Write data: [{}]",
                addr(*address),
                coils.len(),
                hex_bytes(coils.payload())
            ),
            R::WriteMultipleRegisters(address, quantity, data) => format!(
                "{header}, Write address: {}, Write quantity: {quantity}, Write data: [{}]",
                addr(*address),
                hex_bytes(data.payload())
            ),
            R::ReadWriteMultipleRegisters {
                read_address,
                read_quantity,
                write_address,
                write_quantity,
                data,
            } => format!(
                "{header}, Read address: {}, Read Quantity: {read_quantity}, \
                 Write address: {}, Write quantity: {write_quantity}, Write data: [{}]",
                addr(*read_address),
                addr(*write_address),
                hex_bytes(data.payload())
            ),
        }
    }

    fn response(&self, unit_id: UnitId, response: &Response) -> String {
        use Response as R;

        let header = self.header("Slave", unit_id, response.into());
        let addr = |address| self.address_format.address(address);
        let read_data = |payload: &[u8]| {
            format!(
                "{header}, Read byte count: {}, Read data: [{}]",
                payload.len(),
                hex_bytes(payload)
            )
        };
        match response {
            R::ReadCoils(coils) | R::ReadDiscreteInputs(coils) => read_data(coils.payload()),
            R::ReadInputRegisters(data)
            | R::ReadHoldingRegisters(data)
            | R::ReadWriteMultipleRegisters(data) => read_data(data.payload()),
            R::WriteSingleCoil(address) => format!("{header}, Write address: {}", addr(*address)),
            R::WriteSingleRegister(address, value) => format!(
                "{header}, Write address: {}, Write data: [{}]",
                addr(*address),
                hex_bytes(&value.to_be_bytes())
            ),
            R::WriteMultipleCoils(address, quantity)
            | R::WriteMultipleRegisters(address, quantity) => format!(
                "{header}, Write address: {}, Write quantity: {quantity}",
                addr(*address)
            ),
        }
    }

    fn exception(&self, unit_id: UnitId, exception: &ExceptionResponse) -> String {
        let line = format!(
            "Slave -> ID: {}, Exception: 0x{:02x}, Code: {}",
            self.id_format.id(unit_id),
            exception.function.value() | 0x80,
            exception.code
        );
        match exception.exception() {
            Some(known) => format!("{line} ({known})"),
            None => line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modbus_sniffer::rtu::Reassembler;

    fn render_all(render: Render, stream: &[u8]) -> Vec<String> {
        let mut reassembler = Reassembler::new();
        let mut events = reassembler.ingest(stream);
        // End of capture, as after a silence on the bus.
        events.extend(reassembler.ingest(&[]));
        let mut lines: Vec<_> = events.iter().map(|event| render.event(event)).collect();
        if let Some(noise) = reassembler.finish() {
            lines.push(Render::noise(&noise));
        }
        lines
    }

    #[test]
    fn read_holding_registers() {
        let lines = render_all(
            Render::default(),
            &[
                0x01, 0x03, 0x00, 0x00, 0x00, 0x0A, 0xC5, 0xCD, // request
                0x01, 0x03, 0x02, 0x01, 0x2C, 0xB8, 0x09, // response
            ],
        );
        assert_eq!(
            lines,
            [
                "Master -> ID: 1, Read Holding Registers: 0x03, Read address: 0, Read Quantity: 10",
                "Slave -> ID: 1, Read Holding Registers: 0x03, Read byte count: 2, Read data: [01 2c]",
            ]
        );
    }

    #[test]
    fn hex_number_formats() {
        let render = Render::from(Config {
            slave_id_format: NumberFormat::Hex,
            register_address_format: NumberFormat::Hex,
        });
        let lines = render_all(render, &[0x01, 0x06, 0x00, 0x01, 0x00, 0x03, 0x98, 0x0B]);
        assert_eq!(
            lines,
            [
                "Master -> ID: 0x01, Write Single Register: 0x06, Write address: 0x0001, Write data: [00 03]"
            ]
        );
    }

    #[test]
    fn write_frames() {
        let lines = render_all(
            Render::default(),
            &[
                0x01, 0x05, 0x00, 0x01, 0xFF, 0x00, 0xDD, 0xFA, // write single coil
                0x01, 0x05, 0x00, 0x01, 0xD0, 0x19, // echo
                0x01, 0x0F, 0x00, 0x13, 0x00, 0x0A, 0x02, 0xCD, 0x01, 0x72, 0xCB, // write coils
                0x01, 0x0F, 0x00, 0x13, 0x00, 0x0A, 0x24, 0x09, // echo
                0x01, 0x10, 0x00, 0x01, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x01, 0x02, 0x92,
                0x30, // write registers
                0x01, 0x10, 0x00, 0x01, 0x00, 0x02, 0x10, 0x08, // echo
            ],
        );
        assert_eq!(
            lines,
            [
                "Master -> ID: 1, Write Single Coil: 0x05, Write address: 1, Write data: [ff 00]",
                "Slave -> ID: 1, Write Single Coil: 0x05, Write address: 1",
                "Master -> ID: 1, Write Multiple Coils: 0x0f, Write address: 19, Write quantity: 10, Write data: [cd 01]",
                "Slave -> ID: 1, Write Multiple Coils: 0x0f, Write address: 19, Write quantity: 10",
                "Master -> ID: 1, Write Multiple Registers: 0x10, Write address: 1, Write quantity: 2, Write data: [00 0a 01 02]",
                "Slave -> ID: 1, Write Multiple Registers: 0x10, Write address: 1, Write quantity: 2",
            ]
        );
    }

    #[test]
    fn read_write_multiple_registers() {
        let lines = render_all(
            Render::default(),
            &[
                0x01, 0x17, 0x00, 0x03, 0x00, 0x06, 0x00, 0x04, 0x00, 0x03, 0x06, 0x00, 0xFF, 0x00,
                0xFF, 0x00, 0xFF, 0x66, 0xB1,
            ],
        );
        assert_eq!(
            lines,
            [
                "Master -> ID: 1, Read/Write Multiple Registers: 0x17, Read address: 3, Read Quantity: 6, \
                 Write address: 4, Write quantity: 3, Write data: [00 ff 00 ff 00 ff]"
            ]
        );
    }

    #[test]
    fn exceptions() {
        let lines = render_all(
            Render::default(),
            &[
                0x01, 0x83, 0x02, 0xC0, 0xF1, // illegal data address
                0x01, 0xAB, 0x02, 0xDE, 0xF1, // function code without shape
            ],
        );
        assert_eq!(
            lines,
            [
                "Slave -> ID: 1, Exception: 0x83, Code: 2 (Illegal data address)",
                "Slave -> ID: 1, Exception: 0xab, Code: 2 (Illegal data address)",
            ]
        );
    }

    #[test]
    fn noise() {
        let lines = render_all(
            Render::default(),
            &[0xFF, 0xFF, 0x01, 0x03, 0x00, 0x00, 0x00, 0x0A, 0xC5, 0xCD, 0x00, 0x2B],
        );
        assert_eq!(
            lines,
            [
                "Ignoring data: [ff ff]",
                "Master -> ID: 1, Read Holding Registers: 0x03, Read address: 0, Read Quantity: 10",
                "Ignoring data: [00 2b]",
            ]
        );
    }
}
