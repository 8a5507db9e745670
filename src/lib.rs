// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![doc = include_str!("../README.md")]
#![no_std]

extern crate alloc;

mod codec;
mod error;
mod frame;

pub mod util;

pub use codec::DecoderType;
pub use codec::rtu;
pub use error::*;
pub use frame::*;
