//! Reading and result blocks exchanged with a flow computer over Modbus.
//!
//! Each value is an IEEE-754 `f32` split across two holding registers, high
//! word first. The reading block is, in order: differential, static
//! pressure, temperature, orifice bore, density.

use std::io;

use tokio_modbus::prelude::*;

use crate::reading::{from_raw, Reading};

/// Registers occupied by one reading block.
pub const READING_REGISTERS: u16 = 10;

pub fn f32_to_u16(f_number: f32) -> [u16; 2] {
    let bits = f_number.to_bits();

    let first = ((bits >> 16) & 0xffff) as u16;
    let second = (bits & 0xffff) as u16;

    [first, second]
}

pub fn u16_to_f32(first: u16, second: u16) -> f32 {
    f32::from_bits((u32::from(first) << 16) | u32::from(second))
}

/// Decodes a reading block; sentinel and NaN values become absent measurements.
pub fn decode_reading(buff: &[u16]) -> io::Result<Reading> {
    if buff.len() < usize::from(READING_REGISTERS) {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {READING_REGISTERS} registers, got {}", buff.len()),
        ));
    }
    let value = |i: usize| from_raw(f64::from(u16_to_f32(buff[2 * i], buff[2 * i + 1])));

    Ok(Reading {
        differential: value(0),
        static_pressure: value(1),
        temperature: value(2),
        orifice_d: value(3),
        density: value(4),
    })
}

/// Actual then base flow, MCF/D.
pub fn encode_flows(actual_mcfd: f64, base_mcfd: f64) -> [u16; 4] {
    let [a0, a1] = f32_to_u16(actual_mcfd as f32);
    let [b0, b1] = f32_to_u16(base_mcfd as f32);
    [a0, a1, b0, b1]
}

pub fn read_reading(ctx: &mut sync::Context, register: u16) -> io::Result<Reading> {
    let buff = ctx.read_holding_registers(register, READING_REGISTERS)?;
    decode_reading(&buff)
}

pub fn write_flows(
    ctx: &mut sync::Context,
    register: u16,
    actual_mcfd: f64,
    base_mcfd: f64,
) -> io::Result<()> {
    ctx.write_multiple_registers(register, &encode_flows(actual_mcfd, base_mcfd))
}
