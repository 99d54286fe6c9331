//! Conversions between `BitVec` and the textual `'0'`/`'1'` form.

use bitvec::prelude::*;

use crate::error::{DecodeError, Result};

pub fn to_bit_string(bits: &BitSlice) -> String {
    bits.iter()
        .by_vals()
        .map(|b| if b { '1' } else { '0' })
        .collect()
}

pub fn parse_bit_string(text: &str) -> Result<BitVec> {
    let mut out = BitVec::with_capacity(text.len());
    for (position, c) in text.chars().enumerate() {
        match c {
            '0' => out.push(false),
            '1' => out.push(true),
            found => return Err(DecodeError::InvalidBit { position, found }.into()),
        }
    }

    Ok(out)
}
