use alloc::format;
use alloc::string::String;

use crate::Cell;

/// Purpose tag for the initial stock size of a fresh cache.
pub const INITIAL_VALUE: &str = "initialValue";

/// Maps any string to a reproducible value in `[0, 1)`.
pub fn luck(key: &str) -> f64 {
    f64::from(murmur3_32(key.as_bytes(), 0)) / 4_294_967_296.0
}

/// Builds the generator key for a question about `cell`: `"i,j"` without a purpose, `"i,j,purpose"` with one.
pub fn luck_key(cell: Cell, purpose: Option<&str>) -> String {
    match purpose {
        Some(purpose) => format!("{},{},{}", cell.i, cell.j, purpose),
        None => format!("{},{}", cell.i, cell.j),
    }
}

/// Convenience for `luck(&luck_key(cell, purpose))`.
pub fn cell_luck(cell: Cell, purpose: Option<&str>) -> f64 {
    luck(&luck_key(cell, purpose))
}

/// MurmurHash3, x86 32-bit variant.
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    const C1: u32 = 0xcc9e_2d51;
    const C2: u32 = 0x1b87_3593;

    let mut hash = seed;
    let mut chunks = data.chunks_exact(4);

    for chunk in &mut chunks {
        let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        k = k.wrapping_mul(C1);
        k = k.rotate_left(15);
        k = k.wrapping_mul(C2);

        hash ^= k;
        hash = hash.rotate_left(13);
        hash = hash.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut k = tail
            .iter()
            .rev()
            .fold(0u32, |acc, &byte| (acc << 8) | u32::from(byte));
        k = k.wrapping_mul(C1);
        k = k.rotate_left(15);
        k = k.wrapping_mul(C2);
        hash ^= k;
    }

    // wraps for inputs past 4GiB, same as the reference implementation
    hash ^= data.len() as u32;
    fmix32(hash)
}

const fn fmix32(mut hash: u32) -> u32 {
    hash ^= hash >> 16;
    hash = hash.wrapping_mul(0x85eb_ca6b);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(0xc2b2_ae35);
    hash ^= hash >> 16;
    hash
}
