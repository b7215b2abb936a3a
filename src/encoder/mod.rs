//! Base62 short-code derivation.
//!
//! Codes are derived from store-issued numeric ids. The store never reuses
//! an id, so the mapping is injective and no collision check is needed
//! anywhere. There is no decode path; lookups always go through storage.

const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const BASE: u64 = 62;

/// Convert a numeric id to its base62 display code.
///
/// Remainders are collected least-significant first and reversed, so the
/// output reads most-significant first. `encode(0)` yields `"a"`, never an
/// empty string.
pub fn encode(mut n: u64) -> String {
    if n == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut out = Vec::new();
    while n > 0 {
        out.push(ALPHABET[(n % BASE) as usize]);
        n /= BASE;
    }

    out.iter().rev().map(|&b| b as char).collect()
}
