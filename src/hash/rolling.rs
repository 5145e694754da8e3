// Weak rolling hash over fixed 16-byte windows.
//
// Rabin-Karp style polynomial hash:
//
//   H(w) = ( sum w[i] * SEED^(W-1-i) ) mod MODULUS
//
// computed over signed 64-bit integers with a Euclidean (non-negative)
// modulus. The constants are coupled: with SEED = 11 and WINDOW_SIZE = 16,
// the largest intermediate term `byte * SEED^15` is about 1.07e18 and fits
// an i64 with headroom. Rust's `%` truncates toward zero and would go
// negative in `roll()`, so every reduction goes through `rem_euclid`.

/// Window width in bytes. Fixed for the lifetime of a signature.
pub const WINDOW_SIZE: usize = 16;

/// Polynomial base. Prime; 16 bytes is the widest window this seed
/// supports without overflowing i64 intermediates.
pub const SEED: i64 = 11;

/// Hash modulus, 10^11 + 9.
pub const MODULUS: i64 = 100_000_000_009;

/// SEED^(WINDOW_SIZE - 1), the weight of the front byte.
const FRONT_WEIGHT: i64 = seed_pow(WINDOW_SIZE as u32 - 1);

const fn seed_pow(mut n: u32) -> i64 {
    let mut acc = 1i64;
    while n > 0 {
        acc *= SEED;
        n -= 1;
    }
    acc
}

/// Euclidean modulus: result always in `[0, MODULUS)`.
#[inline(always)]
fn reduce(value: i64) -> i64 {
    value.rem_euclid(MODULUS)
}

/// Compute the weak hash of a full window from scratch.
///
/// Horner evaluation; the unreduced sum stays below 1.2e18, so a single
/// final reduction matches reducing term by term.
#[inline]
pub fn weak_checksum(window: &[u8; WINDOW_SIZE]) -> i64 {
    let mut hash = 0i64;
    for &byte in window {
        hash = hash * SEED + byte as i64;
    }
    reduce(hash)
}

/// Roll the weak hash one byte forward: `evicted` leaves the front of the
/// window, `appended` enters the back.
///
///   H' = ((( H - (evicted * SEED^(W-1)) mod M ) * SEED) mod M + appended) mod M
///
/// Reductions happen at exactly the points above so the result is
/// identical to `weak_checksum` of the shifted window.
#[inline(always)]
pub fn roll(hash: i64, evicted: u8, appended: u8) -> i64 {
    let front_term = reduce(evicted as i64 * FRONT_WEIGHT);
    let shifted = reduce((hash - front_term) * SEED);
    reduce(shifted + appended as i64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
