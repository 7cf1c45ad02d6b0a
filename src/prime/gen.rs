use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};

use super::{ver, PrimeError};
use crate::algo;

/// Generates a random probable prime with exactly `bits` bits.
///
/// The two most significant bits of every candidate are set, so the product of
/// a `a`-bit and a `b`-bit prime is always `a + b` bits long.
///
/// Fails if `bits < 2` or if the random source can't deliver bytes.
pub fn new_prime<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    bits: u64,
) -> Result<BigUint, PrimeError> {
    if bits < 2 {
        return Err(PrimeError::TooSmall(bits));
    }
    let (prime, _) = algo::retry(|| candidate(rng, bits), ver::is_prime)?;
    Ok(prime)
}

/// Random odd number with exactly `bits` bits and the top two bits set
fn candidate<R: RngCore + ?Sized>(rng: &mut R, bits: u64) -> Result<BigUint, PrimeError> {
    let len = ((bits + 7) / 8) as usize;
    let mut bytes = vec![0u8; len];
    rng.try_fill_bytes(&mut bytes)?;

    // number of used bits in the leading byte
    let top = match (bits % 8) as u32 {
        0 => 8,
        b => b,
    };
    bytes[0] &= ((1u16 << top) - 1) as u8;
    if top >= 2 {
        bytes[0] |= 3u8 << (top - 2);
    } else {
        // top == 1 only happens for bits >= 9, so there is a second byte
        bytes[0] |= 1;
        bytes[1] |= 0x80;
    }
    bytes[len - 1] |= 1;

    Ok(BigUint::from_bytes_be(&bytes))
}
