use std::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{rngs::OsRng, CryptoRng, RngCore};
use thiserror::Error;

use crate::{
    algo,
    prime::{gen, PrimeError},
    sign::{self, Signature},
};

/// Smallest modulus that can always be built from two distinct primes with
/// their top two bits set (4, 6 and 8 bits never can)
pub const MIN_KEY_SIZE: u64 = 12;
pub const MAX_KEY_SIZE: u64 = 16384;

/// Default exponent for RSA keys
pub const EXP: u64 = 65537;

#[derive(Debug, Error)]
pub enum RsaError {
    #[error("modulus must not be zero")]
    InvalidModulus,
}

#[derive(Debug, Error)]
pub enum RsaGenError {
    #[error("key size {0} is too small")]
    KeyTooSmall(u64),

    #[error("key size {0} is too big")]
    KeyTooBig(u64),

    #[error("cannot generate prime: {0}")]
    Prime(#[from] PrimeError),
}

/// Rsa private key
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPrivate {
    d: BigUint,
    n: BigUint,
}

/// Rsa public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublic {
    e: BigUint,
    n: BigUint,
}

impl RsaPrivate {
    pub fn new(n: BigUint, d: BigUint) -> Result<Self, RsaError> {
        if n.is_zero() {
            return Err(RsaError::InvalidModulus);
        }
        Ok(Self { d, n })
    }

    /// Signs `msg` with SHA-256, see [`sign::sign`]
    pub fn sign(&self, msg: &[u8]) -> Signature {
        sign::sign(msg, self)
    }

    /// num^d mod n. Unlike decryption the input is not required to be below n.
    pub(crate) fn sign_raw(&self, num: &BigUint) -> BigUint {
        num.modpow(&self.d, &self.n)
    }

    /// Get a reference to the rsa private's n.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Get a reference to the rsa private's d.
    pub fn d(&self) -> &BigUint {
        &self.d
    }
}

impl fmt::Debug for RsaPrivate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivate")
            .field("n", &self.n)
            .finish_non_exhaustive()
    }
}

impl RsaPublic {
    pub fn new(n: BigUint, e: BigUint) -> Result<Self, RsaError> {
        if n.is_zero() {
            return Err(RsaError::InvalidModulus);
        }
        Ok(Self { e, n })
    }

    /// Checks a SHA-256 signature of `msg`, see [`sign::verify`]
    pub fn verify(&self, signature: Option<&Signature>, msg: &[u8]) -> bool {
        sign::verify(signature, msg, self)
    }

    /// sig^e mod n
    pub(crate) fn verify_raw(&self, sig: &BigUint) -> BigUint {
        sig.modpow(&self.e, &self.n)
    }

    /// Get a reference to the rsa public's e.
    pub fn e(&self) -> &BigUint {
        &self.e
    }

    /// Get a reference to the rsa public's n.
    pub fn n(&self) -> &BigUint {
        &self.n
    }
}

/// Where key generation takes its primes from.
///
/// The generator never checks primality itself, so a source handing out
/// fixed numbers can drive it through a known sequence of candidates.
pub trait PrimeSource {
    /// Returns a prime with exactly `bits` bits
    fn prime(&mut self, bits: u64) -> Result<BigUint, PrimeError>;
}

/// Random primes drawn from a cryptographically secure rng
pub struct RandomPrimes<R>(pub R);

impl<R: RngCore + CryptoRng> PrimeSource for RandomPrimes<R> {
    fn prime(&mut self, bits: u64) -> Result<BigUint, PrimeError> {
        gen::new_prime(&mut self.0, bits)
    }
}

/// Checks whether `p` and `q` can make a key with public exponent `e`.
///
/// They must differ and `(p - 1)(q - 1)` must be coprime with `e`. Primality is
/// not checked.
pub fn is_usable_pair(p: &BigUint, q: &BigUint, e: &BigUint) -> bool {
    if p == q {
        return false;
    }
    let totient = algo::totient_product(p, q);
    algo::gcd(&totient, e).is_one()
}

/// Generates RSA key pair with a modulus of exactly `size` bits.
///
/// Primes are drawn from the operating system's rng. Any failure of the rng
/// aborts generation.
pub fn generate_rsa_pair(size: u64) -> Result<(RsaPublic, RsaPrivate), RsaGenError> {
    generate_rsa_pair_with(&mut RandomPrimes(OsRng), size)
}

/// Generates RSA key pair taking the primes from `source`
#[allow(clippy::many_single_char_names)]
pub fn generate_rsa_pair_with<S: PrimeSource + ?Sized>(
    source: &mut S,
    size: u64,
) -> Result<(RsaPublic, RsaPrivate), RsaGenError> {
    if size < MIN_KEY_SIZE {
        return Err(RsaGenError::KeyTooSmall(size));
    }
    if size > MAX_KEY_SIZE {
        return Err(RsaGenError::KeyTooBig(size));
    }
    let e = BigUint::from(EXP);

    // for odd sizes q gets the extra bit
    let (p_bits, q_bits) = (size / 2, size - size / 2);

    let draw = || -> Result<_, PrimeError> {
        let p = source.prime(p_bits)?;
        let q = source.prime(q_bits)?;
        Ok((p, q))
    };
    let accept = |(p, q): &(BigUint, BigUint)| {
        let usable = is_usable_pair(p, q, &e);
        if !usable {
            log::trace!("prime pair rejected for a {}-bit key", size);
        }
        usable
    };
    let ((p, q), attempts) = algo::retry(draw, accept)?;

    let n = &p * &q;
    let totient = algo::totient_product(&p, &q);
    let d = algo::invmod(&e, &totient).expect("e is coprime with the totient");
    log::debug!(
        "generated {}-bit rsa key pair after {} attempt(s)",
        n.bits(),
        attempts
    );

    let public = RsaPublic { e, n: n.clone() };
    let private = RsaPrivate { d, n };
    Ok((public, private))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use num_bigint::RandBigInt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::prime::gen::tests::BrokenRng;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    /// Hands out the given numbers in order, ignoring the requested size
    struct FixedPrimes(VecDeque<u64>);

    impl PrimeSource for FixedPrimes {
        fn prime(&mut self, _bits: u64) -> Result<BigUint, PrimeError> {
            let next = self.0.pop_front().expect("ran out of candidates");
            Ok(big(next))
        }
    }

    #[test]
    fn usable_pairs() {
        assert!(is_usable_pair(&big(3), &big(11), &big(3)));
        assert!(is_usable_pair(&big(11), &big(3), &big(3)));
        assert!(is_usable_pair(&big(3), &big(5), &big(3)));
        assert!(is_usable_pair(&big(1091), &big(1093), &big(11)));
    }

    #[test]
    fn unusable_pairs() {
        // equal primes
        assert!(!is_usable_pair(&big(11), &big(11), &big(3)));
        // totient 24 shares 3 with e
        assert!(!is_usable_pair(&big(5), &big(7), &big(3)));
        assert!(!is_usable_pair(&big(1091), &big(1093), &big(3)));
    }

    #[test]
    fn usable_pairs_not_prime() {
        // (9 - 1)(15 - 1) = 112
        assert!(is_usable_pair(&big(9), &big(15), &big(3)));
        assert!(!is_usable_pair(&big(9), &big(15), &big(7)));
    }

    #[test]
    fn modulus_length() {
        let mut source = RandomPrimes(ChaCha8Rng::seed_from_u64(2048));
        for k in [208, 101, 40, 23, 13, 12] {
            let (public, private) = generate_rsa_pair_with(&mut source, k).unwrap();
            assert_eq!(public.n().bits(), k);
            assert_eq!(public.n(), private.n());
            assert_eq!(public.e(), &big(EXP));
        }
    }

    #[test]
    fn modulus_length_os_rng() {
        let (public, _) = generate_rsa_pair(2048).unwrap();
        assert_eq!(public.n().bits(), 2048);
    }

    #[test]
    fn rsa_raw_roundtrip() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut source = RandomPrimes(rng.clone());
        let (public, private) = generate_rsa_pair_with(&mut source, 512).unwrap();
        for _ in 0..10 {
            let x = rng.gen_biguint_below(public.n());
            assert_eq!(public.verify_raw(&private.sign_raw(&x)), x);
        }
    }

    #[test]
    fn key_size_bounds() {
        assert!(matches!(
            generate_rsa_pair(11),
            Err(RsaGenError::KeyTooSmall(11))
        ));
        assert!(matches!(
            generate_rsa_pair(0),
            Err(RsaGenError::KeyTooSmall(0))
        ));
        assert!(matches!(
            generate_rsa_pair(MAX_KEY_SIZE + 1),
            Err(RsaGenError::KeyTooBig(_))
        ));
    }

    #[test]
    fn retries_until_usable() {
        // (11, 11) are equal, 131075 - 1 = 2 * 65537, (61, 53) is usable
        let mut source = FixedPrimes(VecDeque::from([11, 11, 131075, 13, 61, 53]));
        let (public, private) = generate_rsa_pair_with(&mut source, 12).unwrap();

        assert!(source.0.is_empty());
        assert_eq!(public.n(), &big(3233));
        let d = algo::invmod(&big(EXP), &big(3120)).unwrap();
        assert_eq!(private.d(), &d);
        assert_eq!((d * EXP) % 3120u32, big(1));
    }

    #[test]
    fn broken_rng_aborts() {
        let res = generate_rsa_pair_with(&mut RandomPrimes(BrokenRng), 1024);
        assert!(matches!(res, Err(RsaGenError::Prime(PrimeError::Rng(_)))));
    }

    #[test]
    fn zero_modulus() {
        assert!(matches!(
            RsaPublic::new(big(0), big(EXP)),
            Err(RsaError::InvalidModulus)
        ));
        assert!(matches!(
            RsaPrivate::new(big(0), big(7)),
            Err(RsaError::InvalidModulus)
        ));
        assert!(RsaPublic::new(big(3233), big(17)).is_ok());
    }

    #[test]
    fn private_debug_hides_exponent() {
        let private = RsaPrivate::new(big(3233), big(2753)).unwrap();
        let shown = format!("{:?}", private);
        assert!(shown.contains("3233"));
        assert!(!shown.contains("2753"));
    }
}
