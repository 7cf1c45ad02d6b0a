use num_bigint::{BigInt, BigUint, ToBigInt};
use num_integer::Integer;
use num_traits::{CheckedSub, One, Zero};

/// Greatest common divisor, Euclidean algorithm.
///
/// `gcd(m, 0) = m`, otherwise `gcd(n, m mod n)`. Written as a loop so large
/// operands don't grow the stack.
pub fn gcd(m: &BigUint, n: &BigUint) -> BigUint {
    let (mut m, mut n) = (m.clone(), n.clone());
    while !n.is_zero() {
        let r = &m % &n;
        m = n;
        n = r;
    }
    m
}

/// Computes (p - 1) * (q - 1).
///
/// No primality check is made, the arguments are only *interpreted* as primes.
/// A zero argument contributes a zero factor.
pub fn totient_product(p: &BigUint, q: &BigUint) -> BigUint {
    let one = BigUint::one();
    let p1 = p.checked_sub(&one).unwrap_or_default();
    let q1 = q.checked_sub(&one).unwrap_or_default();
    p1 * q1
}

/// Extended Euclidian algorithm.
///
/// Returns `(g, s, t)` such that `a*s + b*t = g = gcd(a, b)`.
#[allow(clippy::many_single_char_names)]
pub fn egcd(a: &BigUint, b: &BigUint) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (BigInt::from(a.clone()), BigInt::from(b.clone()));
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let q = &old_r / &r;

        let next = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next);

        let next = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next);

        let next = &old_t - &q * &t;
        old_t = std::mem::replace(&mut t, next);
    }
    (old_r, old_s, old_t)
}

/// Modular inverse of `a` modulo `n`. Returns `None` if the inverse doesn't exist.
pub fn invmod(a: &BigUint, n: &BigUint) -> Option<BigUint> {
    if n.is_zero() {
        return None;
    }
    let (g, inverse, _) = egcd(a, n);
    if !g.is_one() {
        return None;
    }
    let n = n.to_bigint()?;
    inverse.mod_floor(&n).to_biguint()
}

/// Draws candidates until one is accepted.
///
/// A failing `draw` stops the loop and its error is returned as is. On success
/// returns the accepted candidate together with the number of draws it took.
pub fn retry<T, E>(
    mut draw: impl FnMut() -> Result<T, E>,
    accept: impl Fn(&T) -> bool,
) -> Result<(T, u64), E> {
    let mut attempts = 0u64;
    loop {
        attempts += 1;
        let candidate = draw()?;
        if accept(&candidate) {
            return Ok((candidate, attempts));
        }
    }
}
