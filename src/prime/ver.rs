use lazy_static::lazy_static;
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, ToPrimitive};
use rand::Rng;

/// Number of Miller-Rabin rounds used by [`is_prime`]
pub const PRIME_ROUNDS: usize = 20;

/// Odd primes whose product still fits into u64. Dividing by them first
/// throws away most composite candidates before any modpow is done.
const SMALL_PRIMES: [u64; 15] = [3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];

/// Every number below 59^2 without a factor from `SMALL_PRIMES` (or 2) is prime.
const TRIAL_DIVISION_LIMIT: u64 = 59 * 59;

lazy_static! {
    static ref SMALL_PRIMES_PRODUCT: BigUint = BigUint::from(16_294_579_238_595_022_365u64);
}

/// Reports whether `n` is prime.
///
/// Exact for numbers below 59^2, probabilistic above that: trial division by
/// small primes followed by [`PRIME_ROUNDS`] rounds of Miller-Rabin, one of
/// them with base 2 and the rest with random bases.
pub fn is_prime(n: &BigUint) -> bool {
    is_probable_prime(n, PRIME_ROUNDS, &mut rand::thread_rng())
}

/// Same as [`is_prime`] with the caller choosing the rounds and the source of
/// Miller-Rabin bases.
pub fn is_probable_prime<R: Rng + ?Sized>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    if n < &BigUint::from(2u8) {
        return false;
    }
    if n.is_even() {
        return n == &BigUint::from(2u8);
    }

    let Some(rem) = (n % &*SMALL_PRIMES_PRODUCT).to_u64() else {
        return false;
    };
    for p in SMALL_PRIMES {
        if rem % p == 0 {
            // either n is p itself or a multiple of it
            return n == &BigUint::from(p);
        }
    }
    if n < &BigUint::from(TRIAL_DIVISION_LIMIT) {
        return true;
    }

    miller_rabin(n, rounds.max(1), rng)
}

/// Miller-Rabin test, see Handbook of Applied Cryptography, Algorithm 4.24.
/// `n` must be odd and greater than 3.
fn miller_rabin<R: Rng + ?Sized>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u8);
    let n_minus_one = n - &one;

    // n - 1 = d * 2^s
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for round in 0..rounds {
        let base = if round == 0 {
            two.clone()
        } else {
            rng.gen_biguint_range(&two, &n_minus_one)
        };

        let mut x = base.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = &x * &x % n;
            if x == n_minus_one {
                continue 'witness;
            }
            if x == one {
                return false;
            }
        }
        return false;
    }
    true
}
