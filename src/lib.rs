/// Module dedicated to the number theory helpers: gcd, totient, modular
/// inverse
pub mod algo;

/// Module dedicated to the prime number generation and verification
pub mod prime;

/// Module dedicated to the rsa keys and their generation
pub mod rsa;

/// Module dedicated to the textbook rsa signatures
pub mod sign;

pub use rsa::{generate_rsa_pair, RsaPrivate, RsaPublic};
pub use sign::{sign, verify, Signature};
