use thiserror::Error;

/// Random probable-prime generation of an exact bit length
pub mod gen;

/// Primality checks
pub mod ver;

#[derive(Debug, Error)]
pub enum PrimeError {
    #[error("prime size must be at least 2 bits, got {0}")]
    TooSmall(u64),

    #[error("random source failed: {0}")]
    Rng(#[from] rand::Error),
}
