pub mod secure_rng;

// Re-export
pub use secure_rng::secure_random_bytes;
