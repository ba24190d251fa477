use ring::rand::{SecureRandom, SystemRandom};
use std::io;
use std::sync::OnceLock;

/// Process-wide handle to the operating system CSPRNG
static SYSTEM_RNG: OnceLock<SystemRandom> = OnceLock::new();

fn system_rng() -> &'static SystemRandom {
    SYSTEM_RNG.get_or_init(SystemRandom::new)
}

/// Fill `dest` with cryptographically secure random bytes
pub fn secure_random_bytes(dest: &mut [u8]) -> io::Result<()> {
    system_rng()
        .fill(dest)
        .map_err(|_| io::Error::other("system random source failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_whole_buffer() {
        let mut buf = [0u8; 4096];
        secure_random_bytes(&mut buf).unwrap();
        // Probability of a 4KB all-zero draw is negligible
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_empty_buffer_is_ok() {
        let mut buf: [u8; 0] = [];
        assert!(secure_random_bytes(&mut buf).is_ok());
    }

    #[test]
    fn test_consecutive_draws_differ() {
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        secure_random_bytes(&mut a).unwrap();
        secure_random_bytes(&mut b).unwrap();
        assert_ne!(a, b);
    }
}
