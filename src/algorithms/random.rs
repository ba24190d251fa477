use crate::crypto::secure_rng::secure_random_bytes;
use std::io;

pub struct RandomPattern;

impl RandomPattern {
    /// Size of each random block; tiled across the file like any other pattern
    pub const BLOCK_SIZE: usize = 1024;

    /// Draw a new block from the system CSPRNG. Blocks are independent per
    /// pass and per file.
    pub fn fresh_block() -> io::Result<Vec<u8>> {
        let mut block = vec![0u8; Self::BLOCK_SIZE];
        secure_random_bytes(&mut block)?;
        Ok(block)
    }
}
