// Zero fill - single pass writing zeros
//
// Fast and predictable. Useful for quick sanitization where the threat is
// casual undelete rather than a lab.

pub struct ZeroPattern;

impl ZeroPattern {
    pub const PATTERN: &'static [u8] = &[0x00];

    pub const PASS_COUNT: u32 = 1;
}
