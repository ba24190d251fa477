// DoD-style overwrite patterns
//
// Both the 3-pass and 7-pass variants draw from the same three single-byte
// patterns; the pattern for pass i is PATTERNS[i % 3]. The third DoD pass is a
// fixed 0x00 here, not random data.

pub struct DoDPattern;

impl DoDPattern {
    /// Pass 1 pattern (all zeros)
    pub const PASS_1_PATTERN: u8 = 0x00;

    /// Pass 2 pattern (all ones)
    pub const PASS_2_PATTERN: u8 = 0xFF;

    /// Pass 3 pattern (all zeros again)
    pub const PASS_3_PATTERN: u8 = 0x00;

    pub const PATTERNS: [&'static [u8]; 3] = [
        &[Self::PASS_1_PATTERN],
        &[Self::PASS_2_PATTERN],
        &[Self::PASS_3_PATTERN],
    ];

    pub const SHORT_PASS_COUNT: u32 = 3;

    pub const LONG_PASS_COUNT: u32 = 7;

    pub fn for_pass(pass: u32) -> &'static [u8] {
        Self::PATTERNS[pass as usize % Self::PATTERNS.len()]
    }
}
