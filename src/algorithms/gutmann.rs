// Reduced Gutmann pattern set
//
// The canonical Gutmann sequence is 35 distinct passes (4 random, 27 encoding
// specific, 4 random). This set keeps 21 representative patterns and cycles
// them over the conventional 35 passes, so passes 22..35 repeat passes 1..14.
// It is an approximation of the published sequence, not the full method.

pub struct GutmannPattern;

impl GutmannPattern {
    /// Conventional Gutmann pass count
    pub const PASS_COUNT: u32 = 35;

    pub(crate) const GUTMANN_PATTERNS: [(&'static [u8], &'static str); 21] = [
        (&[0x55], "0x55 - MFM/RLL encoding"),
        (&[0xAA], "0xAA - MFM/RLL encoding"),
        (&[0x92, 0x49, 0x24], "0x92 0x49 0x24 - MFM specific"),
        (&[0x49, 0x24, 0x92], "0x49 0x24 0x92 - MFM specific"),
        (&[0x24, 0x92, 0x49], "0x24 0x92 0x49 - MFM specific"),
        (&[0x00], "0x00 - All zeros"),
        (&[0x11], "0x11 - Pattern"),
        (&[0x22], "0x22 - Pattern"),
        (&[0x33], "0x33 - Pattern"),
        (&[0x44], "0x44 - Pattern"),
        (&[0x55], "0x55 - Pattern"),
        (&[0x66], "0x66 - Pattern"),
        (&[0x77], "0x77 - Pattern"),
        (&[0x88], "0x88 - Pattern"),
        (&[0x99], "0x99 - Pattern"),
        (&[0xAA], "0xAA - Pattern"),
        (&[0xBB], "0xBB - Pattern"),
        (&[0xCC], "0xCC - Pattern"),
        (&[0xDD], "0xDD - Pattern"),
        (&[0xEE], "0xEE - Pattern"),
        (&[0xFF], "0xFF - All ones"),
    ];

    pub fn for_pass(pass: u32) -> &'static [u8] {
        Self::GUTMANN_PATTERNS[pass as usize % Self::GUTMANN_PATTERNS.len()].0
    }

    pub fn describe_pass(pass: u32) -> &'static str {
        Self::GUTMANN_PATTERNS[pass as usize % Self::GUTMANN_PATTERNS.len()].1
    }
}
