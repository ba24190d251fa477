pub mod dod;
pub mod gutmann;
pub mod random;
pub mod zero;


pub use dod::DoDPattern;
pub use gutmann::GutmannPattern;
pub use random::RandomPattern;
pub use zero::ZeroPattern;

use crate::DeletionMethod;
use std::borrow::Cow;
use std::io;

/// Overwrite plan for one method: how many passes, and which bytes each pass tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassPlan {
    method: DeletionMethod,
    passes: u32,
}

/// Map a deletion method to its pass count and pattern rule
pub fn patterns_for(method: DeletionMethod) -> PassPlan {
    let passes = match method {
        DeletionMethod::Simple => 0,
        DeletionMethod::ZeroFill => ZeroPattern::PASS_COUNT,
        DeletionMethod::DoD3 => DoDPattern::SHORT_PASS_COUNT,
        DeletionMethod::DoD7 => DoDPattern::LONG_PASS_COUNT,
        DeletionMethod::Gutmann => GutmannPattern::PASS_COUNT,
        DeletionMethod::Random(n) => n,
    };
    PassPlan { method, passes }
}

impl PassPlan {
    pub fn method(&self) -> DeletionMethod {
        self.method
    }

    pub fn pass_count(&self) -> u32 {
        self.passes
    }

    pub fn is_empty(&self) -> bool {
        self.passes == 0
    }

    /// Pattern block for `pass` (0-based). Fixed methods borrow a constant;
    /// `Random` draws a fresh block on every call.
    pub fn pattern(&self, pass: u32) -> io::Result<Cow<'static, [u8]>> {
        if pass >= self.passes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "pass {} out of range for {} ({} passes)",
                    pass, self.method, self.passes
                ),
            ));
        }

        let block = match self.method {
            // Zero passes, so the range check above already rejected every index
            DeletionMethod::Simple => Cow::Borrowed(&[][..]),
            DeletionMethod::ZeroFill => Cow::Borrowed(ZeroPattern::PATTERN),
            DeletionMethod::DoD3 | DeletionMethod::DoD7 => Cow::Borrowed(DoDPattern::for_pass(pass)),
            DeletionMethod::Gutmann => Cow::Borrowed(GutmannPattern::for_pass(pass)),
            DeletionMethod::Random(_) => Cow::Owned(RandomPattern::fresh_block()?),
        };
        Ok(block)
    }

    /// Human-readable name of the pattern used by `pass`, for traces
    pub fn describe(&self, pass: u32) -> String {
        match self.method {
            DeletionMethod::Simple => "none".to_string(),
            DeletionMethod::Gutmann => GutmannPattern::describe_pass(pass).to_string(),
            DeletionMethod::Random(_) => "random".to_string(),
            DeletionMethod::ZeroFill => hex(ZeroPattern::PATTERN),
            DeletionMethod::DoD3 | DeletionMethod::DoD7 => hex(DoDPattern::for_pass(pass)),
        }
    }
}

fn hex(pattern: &[u8]) -> String {
    pattern
        .iter()
        .map(|b| format!("0x{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
