//! Deterministic random sources for unit tests.

use rand::RngCore;

/// `RngCore` that returns the same word forever.
///
/// With rand's standard `f64` sampling the word `w` maps to
/// `(w >> 11) / 2^53`, so the helpers below yield exact uniforms.
#[derive(Debug)]
pub(crate) struct ConstantRng(pub u64);

impl ConstantRng {
    /// Every uniform sample is `0.0`.
    pub(crate) fn zero() -> Self {
        Self(0)
    }

    /// Every uniform sample is `0.5`.
    pub(crate) fn half() -> Self {
        Self(1 << 63)
    }

    /// Every uniform sample is `0.75`.
    pub(crate) fn three_quarters() -> Self {
        Self(3 << 62)
    }
}

impl RngCore for ConstantRng {
    fn next_u32(&mut self) -> u32 {
        (self.0 >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.0.to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
