use zeroize::{Zeroize, ZeroizeOnDrop};

/// A BIP-39 seed (512 bits), zeroised when it goes out of scope.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 64]);

impl Seed {
    pub(crate) fn new(bytes: [u8; 64]) -> Self {
        Seed(bytes)
    }

    /// The raw seed bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}
