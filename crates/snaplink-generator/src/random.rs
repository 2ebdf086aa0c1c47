use crate::Generator;
use rand::Rng;
use snaplink_core::ShortCode;

/// Symbols a generated code is drawn from: lower and upper Latin letters, then digits.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated code.
pub const CODE_LENGTH: usize = 6;

/// Draws every symbol uniformly from [`ALPHABET`] using the thread-local RNG.
///
/// The RNG is not cryptographically secure and nothing here checks for
/// uniqueness. With 62^6 possible codes collisions are rare but possible.
#[derive(Debug, Clone, Copy)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    pub fn new() -> Self {
        Self {
            length: CODE_LENGTH,
        }
    }

    /// Creates a generator producing codes of a custom length (clamped to 1..=32).
    pub fn with_length(length: usize) -> Self {
        Self {
            length: length.clamp(1, 32),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> ShortCode {
        let mut rng = rand::thread_rng();
        let code: String = (0..self.length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        ShortCode::new_unchecked(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_have_fixed_length_and_alphabet() {
        let generator = RandomGenerator::new();

        for _ in 0..1_000 {
            let code = generator.generate();
            assert_eq!(code.as_str().len(), CODE_LENGTH);
            assert!(code.as_str().bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn generated_codes_pass_validation() {
        let generator = RandomGenerator::new();
        let code = generator.generate();
        assert!(ShortCode::new(code.as_str()).is_ok());
    }

    #[test]
    fn successive_codes_differ() {
        let generator = RandomGenerator::new();
        let codes: HashSet<_> = (0..100).map(|_| generator.generate()).collect();
        assert_eq!(codes.len(), 100);
    }

    #[test]
    fn alphabet_has_no_duplicates() {
        let unique: HashSet<_> = ALPHABET.iter().collect();
        assert_eq!(unique.len(), 62);
    }

    #[test]
    fn custom_length_is_clamped() {
        assert_eq!(RandomGenerator::with_length(10).generate().as_str().len(), 10);
        assert_eq!(RandomGenerator::with_length(0).length(), 1);
        assert_eq!(RandomGenerator::with_length(100).length(), 32);
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}
