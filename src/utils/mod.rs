//! Key generation and key-shape checks

/// 62-symbol alphabet keys are drawn from
pub const KEY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    // 每个字符独立、均匀地从字母表中抽取
    iter::repeat_with(|| KEY_ALPHABET[rand::random_range(0..KEY_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// Source of candidate link keys
///
/// Implementations only need to produce well-distributed strings; uniqueness
/// is enforced by the store, not by the generator.
pub trait KeyGenerator: Send + Sync {
    fn generate(&self, length: usize) -> String;
}

/// Thread-local RNG backed generator used in production
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomKeyGenerator;

impl KeyGenerator for RandomKeyGenerator {
    fn generate(&self, length: usize) -> String {
        generate_random_code(length)
    }
}

/// Whether `key` could have been produced by a [`KeyGenerator`]
///
/// Used to reject junk paths before they reach the store.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_alphanumeric())
}
