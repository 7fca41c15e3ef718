pub mod memory;
pub mod models;

pub use memory::MemoryLinkStore;
pub use models::Link;

/// Key → [`Link`] mapping shared by the creation and retrieval paths
///
/// Callers always get copies back; nothing hands out references into the
/// store. A missing key is reported through the return value, never as an
/// error.
pub trait LinkStore: Send + Sync {
    /// Insert only if `key` is free. Exactly one concurrent caller per key
    /// sees `true`.
    fn create_if_absent(&self, key: &str, link: Link) -> bool;

    fn get(&self, key: &str) -> Option<Link>;

    /// Unconditional overwrite
    fn update(&self, key: &str, link: Link);

    /// Replace the stored link only if it still equals `expected`
    ///
    /// Returns `false` when the key is gone or another writer got there
    /// first. This is the primitive that keeps view counting race-free.
    fn compare_and_swap(&self, key: &str, expected: &Link, new: Link) -> bool;

    /// Unconditional, idempotent removal
    fn delete(&self, key: &str);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn backend_name(&self) -> &'static str;
}
