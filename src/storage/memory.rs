//! In-memory link store
//!
//! One mutex guards the whole map. Every operation is a short critical
//! section with no await inside, so a blocking `parking_lot` lock is fine to
//! take from async handlers.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::trace;

use super::{Link, LinkStore};

#[derive(Default)]
pub struct MemoryLinkStore {
    links: Mutex<HashMap<String, Link>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LinkStore for MemoryLinkStore {
    fn create_if_absent(&self, key: &str, link: Link) -> bool {
        use std::collections::hash_map::Entry;

        match self.links.lock().entry(key.to_string()) {
            Entry::Occupied(_) => {
                trace!("MemoryLinkStore: key '{}' already taken", key);
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(link);
                true
            }
        }
    }

    fn get(&self, key: &str) -> Option<Link> {
        self.links.lock().get(key).cloned()
    }

    fn update(&self, key: &str, link: Link) {
        self.links.lock().insert(key.to_string(), link);
    }

    fn compare_and_swap(&self, key: &str, expected: &Link, new: Link) -> bool {
        let mut links = self.links.lock();
        match links.get_mut(key) {
            Some(current) if current == expected => {
                *current = new;
                true
            }
            _ => false,
        }
    }

    fn delete(&self, key: &str) {
        self.links.lock().remove(key);
    }

    fn len(&self) -> usize {
        self.links.lock().len()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
