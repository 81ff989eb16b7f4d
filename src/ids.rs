//! Id allocation for requests, collections and key/value rows.
//!
//! Ids are `<session>-<counter>` where the session prefix is the base-36
//! start time of the allocator. Unique within a session and, in practice,
//! across sessions; not meant to be unguessable.

/// Monotonic id allocator owned by the request tree
#[derive(Clone, Debug)]
pub struct IdAllocator {
    prefix: String,
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        Self::with_prefix(to_base36(millis))
    }

    /// Allocator with a fixed prefix, useful for deterministic ids
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        IdAllocator {
            prefix: prefix.into(),
            next: 1,
        }
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, to_base36(self.next));
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential_and_distinct() {
        let mut ids = IdAllocator::with_prefix("t");
        assert_eq!(ids.next_id(), "t-1");
        assert_eq!(ids.next_id(), "t-2");
        let many: std::collections::HashSet<_> = (0..100).map(|_| ids.next_id()).collect();
        assert_eq!(many.len(), 100);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
