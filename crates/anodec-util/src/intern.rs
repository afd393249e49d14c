//! Global string interner.
//!
//! Identifiers, keywords and token texts recur constantly during
//! compilation; interning stores one copy of each distinct string and hands
//! out a compact [`Name`] handle, so comparisons are a single integer
//! compare and symbol-table keys stay 4 bytes wide.
//!
//! The table is a process-wide `DashMap` hashed with `ahash`, initialized on
//! first use. Interned strings are intentionally leaked: the table lives for
//! the whole process and the total volume of distinct identifiers in a
//! compilation session is small.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{LazyLock, Mutex};

use ahash::AHasher;
use dashmap::DashMap;

use crate::error::InternError;

/// An interned string.
///
/// `Name` is 4 bytes and `Copy`; two `Name`s compare equal exactly when the
/// strings they intern are equal.
///
/// # Examples
///
/// ```
/// use anodec_util::Name;
///
/// let a = Name::intern("foo");
/// let b = Name::intern("foo");
/// let c = Name::intern("bar");
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// assert_eq!(a.as_str(), "foo");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(u32);

impl Name {
    /// Intern a string, returning its handle.
    pub fn intern(string: &str) -> Self {
        NAME_TABLE.intern(string)
    }

    /// The interned string.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not produced by [`Name::intern`] in this
    /// process.
    pub fn as_str(self) -> &'static str {
        NAME_TABLE
            .get(self)
            .expect("Name handle does not exist in the intern table")
    }

    /// Fallible lookup variant of [`Name::as_str`].
    pub fn try_as_str(self) -> Result<&'static str, InternError> {
        NAME_TABLE.get(self).ok_or(InternError::NotFound { index: self.0 })
    }

    /// Raw index, for debugging and serialization.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match NAME_TABLE.get(*self) {
            Some(s) => write!(f, "Name({:?})", s),
            None => write!(f, "Name(#{})", self.0),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static NAME_TABLE: LazyLock<NameTable> = LazyLock::new(NameTable::new);

/// The process-wide string table behind [`Name`].
struct NameTable {
    /// string hash -> (string, index). The hash key avoids re-hashing the
    /// string contents on every probe; collisions fall back to the slow path.
    map: DashMap<u64, (&'static str, u32)>,
    /// Reverse lookup, index -> string.
    strings: Mutex<Vec<&'static str>>,
    /// Next index to hand out.
    next_index: AtomicU32,
}

impl NameTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity(256),
            strings: Mutex::new(Vec::with_capacity(256)),
            next_index: AtomicU32::new(0),
        }
    }

    fn intern(&self, string: &str) -> Name {
        let hash = Self::hash(string);
        if let Some(entry) = self.map.get(&hash) {
            let (existing, index) = *entry;
            if existing == string {
                return Name(index);
            }
            // Hash collision between distinct strings: fall back to a linear
            // scan of the reverse table.
            drop(entry);
            let strings = self.strings.lock().unwrap();
            for (i, s) in strings.iter().enumerate() {
                if *s == string {
                    return Name(i as u32);
                }
            }
        }

        let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let mut strings = self.strings.lock().unwrap();
        // Re-check under the lock so two racing interns agree on the index.
        if let Some(entry) = self.map.get(&hash) {
            let (existing, index) = *entry;
            if existing == string {
                return Name(index);
            }
        }
        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        strings.push(leaked);
        self.map.insert(hash, (leaked, index));
        Name(index)
    }

    fn get(&self, name: Name) -> Option<&'static str> {
        self.strings.lock().unwrap().get(name.0 as usize).copied()
    }

    fn hash(string: &str) -> u64 {
        let mut hasher = AHasher::default();
        string.hash(&mut hasher);
        hasher.finish()
    }
}

/// Counter for synthesized unique names (anonymous scopes).
static UNIQUE_NAME_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Produce a fresh process-unique name such as `$scope_17`.
pub fn unique_name(prefix: &str) -> String {
    let n = UNIQUE_NAME_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("${}_{}", prefix, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let a = Name::intern("hello");
        let b = Name::intern("hello");
        assert_eq!(a, b);
        assert_eq!(a.as_u32(), b.as_u32());
    }

    #[test]
    fn test_intern_distinct() {
        let a = Name::intern("alpha");
        let b = Name::intern("beta");
        assert_ne!(a, b);
    }

    #[test]
    fn test_as_str_round_trip() {
        let n = Name::intern("round_trip");
        assert_eq!(n.as_str(), "round_trip");
        assert_eq!(n.try_as_str().unwrap(), "round_trip");
    }

    #[test]
    fn test_display() {
        let n = Name::intern("shown");
        assert_eq!(format!("{}", n), "shown");
    }

    #[test]
    fn test_unique_name_distinct() {
        let a = unique_name("scope");
        let b = unique_name("scope");
        assert_ne!(a, b);
        assert!(a.starts_with("$scope_"));
    }
}
