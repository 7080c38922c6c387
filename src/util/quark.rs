//! Interned string keys.
//!
//! A [`Quark`] is a small `Copy` handle standing in for a string. Interning
//! the same string twice yields the same quark, so key equality and hashing
//! never touch the string bytes. Interned strings live for the rest of the
//! process.

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::OnceLock;

use parking_lot::RwLock;

/// Interned string handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quark(NonZeroU32);

struct Interner {
    /// Slot `i` holds the name of quark `i + 1`; `None` for anonymous quarks.
    names: Vec<Option<&'static str>>,
    lookup: HashMap<&'static str, Quark>,
}

impl Interner {
    fn new() -> Self {
        Self {
            names: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    fn next_quark(&self) -> Quark {
        // ids start at 1
        let id = u32::try_from(self.names.len() + 1)
            .ok()
            .and_then(NonZeroU32::new)
            .expect("quark space exhausted");
        Quark(id)
    }
}

fn interner() -> &'static RwLock<Interner> {
    static INTERNER: OnceLock<RwLock<Interner>> = OnceLock::new();
    INTERNER.get_or_init(|| RwLock::new(Interner::new()))
}

impl Quark {
    /// Intern a string, creating the quark on first use.
    pub fn intern(name: &str) -> Self {
        if let Some(q) = Self::lookup(name) {
            return q;
        }
        let mut interner = interner().write();
        // Another caller may have interned it between the two locks.
        if let Some(&q) = interner.lookup.get(name) {
            return q;
        }
        let q = interner.next_quark();
        let leaked: &'static str = Box::leak(name.to_owned().into_boxed_str());
        interner.names.push(Some(leaked));
        interner.lookup.insert(leaked, q);
        q
    }

    /// Find the quark of an already interned string without creating one.
    pub fn lookup(name: &str) -> Option<Self> {
        interner().read().lookup.get(name).copied()
    }

    /// Allocate a fresh quark with no string.
    ///
    /// Anonymous quarks are raw keys without path semantics: no prefix
    /// matches them except the match-everything `None` prefix.
    pub fn anonymous() -> Self {
        let mut interner = interner().write();
        let q = interner.next_quark();
        interner.names.push(None);
        q
    }

    /// The interned string, `None` for anonymous quarks.
    pub fn as_str(self) -> Option<&'static str> {
        let interner = interner().read();
        interner
            .names
            .get(self.0.get() as usize - 1)
            .copied()
            .flatten()
    }

    /// Numeric id of the quark.
    #[inline]
    pub fn id(self) -> u32 {
        self.0.get()
    }

    /// Whether the quark has a string.
    pub fn is_named(self) -> bool {
        self.as_str().is_some()
    }
}

impl fmt::Debug for Quark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(name) => write!(f, "Quark({}, {:?})", self.id(), name),
            None => write!(f, "Quark({}, <anonymous>)", self.id()),
        }
    }
}

impl fmt::Display for Quark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(name) => f.write_str(name),
            None => write!(f, "#{}", self.id()),
        }
    }
}

impl From<&str> for Quark {
    fn from(name: &str) -> Self {
        Self::intern(name)
    }
}

impl From<&String> for Quark {
    fn from(name: &String) -> Self {
        Self::intern(name)
    }
}

impl From<String> for Quark {
    fn from(name: String) -> Self {
        Self::intern(&name)
    }
}

/// Anything usable as a store key.
///
/// Lookups go through [`AsKey::existing_quark`] so that querying an unknown string
/// does not grow the interner; mutations go through [`AsKey::to_quark`].
pub trait AsKey {
    /// Resolve to an existing quark, if any.
    fn existing_quark(&self) -> Option<Quark>;

    /// Resolve to a quark, interning if needed.
    fn to_quark(&self) -> Quark;

    /// Human-readable key for error messages.
    fn describe(&self) -> String;
}

impl AsKey for Quark {
    #[inline]
    fn existing_quark(&self) -> Option<Quark> {
        Some(*self)
    }

    #[inline]
    fn to_quark(&self) -> Quark {
        *self
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl AsKey for str {
    fn existing_quark(&self) -> Option<Quark> {
        Quark::lookup(self)
    }

    fn to_quark(&self) -> Quark {
        Quark::intern(self)
    }

    fn describe(&self) -> String {
        self.to_owned()
    }
}

impl AsKey for String {
    fn existing_quark(&self) -> Option<Quark> {
        Quark::lookup(self)
    }

    fn to_quark(&self) -> Quark {
        Quark::intern(self)
    }

    fn describe(&self) -> String {
        self.clone()
    }
}

impl<T: AsKey + ?Sized> AsKey for &T {
    #[inline]
    fn existing_quark(&self) -> Option<Quark> {
        (**self).existing_quark()
    }

    #[inline]
    fn to_quark(&self) -> Quark {
        (**self).to_quark()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
