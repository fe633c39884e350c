//! Deduplicating payload stores.
//!
//! A [`PayloadStore`] is a set of payload values of one type. Values are
//! identified by their complete content: two values are the same entry only
//! if all their fields are equal. A store never contains two entries that
//! compare equal.
//!
//! Inserting is the only operation that can fail and it only fails if
//! memory for the new entry cannot be reserved. In this case, the store is
//! left unchanged and the rejected value is handed back to the caller as
//! part of the [`InsertError`].
//!
//! [`PayloadStore`]: struct.PayloadStore.html
//! [`InsertError`]: struct.InsertError.html

use std::{error, fmt, hash, mem};
use std::collections::{hash_set, HashSet, TryReserveError};
use super::payload::{RouteOrigin, RouterKey};


//------------ PayloadStore --------------------------------------------------

/// A deduplicating set of payload values.
///
/// Iteration happens in an unspecified order that can change whenever the
/// store is modified.
#[derive(Clone)]
pub struct PayloadStore<T> {
    items: HashSet<T>,
}

/// The store for route origins.
pub type OriginStore = PayloadStore<RouteOrigin>;

/// The store for router keys.
pub type RouterKeyStore = PayloadStore<RouterKey>;

impl<T> PayloadStore<T> {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        PayloadStore { items: HashSet::new() }
    }

    /// Creates a new, empty store with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        PayloadStore { items: HashSet::with_capacity(capacity) }
    }

    /// Returns the number of entries in the store.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns an iterator over all entries.
    pub fn iter(&self) -> hash_set::Iter<'_, T> {
        self.items.iter()
    }

    /// Calls `op` for every entry in the store.
    ///
    /// Stops at the first error returned by `op` and returns it.
    pub fn for_each<E, F>(&self, mut op: F) -> Result<(), E>
    where F: FnMut(&T) -> Result<(), E> {
        for item in &self.items {
            op(item)?
        }
        Ok(())
    }

    /// Removes all entries from the store.
    pub fn clear(&mut self) {
        self.items.clear()
    }
}

impl<T: hash::Hash + Eq> PayloadStore<T> {
    /// Inserts a value into the store.
    ///
    /// If an equal value was already present, it is replaced by `value` and
    /// the method returns `Ok(true)`. Otherwise `value` is added and the
    /// method returns `Ok(false)`.
    pub fn insert_or_replace(
        &mut self, value: T
    ) -> Result<bool, InsertError<T>> {
        if let Err(err) = self.reserve_one() {
            return Err(InsertError { error: err, value })
        }
        Ok(self.items.replace(value).is_some())
    }

    /// Removes the entry equal to `value`.
    ///
    /// Returns whether there was such an entry. Removing a value that isn’t
    /// present is fine and leaves the store unchanged.
    pub fn remove(&mut self, value: &T) -> bool {
        self.items.remove(value)
    }

    /// Returns whether the store contains an entry equal to `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.items.contains(value)
    }

    /// Makes sure there is room for one more entry.
    fn reserve_one(&mut self) -> Result<(), StoreError> {
        let len = self.items.len();
        self.items.try_reserve(1).map_err(|err| {
            StoreError::reserve(err, len, mem::size_of::<T>())
        })
    }
}


//--- Default

impl<T> Default for PayloadStore<T> {
    fn default() -> Self {
        Self::new()
    }
}


//--- PartialEq and Eq

impl<T: hash::Hash + Eq> PartialEq for PayloadStore<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: hash::Hash + Eq> Eq for PayloadStore<T> { }


//--- IntoIterator

impl<'a, T> IntoIterator for &'a PayloadStore<T> {
    type Item = &'a T;
    type IntoIter = hash_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}


//--- Debug

impl<T: fmt::Debug> fmt::Debug for PayloadStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.items.iter()).finish()
    }
}


//============ Errors ========================================================

//------------ StoreErrorKind ------------------------------------------------

/// The kind of failure that happened when adding to a store.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreErrorKind {
    /// Memory for a new entry could not be allocated.
    Allocation,

    /// The index could not accomodate another entry.
    Index,
}

impl StoreErrorKind {
    /// Returns the system error code for this kind.
    ///
    /// These are the Linux values of `ENOMEM` and `EOVERFLOW`.
    pub fn code(self) -> i32 {
        match self {
            StoreErrorKind::Allocation => 12,
            StoreErrorKind::Index => 75,
        }
    }
}


//------------ StoreError ----------------------------------------------------

/// Adding an entry to a store has failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoreError {
    kind: StoreErrorKind,
    source: Option<TryReserveError>,
}

impl StoreError {
    pub(crate) fn allocation(err: TryReserveError) -> Self {
        StoreError {
            kind: StoreErrorKind::Allocation,
            source: Some(err),
        }
    }

    /// Classifies a failed reservation in a store of `len` entries.
    ///
    /// Close to the largest size the index can describe, the failure is
    /// the index running out of room rather than the allocator running out
    /// of memory.
    pub(crate) fn reserve(
        err: TryReserveError, len: usize, entry_size: usize
    ) -> Self {
        if len >= Self::max_entries(entry_size) {
            StoreError { kind: StoreErrorKind::Index, source: Some(err) }
        }
        else {
            Self::allocation(err)
        }
    }

    /// Returns roughly the largest number of entries an index can hold.
    ///
    /// Each bucket takes the entry size plus a control byte and the bucket
    /// count is rounded up to a power of two with an eighth kept free. The
    /// total has to stay below `isize::MAX` bytes.
    fn max_entries(entry_size: usize) -> usize {
        (isize::MAX as usize) / (entry_size + 1) / 2 / 8 * 7
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    /// Returns the system error code for the error.
    pub fn code(&self) -> i32 {
        self.kind.code()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            StoreErrorKind::Allocation => {
                write!(f, "out of memory (error code {})", self.code())
            }
            StoreErrorKind::Index => {
                write!(f, "index overflow (error code {})", self.code())
            }
        }
    }
}

impl error::Error for StoreError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source.as_ref().map(|err| err as _)
    }
}


//------------ InsertError ---------------------------------------------------

/// Inserting a value into a store has failed.
///
/// The error contains the value that was rejected so the caller gets its
/// ownership back.
#[derive(Clone, Debug)]
pub struct InsertError<T> {
    error: StoreError,
    value: T,
}

impl<T> InsertError<T> {
    /// Returns a reference to the underlying store error.
    pub fn error(&self) -> &StoreError {
        &self.error
    }

    /// Returns a reference to the rejected value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the rejected value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Converts the error into the store error, dropping the value.
    pub fn into_error(self) -> StoreError {
        self.error
    }
}

impl<T> From<InsertError<T>> for StoreError {
    fn from(err: InsertError<T>) -> Self {
        err.error
    }
}

impl<T> fmt::Display for InsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl<T: fmt::Debug> error::Error for InsertError<T> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.error)
    }
}


//============ Testing =======================================================
