//! Differences between two tables.
//!
//! The function [`compute_deltas`] compares the table of a previous
//! validation run with the table of the current run and produces
//! [`Deltas`]: the list of payload to announce and withdraw in order to
//! get from the old to the new data set. Payload present in both tables
//! does not appear in the deltas at all.
//!
//! The deltas are collected in four passes, always in this order:
//!
//! 1. route origins present in the new table but not in the old one are
//!    announced,
//! 2. route origins present in the old table but not in the new one are
//!    withdrawn,
//! 3. router keys present in the new table but not in the old one are
//!    announced, and
//! 4. router keys present in the old table but not in the new one are
//!    withdrawn.
//!
//! The order of entries within each pass follows the iteration order of
//! the table and carries no meaning.
//!
//! The engine can collect into any type implementing [`DeltaSink`] via
//! [`compute_deltas_into`]. If adding an entry fails, computation stops
//! right away and the partially filled sink is dropped. Nothing is returned
//! but the error.
//!
//! [`compute_deltas`]: fn.compute_deltas.html
//! [`compute_deltas_into`]: fn.compute_deltas_into.html
//! [`Deltas`]: struct.Deltas.html
//! [`DeltaSink`]: trait.DeltaSink.html

use std::{error, fmt, slice};
use std::collections::TryReserveError;
use std::sync::Arc;
use log::{debug, error};
use super::payload::{Action, Payload, RouteOrigin, RouterKey};
use super::store::PayloadStore;
use super::table::Table;


//------------ DeltaSink -----------------------------------------------------

/// A type collecting the entries of a delta.
///
/// A sink is created empty by [`create`] and is then handed entries by the
/// engine one by one, in the order they should be applied. The engine only
/// borrows payload from the tables it compares, so a sink needs to copy
/// whatever it wants to keep.
///
/// If any method returns an error, the engine drops the sink. Releasing
/// whatever it holds is therefore a matter of its `Drop` implementation.
///
/// [`create`]: #tymethod.create
pub trait DeltaSink: Sized {
    /// The error returned when creating or appending fails.
    type Error;

    /// Creates a new, empty sink.
    fn create() -> Result<Self, Self::Error>;

    /// Appends a route origin with the given action.
    fn append_origin(
        &mut self, origin: &RouteOrigin, action: Action
    ) -> Result<(), Self::Error>;

    /// Appends a router key with the given action.
    fn append_router_key(
        &mut self, key: &RouterKey, action: Action
    ) -> Result<(), Self::Error>;
}


//------------ compute_deltas ------------------------------------------------

/// Computes the deltas to get from the `old` table to the `new` table.
///
/// Neither table is modified. If the deltas cannot be collected because
/// memory runs out, an error is returned and nothing collected so far is
/// retained.
pub fn compute_deltas(
    old: &Table, new: &Table
) -> Result<Deltas, DeltaError> {
    let deltas = match compute_deltas_into::<DeltaBuilder>(old, new) {
        Ok(builder) => builder.freeze(),
        Err(err) => {
            error!("Failed to compute deltas: {}", err);
            return Err(err)
        }
    };
    debug!(
        "Computed deltas: {} route origins announced, {} withdrawn; \
         {} router keys announced, {} withdrawn.",
        deltas.origins().filter(|item| item.1.is_announce()).count(),
        deltas.origins().filter(|item| item.1.is_withdraw()).count(),
        deltas.router_keys().filter(|item| item.1.is_announce()).count(),
        deltas.router_keys().filter(|item| item.1.is_withdraw()).count(),
    );
    Ok(deltas)
}

/// Computes the deltas between two tables into a sink of type `S`.
///
/// This creates a new sink and runs the four passes described in the
/// [module documentation][self] over it. The first error returned by the
/// sink is returned and the sink dropped.
pub fn compute_deltas_into<S: DeltaSink>(
    old: &Table, new: &Table
) -> Result<S, S::Error> {
    let mut sink = S::create()?;
    fill_sink(old, new, &mut sink)?;
    Ok(sink)
}

fn fill_sink<S: DeltaSink>(
    old: &Table, new: &Table, sink: &mut S
) -> Result<(), S::Error> {
    add_missing(new.origins(), old.origins(), |origin| {
        sink.append_origin(origin, Action::Announce)
    })?;
    add_missing(old.origins(), new.origins(), |origin| {
        sink.append_origin(origin, Action::Withdraw)
    })?;
    add_missing(new.router_keys(), old.router_keys(), |key| {
        sink.append_router_key(key, Action::Announce)
    })?;
    add_missing(old.router_keys(), new.router_keys(), |key| {
        sink.append_router_key(key, Action::Withdraw)
    })
}

/// Calls `op` for every entry in `left` that is not in `right`.
fn add_missing<T, E, F>(
    left: &PayloadStore<T>, right: &PayloadStore<T>, mut op: F
) -> Result<(), E>
where
    T: std::hash::Hash + Eq,
    F: FnMut(&T) -> Result<(), E>,
{
    left.for_each(|item| {
        if right.contains(item) {
            Ok(())
        }
        else {
            op(item)
        }
    })
}


//------------ DeltaBuilder --------------------------------------------------

/// The crate’s own delta sink.
///
/// Collects all entries into a vector. Once complete, the builder can be
/// converted into shareable [`Deltas`] through [`freeze`].
///
/// [`Deltas`]: struct.Deltas.html
/// [`freeze`]: #method.freeze
#[derive(Clone, Debug, Default)]
pub struct DeltaBuilder {
    items: Vec<(Payload, Action)>,
    announced: usize,
}

impl DeltaBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a payload item.
    ///
    /// Memory for the item is reserved before it is stored, so the builder
    /// is unchanged if this fails.
    pub fn push(
        &mut self, payload: impl Into<Payload>, action: Action
    ) -> Result<(), DeltaError> {
        self.items.try_reserve(1)?;
        self.items.push((payload.into(), action));
        if action.is_announce() {
            self.announced += 1;
        }
        Ok(())
    }

    /// Returns the number of entries collected so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether no entries have been collected yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Converts the builder into shareable deltas.
    pub fn freeze(self) -> Deltas {
        Deltas {
            inner: Arc::new(DeltaData {
                withdrawn: self.items.len() - self.announced,
                announced: self.announced,
                items: self.items,
            })
        }
    }
}

impl DeltaSink for DeltaBuilder {
    type Error = DeltaError;

    fn create() -> Result<Self, Self::Error> {
        Ok(Self::new())
    }

    fn append_origin(
        &mut self, origin: &RouteOrigin, action: Action
    ) -> Result<(), Self::Error> {
        self.push(*origin, action)
    }

    fn append_router_key(
        &mut self, key: &RouterKey, action: Action
    ) -> Result<(), Self::Error> {
        // Reserve first so we don’t copy the key for nothing.
        self.items.try_reserve(1)?;
        self.push(key.try_clone()?, action)
    }
}


//------------ Deltas --------------------------------------------------------

/// The differences between two tables.
///
/// This is a cheaply clonable, shared handle. All clones refer to the same
/// data which is released once the last clone is dropped. This allows an
/// RTR server to keep deltas around for as long as clients may ask for
/// them independently of the table they were computed from.
#[derive(Clone, Debug)]
pub struct Deltas {
    inner: Arc<DeltaData>,
}

#[derive(Debug)]
struct DeltaData {
    items: Vec<(Payload, Action)>,
    announced: usize,
    withdrawn: usize,
}

impl Deltas {
    /// Creates empty deltas.
    pub fn empty() -> Self {
        DeltaBuilder::new().freeze()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.inner.items.len()
    }

    /// Returns whether there are no entries at all.
    pub fn is_empty(&self) -> bool {
        self.inner.items.is_empty()
    }

    /// Returns the number of announced entries.
    pub fn announce_count(&self) -> usize {
        self.inner.announced
    }

    /// Returns the number of withdrawn entries.
    pub fn withdraw_count(&self) -> usize {
        self.inner.withdrawn
    }

    /// Returns the number of handles currently referring to these deltas.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Returns an iterator over all entries in order.
    pub fn iter(&self) -> DeltasIter<'_> {
        DeltasIter { iter: self.inner.items.iter() }
    }

    /// Returns an iterator over the route origin entries.
    pub fn origins(
        &self
    ) -> impl Iterator<Item = (RouteOrigin, Action)> + '_ {
        self.iter().filter_map(|(payload, action)| {
            payload.to_origin().map(|origin| (origin, action))
        })
    }

    /// Returns an iterator over the router key entries.
    pub fn router_keys(
        &self
    ) -> impl Iterator<Item = (&RouterKey, Action)> + '_ {
        self.iter().filter_map(|(payload, action)| {
            payload.as_router_key().map(|key| (key, action))
        })
    }
}


//--- IntoIterator

impl<'a> IntoIterator for &'a Deltas {
    type Item = (&'a Payload, Action);
    type IntoIter = DeltasIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


//------------ DeltasIter ----------------------------------------------------

/// An iterator over the entries of [`Deltas`].
///
/// [`Deltas`]: struct.Deltas.html
#[derive(Clone, Debug)]
pub struct DeltasIter<'a> {
    iter: slice::Iter<'a, (Payload, Action)>,
}

impl<'a> Iterator for DeltasIter<'a> {
    type Item = (&'a Payload, Action);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(payload, action)| (payload, *action))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a> ExactSizeIterator for DeltasIter<'a> { }


//============ Errors ========================================================

//------------ DeltaError ----------------------------------------------------

/// Collecting deltas has failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeltaError {
    source: TryReserveError,
}

impl DeltaError {
    /// Returns the system error code for the error.
    ///
    /// This is the Linux value of `ENOMEM`.
    pub fn code(&self) -> i32 {
        12
    }
}

impl From<TryReserveError> for DeltaError {
    fn from(source: TryReserveError) -> Self {
        DeltaError { source }
    }
}

impl fmt::Display for DeltaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "out of memory (error code {})", self.code())
    }
}

impl error::Error for DeltaError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.source)
    }
}


//============ Testing =======================================================
