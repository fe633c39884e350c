//! A snapshot of validated payload.
//!
//! A [`Table`] holds all route origins and router keys accepted during one
//! validation run. It is created empty, filled by the validator, and then
//! left alone. Once the next run has produced its table, the two can be
//! compared via [`compute_deltas`] and the old one dropped.
//!
//! [`Table`]: struct.Table.html
//! [`compute_deltas`]: ../delta/fn.compute_deltas.html

use std::{error, fmt};
use std::net::{Ipv4Addr, Ipv6Addr};
use log::error;
use crate::payload::addr::{Prefix, PrefixError};
use crate::payload::asn::Asn;
use crate::payload::bgpsec::{KeyIdentifier, RouterKeyInfo};
use super::delta::Deltas;
use super::payload::{Payload, PayloadRef, RouteOrigin, RouterKey};
use super::store::{OriginStore, RouterKeyStore, StoreError};


//------------ Table ---------------------------------------------------------

/// The route origins and router keys of one validation run.
///
/// Each kind of payload is kept in its own deduplicating store. Adding
/// payload that is already present leaves exactly one copy. Tables are
/// independent of each other and never share entries.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Table {
    origins: OriginStore,
    router_keys: RouterKeyStore,
}

impl Table {
    /// Creates a new, empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty table with room for the given number of items.
    pub fn with_capacity(origins: usize, router_keys: usize) -> Self {
        Table {
            origins: OriginStore::with_capacity(origins),
            router_keys: RouterKeyStore::with_capacity(router_keys),
        }
    }

    /// Returns the number of route origins and router keys.
    ///
    /// This can be fed into [`with_capacity`] for the next run.
    ///
    /// [`with_capacity`]: #method.with_capacity
    pub fn capacity_hint(&self) -> (usize, usize) {
        (self.origins.len(), self.router_keys.len())
    }

    /// Creates a table from an iterator over payload.
    pub fn try_from_iter<I: IntoIterator<Item = Payload>>(
        iter: I
    ) -> Result<Self, StoreError> {
        let mut res = Self::new();
        for payload in iter {
            res.add_payload(payload)?;
        }
        Ok(res)
    }

    /// Adds an IPv4 route origin.
    ///
    /// Returns whether an equal route origin was already present.
    pub fn add_roa_v4(
        &mut self, asn: Asn, addr: Ipv4Addr, prefix_len: u8, max_len: u8
    ) -> Result<bool, AddRoaError> {
        let prefix = Prefix::new_v4(addr, prefix_len)?;
        Ok(self.add_origin(RouteOrigin::new(prefix, max_len, asn))?)
    }

    /// Adds an IPv6 route origin.
    ///
    /// Returns whether an equal route origin was already present.
    pub fn add_roa_v6(
        &mut self, asn: Asn, addr: Ipv6Addr, prefix_len: u8, max_len: u8
    ) -> Result<bool, AddRoaError> {
        let prefix = Prefix::new_v6(addr, prefix_len)?;
        Ok(self.add_origin(RouteOrigin::new(prefix, max_len, asn))?)
    }

    /// Adds a route origin.
    ///
    /// Returns whether an equal route origin was already present.
    pub fn add_origin(
        &mut self, origin: RouteOrigin
    ) -> Result<bool, StoreError> {
        self.origins.insert_or_replace(origin).map_err(|err| {
            error!(
                "Route origin {} couldn't be added to table: {}",
                err.value(), err.error()
            );
            err.into_error()
        })
    }

    /// Adds a router key.
    ///
    /// The subject public key info is copied into the table. Returns
    /// whether an equal router key was already present.
    pub fn add_router_key(
        &mut self, key_identifier: KeyIdentifier, asn: Asn, key_info: &[u8]
    ) -> Result<bool, StoreError> {
        let key_info = RouterKeyInfo::try_copy_from_slice(
            key_info
        ).map_err(|err| {
            error!(
                "Key info of router key {} => {} couldn't be copied.",
                key_identifier, asn
            );
            StoreError::allocation(err)
        })?;
        self.add_router_key_value(
            RouterKey::new(key_identifier, asn, key_info)
        )
    }

    /// Adds a router key value.
    ///
    /// Returns whether an equal router key was already present.
    pub fn add_router_key_value(
        &mut self, key: RouterKey
    ) -> Result<bool, StoreError> {
        self.router_keys.insert_or_replace(key).map_err(|err| {
            error!(
                "Router key {} couldn't be added to table: {}",
                err.value(), err.error()
            );
            err.into_error()
        })
    }

    /// Adds a payload item of any kind.
    pub fn add_payload(
        &mut self, payload: Payload
    ) -> Result<bool, StoreError> {
        match payload {
            Payload::Origin(origin) => self.add_origin(origin),
            Payload::RouterKey(key) => self.add_router_key_value(key),
        }
    }

    /// Removes a route origin.
    ///
    /// Returns whether the route origin was present.
    pub fn remove_roa(&mut self, origin: &RouteOrigin) -> bool {
        self.origins.remove(origin)
    }

    /// Removes a router key.
    ///
    /// Returns whether the router key was present.
    pub fn remove_router_key(&mut self, key: &RouterKey) -> bool {
        self.router_keys.remove(key)
    }

    /// Returns whether the table contains the given route origin.
    pub fn contains_roa(&self, origin: &RouteOrigin) -> bool {
        self.origins.contains(origin)
    }

    /// Returns whether the table contains the given router key.
    pub fn contains_router_key(&self, key: &RouterKey) -> bool {
        self.router_keys.contains(key)
    }

    /// Returns the number of route origins.
    pub fn roa_count(&self) -> usize {
        self.origins.len()
    }

    /// Returns the number of router keys.
    pub fn router_key_count(&self) -> usize {
        self.router_keys.len()
    }

    /// Returns whether the table contains no payload at all.
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty() && self.router_keys.is_empty()
    }

    /// Calls `op` for every route origin until it returns an error.
    pub fn for_each_roa<E, F>(&self, op: F) -> Result<(), E>
    where F: FnMut(&RouteOrigin) -> Result<(), E> {
        self.origins.for_each(op)
    }

    /// Calls `op` for every router key until it returns an error.
    pub fn for_each_router_key<E, F>(&self, op: F) -> Result<(), E>
    where F: FnMut(&RouterKey) -> Result<(), E> {
        self.router_keys.for_each(op)
    }

    /// Returns the store of route origins.
    pub fn origins(&self) -> &OriginStore {
        &self.origins
    }

    /// Returns the store of router keys.
    pub fn router_keys(&self) -> &RouterKeyStore {
        &self.router_keys
    }

    /// Returns an iterator over the complete payload of the table.
    ///
    /// All route origins are returned before any router key.
    pub fn full(&self) -> impl Iterator<Item = PayloadRef<'_>> + '_ {
        self.origins.iter().map(PayloadRef::from).chain(
            self.router_keys.iter().map(PayloadRef::from)
        )
    }

    /// Applies deltas to the table.
    ///
    /// Announced payload is added and withdrawn payload is removed. If
    /// adding fails, the table contains all entries applied up to that
    /// point and should be discarded.
    pub fn apply(&mut self, deltas: &Deltas) -> Result<(), StoreError> {
        for (payload, action) in deltas {
            match (payload, action.is_announce()) {
                (Payload::Origin(origin), true) => {
                    self.add_origin(*origin)?;
                }
                (Payload::Origin(origin), false) => {
                    self.remove_roa(origin);
                }
                (Payload::RouterKey(key), true) => {
                    self.add_router_key_value(
                        key.try_clone().map_err(StoreError::allocation)?
                    )?;
                }
                (Payload::RouterKey(key), false) => {
                    self.remove_router_key(key);
                }
            }
        }
        Ok(())
    }
}


//============ Errors ========================================================

//------------ AddRoaError ---------------------------------------------------

/// Adding a route origin from its components has failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AddRoaError {
    /// The prefix components were invalid.
    Prefix(PrefixError),

    /// The store could not take the new entry.
    Store(StoreError),
}

impl From<PrefixError> for AddRoaError {
    fn from(err: PrefixError) -> Self {
        AddRoaError::Prefix(err)
    }
}

impl From<StoreError> for AddRoaError {
    fn from(err: StoreError) -> Self {
        AddRoaError::Store(err)
    }
}

impl fmt::Display for AddRoaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AddRoaError::Prefix(err) => write!(f, "invalid prefix: {}", err),
            AddRoaError::Store(err) => err.fmt(f),
        }
    }
}

impl error::Error for AddRoaError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            AddRoaError::Prefix(err) => Some(err),
            AddRoaError::Store(err) => Some(err),
        }
    }
}


//============ Testing =======================================================
