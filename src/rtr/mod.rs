//! The RTR payload table and its deltas.
//!
//! RPKI, the Resource Public Key Infrastructure, is a distributed database of
//! signed statements by entities that participate in Internet routing. A
//! typical setup first collects and validates all statements into something
//! called a _local cache_ and distributes validated and normalized
//! information from the cache to the actual routers via the RPKI to Router
//! Protocol or RTR for short.
//!
//! This module contains the local cache’s view of that information. Each
//! validation run produces a [`Table`] of route origins and router keys.
//! Because RTR allows routers to only fetch what has changed since their
//! last update, two successive tables can be compared via
//! [`compute_deltas`], which produces the announcements and withdrawals
//! necessary to get from the old table to the new one.
//!
//! The module does not implement the RTR protocol itself. You can read more
//! about RPKI in [RFC 6480]. RTR is currently specified in [RFC 8210].
//!
//! [`Table`]: table/struct.Table.html
//! [`compute_deltas`]: delta/fn.compute_deltas.html
//! [RFC 6480]: https://tools.ietf.org/html/rfc6480
//! [RFC 8210]: https://tools.ietf.org/html/rfc8210

pub use self::delta::{
    compute_deltas, compute_deltas_into, DeltaBuilder, DeltaError, DeltaSink,
    Deltas,
};
pub use self::payload::{
    Action, Payload, PayloadRef, PayloadType, RouteOrigin, RouterKey
};
pub use self::store::{
    InsertError, OriginStore, PayloadStore, RouterKeyStore, StoreError,
    StoreErrorKind,
};
pub use self::table::{AddRoaError, Table};

pub mod delta;
pub mod payload;
pub mod store;
pub mod table;
