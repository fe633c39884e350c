//! The validated RPKI payload table.
//!
//! The _Resource Public Key Infrastructure_ (RPKI) is an application of
//! PKI to Internet routing security. A relying party validates all signed
//! objects published in the RPKI and distills them into two kinds of
//! payload: route origins (also known as VRPs) and BGPsec router keys. This
//! payload is then distributed to routers via the RPKI to Router protocol,
//! RTR for short.
//!
//! This crate contains the in-memory dataset that sits between these two
//! steps. A validation run fills a fresh [`Table`] with everything it
//! accepted. The [`compute_deltas`] function then compares that table with
//! the one from the previous run and produces the [`Deltas`]: the payload
//! that needs to be announced and withdrawn so that routers can follow
//! along without receiving the full data set again.
//!
//! The crate neither validates RPKI objects nor speaks the RTR wire
//! protocol. It only stores payload and computes set differences.
//!
//! [`Table`]: rtr/table/struct.Table.html
//! [`compute_deltas`]: rtr/delta/fn.compute_deltas.html
//! [`Deltas`]: rtr/delta/struct.Deltas.html

pub use self::rtr::delta::{compute_deltas, Deltas};
pub use self::rtr::table::Table;

pub mod payload;
pub mod rtr;

mod util;
