//! RPKI payload elements.
//!
//! This module contains types representing the elements of the data that
//! is being published via RPKI. The complete records built from these
//! elements live in [`rtr::payload`][crate::rtr::payload].

pub mod addr;
pub mod asn;
pub mod bgpsec;
