//! The payload kept in a table and transmitted via RTR.
//!
//! The types in here implement all the traits to use them as keys in
//! collections to be able to perform difference processing. Equality,
//! ordering, and hashing always consider every field of a value. Two values
//! that differ only in, say, their max-length are different payload.

use std::fmt;
use std::collections::TryReserveError;
use crate::payload::addr::{AddressFamily, Prefix};
use crate::payload::asn::Asn;
use crate::payload::bgpsec::{KeyIdentifier, RouterKeyInfo};


//------------ RouteOrigin ---------------------------------------------------

/// A route origin authorization, also known as validated ROA payload.
///
/// Values of this type authorize the autonomous system given in the `asn`
/// field to originate routes for the IP address prefix given in the `prefix`
/// field as well as for all its more specific prefixes up to a length of
/// `max_len`.
///
/// The type includes authorizations for both IPv4 and IPv6 prefixes which
/// are separate payload types in RTR. The address family is part of the
/// prefix.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RouteOrigin {
    /// The address prefix to authorize.
    pub prefix: Prefix,

    /// The maximum authorized prefix length.
    ///
    /// This should not be smaller than the prefix length, but that isn’t
    /// enforced here.
    pub max_len: u8,

    /// The autonomous system allowed to announce the prefixes.
    pub asn: Asn,
}

impl RouteOrigin {
    /// Creates a new value from a prefix, a max-length, and an ASN.
    pub fn new(prefix: Prefix, max_len: u8, asn: Asn) -> Self {
        RouteOrigin { prefix, max_len, asn }
    }

    /// Returns the address family of the origin.
    pub fn family(self) -> AddressFamily {
        self.prefix.family()
    }

    /// Returns whether this is an IPv4 origin.
    pub fn is_v4(self) -> bool {
        self.prefix.is_v4()
    }
}

impl fmt::Display for RouteOrigin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{} => {}", self.prefix, self.max_len, self.asn)
    }
}


//------------ RouterKey -----------------------------------------------------

/// A BGPsec router key.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RouterKey {
    /// The subject key identifier of the router key.
    pub key_identifier: KeyIdentifier,

    /// The autonomous system authorized to use the key.
    pub asn: Asn,

    /// The actual key.
    pub key_info: RouterKeyInfo,
}

impl RouterKey {
    /// Creates a new value from the various components.
    pub fn new(
        key_identifier: KeyIdentifier, asn: Asn, key_info: RouterKeyInfo
    ) -> Self {
        RouterKey { key_identifier, asn, key_info }
    }

    /// Clones the router key if memory permits.
    pub fn try_clone(&self) -> Result<Self, TryReserveError> {
        Ok(RouterKey {
            key_identifier: self.key_identifier,
            asn: self.asn,
            key_info: self.key_info.try_clone()?,
        })
    }
}

impl fmt::Display for RouterKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} => {}", self.key_identifier, self.asn)
    }
}


//------------ PayloadType ---------------------------------------------------

/// The type of a payload item.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PayloadType {
    Origin,
    RouterKey,
}


//------------ Payload -------------------------------------------------------

/// All payload types kept in a table.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Payload {
    /// A route origin authorisation.
    Origin(RouteOrigin),

    /// A BGPsec router key.
    RouterKey(RouterKey),
}

impl Payload {
    /// Creates a new prefix origin payload.
    pub fn origin(prefix: Prefix, max_len: u8, asn: Asn) -> Self {
        Payload::Origin(RouteOrigin::new(prefix, max_len, asn))
    }

    /// Creates a new router key payload.
    pub fn router_key(
        key_identifier: KeyIdentifier, asn: Asn, key_info: RouterKeyInfo
    ) -> Self {
        Payload::RouterKey(RouterKey::new(key_identifier, asn, key_info))
    }

    /// Converts a reference to payload into a payload reference.
    pub fn as_ref(&self) -> PayloadRef<'_> {
        match self {
            Payload::Origin(origin) => PayloadRef::Origin(*origin),
            Payload::RouterKey(key) => PayloadRef::RouterKey(key),
        }
    }

    /// Returns the payload type of the value.
    pub fn payload_type(&self) -> PayloadType {
        match self {
            Payload::Origin(_) => PayloadType::Origin,
            Payload::RouterKey(_) => PayloadType::RouterKey,
        }
    }

    /// Returns the origin prefix if the value is of the origin variant.
    pub fn to_origin(&self) -> Option<RouteOrigin> {
        match *self {
            Payload::Origin(origin) => Some(origin),
            _ => None
        }
    }

    /// Returns the router key if the value is of the router key variant.
    pub fn as_router_key(&self) -> Option<&RouterKey> {
        match *self {
            Payload::RouterKey(ref key) => Some(key),
            _ => None
        }
    }
}


//--- From

impl From<RouteOrigin> for Payload {
    fn from(src: RouteOrigin) -> Self {
        Payload::Origin(src)
    }
}

impl From<RouterKey> for Payload {
    fn from(src: RouterKey) -> Self {
        Payload::RouterKey(src)
    }
}


//--- Display

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Payload::Origin(origin) => origin.fmt(f),
            Payload::RouterKey(key) => key.fmt(f),
        }
    }
}


//------------ PayloadRef ----------------------------------------------------

/// All payload types but as references.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PayloadRef<'a> {
    /// A route origin authorisation.
    ///
    /// This isn’t a reference because it is `Copy`.
    Origin(RouteOrigin),

    /// A BGPsec router key.
    RouterKey(&'a RouterKey),
}

impl<'a> PayloadRef<'a> {
    /// Converts the reference into an owned payload value.
    pub fn to_payload(self) -> Payload {
        match self {
            PayloadRef::Origin(origin) => Payload::Origin(origin),
            PayloadRef::RouterKey(key) => Payload::RouterKey(key.clone()),
        }
    }
}


//--- From

impl<'a> From<RouteOrigin> for PayloadRef<'a> {
    fn from(src: RouteOrigin) -> Self {
        PayloadRef::Origin(src)
    }
}

impl<'a> From<&'a RouteOrigin> for PayloadRef<'a> {
    fn from(src: &'a RouteOrigin) -> Self {
        PayloadRef::Origin(*src)
    }
}

impl<'a> From<&'a RouterKey> for PayloadRef<'a> {
    fn from(src: &'a RouterKey) -> Self {
        PayloadRef::RouterKey(src)
    }
}


//------------ Action --------------------------------------------------------

/// What to do with a given payload.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Action {
    /// Announce the payload.
    ///
    /// In other words, add the payload to your set of VRPs.
    Announce,

    /// Withdraw the payload.
    ///
    /// In other words, remove the payload from your set of VRPs.
    Withdraw,
}

impl Action {
    /// Returns whether the action is to announce.
    pub fn is_announce(self) -> bool {
        matches!(self, Action::Announce)
    }

    /// Returns whether the action is to withdraw.
    pub fn is_withdraw(self) -> bool {
        matches!(self, Action::Withdraw)
    }

    /// Returns the opposite action.
    pub fn invert(self) -> Self {
        match self {
            Action::Announce => Action::Withdraw,
            Action::Withdraw => Action::Announce,
        }
    }

    /// Creates the action from the flags field of an RTR PDU.
    pub fn from_flags(flags: u8) -> Self {
        if flags & 1 == 1 {
            Action::Announce
        }
        else {
            Action::Withdraw
        }
    }

    /// Converts the action into the flags field of an RTR PDU.
    pub fn into_flags(self) -> u8 {
        match self {
            Action::Announce => 1,
            Action::Withdraw => 0
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Action::Announce => f.write_str("announce"),
            Action::Withdraw => f.write_str("withdraw"),
        }
    }
}


//============ Testing =======================================================
