//! IP address prefixes.

use std::{error, fmt};
use std::net::{AddrParseError, IpAddr, Ipv4Addr, Ipv6Addr};
use std::num::ParseIntError;
use std::str::FromStr;
#[cfg(feature = "serde")] use serde::{
    Deserialize, Deserializer, Serialize, Serializer
};


//------------ Bits ----------------------------------------------------------

/// The value of an IP address.
///
/// This private type holds the content of an IP address. It can be both an
/// IPv4 and IPv6 address. It keeps the address internally as a 128 bit
/// unsigned integer. IPv6 address are kept in all bits host byte order while
/// IPv4 addresses are kept in the upper four bytes and are padded with zero
/// bits. This makes it possible to count prefix lengths the same way for both
/// addresses, i.e., starting from the top of the raw integer.
///
/// There is no way of distinguishing between IPv4 and IPv6 from just a value
/// of this type. This information needs to be carried separatedly.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
struct Bits(u128);

impl Bits {
    fn from_v4(addr: Ipv4Addr) -> Self {
        Bits(u128::from(u32::from(addr)) << 96)
    }

    fn from_v6(addr: Ipv6Addr) -> Self {
        Bits(u128::from(addr))
    }

    /// Converts the value into an IPv4 address.
    ///
    /// The methods disregards the lower twelve bytes of the value.
    fn into_v4(self) -> Ipv4Addr {
        ((self.0 >> 96) as u32).into()
    }

    fn into_v6(self) -> Ipv6Addr {
        self.0.into()
    }

    /// Checks whether the host portion of the bits used in a prefix is zero.
    fn is_host_zero(self, len: u8) -> bool {
        self.0.trailing_zeros() >= 128u32.saturating_sub(len.into())
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Bits")
        .field(&format_args!("{}", self.into_v6()))
        .finish()
    }
}


//------------ AddressFamily -------------------------------------------------

/// The address family of a prefix.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Returns the largest prefix length allowed for the family.
    pub fn max_len(self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => f.write_str("ipv4"),
            AddressFamily::Ipv6 => f.write_str("ipv6"),
        }
    }
}


//------------ Prefix --------------------------------------------------------

/// An IP address prefix: an IP address and a prefix length.
///
/// Two prefixes are equal only if their address family, address bits, and
/// length all are equal.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Prefix {
    /// The actual bits of the prefix.
    bits: Bits,

    /// The address family and prefix length all in one.
    ///
    /// Because the maximum length is 128, we can use the most-significant
    /// bit of a `u8` to determine the address family. If it is set, this
    /// is an IPv6 prefix. If it is not set, this is an IPv4 prefix.
    family_and_len: u8,
}

impl Prefix {
    /// Creates a new prefix from an address and a length.
    ///
    /// The function returns an error if `len` is too large for the address
    /// family of `addr` or if any bits after the prefix length are set.
    pub fn new(addr: IpAddr, len: u8) -> Result<Self, PrefixError> {
        match addr {
            IpAddr::V4(addr) => Self::new_v4(addr, len),
            IpAddr::V6(addr) => Self::new_v6(addr, len),
        }
    }

    /// Creates a new prefix from an IPv4 adddress and a prefix length.
    pub fn new_v4(addr: Ipv4Addr, len: u8) -> Result<Self, PrefixError> {
        if len > 32 {
            return Err(PrefixError::LenOverflow)
        }
        let bits = Bits::from_v4(addr);
        if !bits.is_host_zero(len) {
            return Err(PrefixError::NonZeroHost)
        }
        Ok(Prefix { bits, family_and_len: len })
    }

    /// Creates a new prefix from an IPv6 adddress and a prefix length.
    pub fn new_v6(addr: Ipv6Addr, len: u8) -> Result<Self, PrefixError> {
        if len > 128 {
            return Err(PrefixError::LenOverflow)
        }
        let bits = Bits::from_v6(addr);
        if !bits.is_host_zero(len) {
            return Err(PrefixError::NonZeroHost)
        }
        Ok(Prefix { bits, family_and_len: len | 0x80 })
    }

    /// Returns the address family of the prefix.
    pub fn family(self) -> AddressFamily {
        if self.is_v4() {
            AddressFamily::Ipv4
        }
        else {
            AddressFamily::Ipv6
        }
    }

    /// Returns whether the prefix is for an IPv4 address.
    pub fn is_v4(self) -> bool {
        self.family_and_len & 0x80 == 0
    }

    /// Returns whether the prefix is for an IPv6 address.
    pub fn is_v6(self) -> bool {
        self.family_and_len & 0x80 == 0x80
    }

    /// Returns the IP address part of a prefix.
    pub fn addr(self) -> IpAddr {
        if self.is_v4() {
            self.bits.into_v4().into()
        }
        else {
            self.bits.into_v6().into()
        }
    }

    /// Returns the length part of a prefix.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(self) -> u8 {
        self.family_and_len & 0x7F
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Prefix {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = Prefix;

            fn expecting(
                &self, formatter: &mut fmt::Formatter
            ) -> fmt::Result {
                write!(formatter, "a string with a IPv4 or IPv6 prefix")
            }

            fn visit_str<E: serde::de::Error>(
                self, v: &str
            ) -> Result<Self::Value, E> {
                Prefix::from_str(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Prefix {
    fn serialize<S: Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}


//--- FromStr and Display

impl FromStr for Prefix {
    type Err = ParsePrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParsePrefixError::Empty)
        }
        let slash = s.find('/').ok_or(ParsePrefixError::MissingLen)?;
        let addr = IpAddr::from_str(&s[..slash]).map_err(
            ParsePrefixError::InvalidAddr
        )?;
        let len = u8::from_str(&s[slash + 1..]).map_err(
            ParsePrefixError::InvalidLen
        )?;
        Prefix::new(addr, len).map_err(ParsePrefixError::InvalidPrefix)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr(), self.len())
    }
}


//============ Errors ========================================================

//------------ PrefixError ---------------------------------------------------

/// Creating a prefix has failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PrefixError {
    /// The prefix length is longer than allowed for the address family.
    LenOverflow,

    /// The host portion of the address has non-zero bits set.
    NonZeroHost,
}

impl PrefixError {
    /// Returns a static error message.
    pub fn static_description(self) -> &'static str {
        match self {
            PrefixError::LenOverflow => "prefix length too large",
            PrefixError::NonZeroHost => "non-zero host portion",
        }
    }
}

impl From<PrefixError> for &'static str {
    fn from(err: PrefixError) -> Self {
        err.static_description()
    }
}

impl fmt::Display for PrefixError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.static_description())
    }
}

impl error::Error for PrefixError { }


//------------ ParsePrefixError ----------------------------------------------

/// Creating an IP address prefix from a string has failed.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum ParsePrefixError {
    /// The value parsed was empty.
    Empty,

    /// The length portion after a slash was missing.
    MissingLen,

    /// The address portion is invalid.
    InvalidAddr(AddrParseError),

    /// The length portion is invalid.
    InvalidLen(ParseIntError),

    /// The combined prefix is invalid.
    InvalidPrefix(PrefixError),
}

impl fmt::Display for ParsePrefixError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParsePrefixError::Empty => f.write_str("empty string"),
            ParsePrefixError::MissingLen => {
                f.write_str("missing length portion")
            }
            ParsePrefixError::InvalidAddr(err) => {
                write!(f, "invalid address: {}", err)
            }
            ParsePrefixError::InvalidLen(err) => {
                write!(f, "invalid length: {}", err)
            }
            ParsePrefixError::InvalidPrefix(err) => err.fmt(f),
        }
    }
}

impl error::Error for ParsePrefixError { }


//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn prefix_new() {
        let p = Prefix::new_v4(Ipv4Addr::new(10, 0, 0, 0), 24).unwrap();
        assert!(p.is_v4());
        assert_eq!(p.family(), AddressFamily::Ipv4);
        assert_eq!(p.len(), 24);
        assert_eq!(p.addr(), IpAddr::from([10, 0, 0, 0]));

        let p = Prefix::new_v6("2001:db8::".parse().unwrap(), 32).unwrap();
        assert!(p.is_v6());
        assert_eq!(p.family(), AddressFamily::Ipv6);
        assert_eq!(p.len(), 32);

        assert_eq!(
            Prefix::new_v4(Ipv4Addr::new(10, 0, 0, 0), 33),
            Err(PrefixError::LenOverflow)
        );
        assert_eq!(
            Prefix::new_v4(Ipv4Addr::new(10, 0, 0, 1), 24),
            Err(PrefixError::NonZeroHost)
        );
        assert_eq!(
            Prefix::new_v6("2001:db8::".parse().unwrap(), 129),
            Err(PrefixError::LenOverflow)
        );
        assert!(Prefix::new_v4(Ipv4Addr::new(0, 0, 0, 0), 0).is_ok());
        assert!(Prefix::new_v4(Ipv4Addr::new(192, 0, 2, 1), 32).is_ok());
    }

    #[test]
    fn family_is_part_of_identity() {
        // ::/0 and 0.0.0.0/0 have identical bits.
        let v4 = Prefix::new_v4(Ipv4Addr::UNSPECIFIED, 0).unwrap();
        let v6 = Prefix::new_v6(Ipv6Addr::UNSPECIFIED, 0).unwrap();
        assert_ne!(v4, v6);
    }

    #[test]
    fn prefix_from_str() {
        assert_eq!(
            Prefix::from_str("192.0.2.0/24").unwrap(),
            Prefix::new_v4(Ipv4Addr::new(192, 0, 2, 0), 24).unwrap()
        );
        assert_eq!(
            Prefix::from_str("2001:db8::/48").unwrap().to_string(),
            "2001:db8::/48"
        );
        assert!(matches!(
            Prefix::from_str(""), Err(ParsePrefixError::Empty)
        ));
        assert!(matches!(
            Prefix::from_str("192.0.2.0"), Err(ParsePrefixError::MissingLen)
        ));
        assert!(matches!(
            Prefix::from_str("192.0.2/24"),
            Err(ParsePrefixError::InvalidAddr(_))
        ));
        assert!(matches!(
            Prefix::from_str("192.0.2.0/x"),
            Err(ParsePrefixError::InvalidLen(_))
        ));
        assert!(matches!(
            Prefix::from_str("192.0.2.1/24"),
            Err(ParsePrefixError::InvalidPrefix(PrefixError::NonZeroHost))
        ));
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_prefix() {
        let p = Prefix::from_str("10.0.0.0/8").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"10.0.0.0/8\"");
        assert_eq!(serde_json::from_str::<Prefix>(&json).unwrap(), p);
    }
}
