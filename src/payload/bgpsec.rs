//! Payload types related to BGPsec.

use std::{error, fmt};
use std::collections::TryReserveError;
use std::convert::{TryFrom, TryInto};
use std::str::FromStr;
use bytes::Bytes;
use crate::util::hex;


//------------ KeyIdentifier -------------------------------------------------

/// A key identifier.
///
/// This is the SHA-1 hash over the public key’s bits.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct KeyIdentifier([u8; 20]);

impl KeyIdentifier {
    /// Returns an octet slice of the key identifer’s value.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns a octet array with the hex representation of the identifier.
    pub fn into_hex(self) -> [u8; 40] {
        let mut res = [0u8; 40];
        hex::encode(self.as_slice(), &mut res);
        res
    }
}


//--- From, TryFrom and FromStr

impl From<[u8; 20]> for KeyIdentifier {
    fn from(src: [u8; 20]) -> Self {
        KeyIdentifier(src)
    }
}

impl From<KeyIdentifier> for [u8; 20] {
    fn from(src: KeyIdentifier) -> Self {
        src.0
    }
}

impl<'a> TryFrom<&'a [u8]> for KeyIdentifier {
    type Error = KeyIdentifierSliceError;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        value.try_into()
            .map(KeyIdentifier)
            .map_err(|_| KeyIdentifierSliceError)
    }
}

impl FromStr for KeyIdentifier {
    type Err = ParseKeyIdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut res = KeyIdentifier(Default::default());
        hex::decode(value, &mut res.0).ok_or(ParseKeyIdentifierError)?;
        Ok(res)
    }
}


//--- AsRef

impl AsRef<[u8]> for KeyIdentifier {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//--- Display and Debug

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut buf = [0u8; 40];
        f.write_str(hex::encode(self.as_slice(), &mut buf))
    }
}

impl fmt::Debug for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyIdentifier({})", self)
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for KeyIdentifier {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S
    ) -> Result<S::Ok, S::Error> {
        let mut buf = [0u8; 40];
        serializer.serialize_str(hex::encode(self.as_slice(), &mut buf))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for KeyIdentifier {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        struct KeyIdentifierVisitor;

        impl<'de> serde::de::Visitor<'de> for KeyIdentifierVisitor {
            type Value = KeyIdentifier;

            fn expecting(
                &self, formatter: &mut fmt::Formatter
            ) -> fmt::Result {
                write!(formatter,
                    "a string containing a key identifier as hex digits"
                )
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where E: serde::de::Error {
                KeyIdentifier::from_str(s).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(KeyIdentifierVisitor)
    }
}


//------------ RouterKeyInfo -------------------------------------------------

/// The subject public key info of a router key.
///
/// This is the DER encoded public key of a BGPsec router. The octets are
/// kept as they are. Equality and ordering are by octet content.
///
/// The octets live in a vector owned by the value. Use
/// [`try_copy_from_slice`] and [`try_clone`] where running out of memory
/// has to be reported rather than abort the process.
///
/// [`try_copy_from_slice`]: #method.try_copy_from_slice
/// [`try_clone`]: #method.try_clone
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RouterKeyInfo(Vec<u8>);

impl RouterKeyInfo {
    /// Creates a value by copying the given octets.
    pub fn copy_from_slice(src: &[u8]) -> Self {
        RouterKeyInfo(src.to_vec())
    }

    /// Creates a value by copying the given octets if memory permits.
    pub fn try_copy_from_slice(
        src: &[u8]
    ) -> Result<Self, TryReserveError> {
        let mut res = Vec::new();
        res.try_reserve_exact(src.len())?;
        res.extend_from_slice(src);
        Ok(RouterKeyInfo(res))
    }

    /// Clones the value if memory permits.
    pub fn try_clone(&self) -> Result<Self, TryReserveError> {
        Self::try_copy_from_slice(&self.0)
    }

    /// Returns the length of the encoded key info.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the key info is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an octet slice of the encoded key info.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Converts the value into bytes.
    pub fn into_bytes(self) -> Bytes {
        self.0.into()
    }
}


//--- From

impl From<Bytes> for RouterKeyInfo {
    fn from(src: Bytes) -> Self {
        RouterKeyInfo(src.to_vec())
    }
}

impl From<Vec<u8>> for RouterKeyInfo {
    fn from(src: Vec<u8>) -> Self {
        RouterKeyInfo(src)
    }
}

impl<'a> From<&'a [u8]> for RouterKeyInfo {
    fn from(src: &'a [u8]) -> Self {
        Self::copy_from_slice(src)
    }
}


//--- AsRef

impl AsRef<[u8]> for RouterKeyInfo {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//--- Deserialize and Serialize
//
// The key info is serialized as a hex string, same as the key identifier.

#[cfg(feature = "serde")]
impl serde::Serialize for RouterKeyInfo {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S
    ) -> Result<S::Ok, S::Error> {
        let mut buf = vec![0u8; self.len() * 2];
        serializer.serialize_str(hex::encode(self.as_ref(), &mut buf))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RouterKeyInfo {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = RouterKeyInfo;

            fn expecting(
                &self, formatter: &mut fmt::Formatter
            ) -> fmt::Result {
                write!(formatter, "a string containing hex digits")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where E: serde::de::Error {
                let mut res = vec![0u8; s.len() / 2];
                hex::decode(s, &mut res).ok_or_else(|| {
                    E::custom("invalid router key info")
                })?;
                Ok(res.into())
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}


//============ Errors ========================================================

//------------ ParseKeyIdentifierError ---------------------------------------

/// Parsing a key identifier from a string has failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseKeyIdentifierError;

impl fmt::Display for ParseKeyIdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid key identifier")
    }
}

impl error::Error for ParseKeyIdentifierError { }


//------------ KeyIdentifierSliceError ---------------------------------------

/// A slice was of the wrong length for a key identifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyIdentifierSliceError;

impl fmt::Display for KeyIdentifierSliceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid slice for key identifier")
    }
}

impl error::Error for KeyIdentifierSliceError { }


//============ Testing =======================================================
