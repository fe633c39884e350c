//! Converting octets from and to hex strings.

use std::str;


/// Encodes an octet sequence as a hex string.
///
/// The function uses `dest` as the buffer for encoding which therefore must
/// be at least twice the length of `src`. It returns a reference to the used
/// part of this buffer as a `&str`.
///
/// # Panics
///
/// The function panics if `dest` is shorter than twice the length of `src`.
pub fn encode<'a>(src: &[u8], dest: &'a mut [u8]) -> &'a str {
    let dest = &mut dest[..src.len() * 2];
    for (s, d) in src.iter().zip(dest.chunks_mut(2)) {
        d[0] = DIGITS[usize::from(s >> 4)];
        d[1] = DIGITS[usize::from(s & 0x0F)];
    }
    // Only ever contains ASCII digits.
    str::from_utf8(dest).unwrap_or_default()
}

/// Decodes a hex string into `dest`.
///
/// Upper and lower case digits are accepted. Returns `None` if `src` is not
/// exactly twice as long as `dest` or contains anything but hex digits.
pub fn decode(src: &str, dest: &mut [u8]) -> Option<()> {
    let src = src.as_bytes();
    if src.len() != dest.len() * 2 {
        return None
    }
    for (s, d) in src.chunks(2).zip(dest.iter_mut()) {
        *d = (digit_value(s[0])? << 4) | digit_value(s[1])?;
    }
    Some(())
}

fn digit_value(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None
    }
}

const DIGITS: &[u8] = b"0123456789ABCDEF";


//============ Testing =======================================================
