//! Account addresses and base32 helpers.
//!
//! An address is the 32-byte public key followed by a 4-byte checksum (the
//! last four bytes of its SHA-512/256 digest), rendered as 58 characters of
//! unpadded RFC 4648 base32.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512_256};
use std::fmt;
use std::str::FromStr;

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const CHECKSUM_LEN: usize = 4;
const ADDRESS_LEN: usize = 58;

/// Public-key address of an account.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 32]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address must be 58 characters, got {0}")]
    Length(usize),
    #[error("address contains invalid base32 character '{0}'")]
    Character(char),
    #[error("address checksum mismatch")]
    Checksum,
}

impl Address {
    pub const ZERO: Address = Address([0u8; 32]);

    pub fn from_public_key(key: [u8; 32]) -> Self {
        Self(key)
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let digest = Sha512_256::digest(self.0);
        let mut out = [0u8; CHECKSUM_LEN];
        out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
        out
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ADDRESS_LEN {
            return Err(AddressError::Length(s.len()));
        }
        let raw = base32_decode(s)?;
        // 58 chars carry 290 bits; anything past 36 bytes is padding.
        if raw.len() < 32 + CHECKSUM_LEN {
            return Err(AddressError::Length(s.len()));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&raw[..32]);
        let address = Address(key);
        if address.checksum()[..] != raw[32..32 + CHECKSUM_LEN] {
            return Err(AddressError::Checksum);
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Vec::with_capacity(32 + CHECKSUM_LEN);
        raw.extend_from_slice(&self.0);
        raw.extend_from_slice(&self.checksum());
        f.write_str(&base32_encode(&raw))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Unpadded RFC 4648 base32.
pub fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for &byte in data {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(s: &str) -> Result<Vec<u8>, AddressError> {
    let mut out = Vec::with_capacity(s.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for c in s.chars() {
        let value = match c {
            'A'..='Z' => c as u32 - 'A' as u32,
            '2'..='7' => c as u32 - '2' as u32 + 26,
            other => return Err(AddressError::Character(other)),
        };
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENDER: &str = "MALVCNPYFAS5MN7R6DAO3BRORKMRYOWAVZWDPQ6XBEBXQ2GDFFA75E6S5M";

    #[test]
    fn test_parse_and_display_roundtrip() {
        let address: Address = SENDER.parse().unwrap();
        assert_eq!(address.to_string(), SENDER);
        assert!(!address.is_zero());
    }

    #[test]
    fn test_zero_address_display() {
        assert_eq!(
            Address::ZERO.to_string(),
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ"
        );
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut tampered = SENDER.to_string();
        tampered.replace_range(0..1, "N");
        assert_eq!(tampered.parse::<Address>(), Err(AddressError::Checksum));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!("ABC".parse::<Address>(), Err(AddressError::Length(3)));
        let lower = SENDER.to_lowercase();
        assert!(matches!(
            lower.parse::<Address>(),
            Err(AddressError::Character('m'))
        ));
    }

    #[test]
    fn test_base32_encode() {
        assert_eq!(base32_encode(b"foobar"), "MZXW6YTBOI");
        assert_eq!(base32_encode(b""), "");
    }
}
