use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors from parsing a document identifier
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectIdError {
    #[error("invalid object id: {0:?}")]
    InvalidSyntax(String),
}

/// 12-byte document identifier: 4-byte big-endian seconds timestamp,
/// 5 bytes of per-process randomness, 3-byte counter.
///
/// Rendered as 24 lowercase hex characters. The leading timestamp makes byte
/// order follow creation time, which is what "sort by id" relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 12]);

static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(|| rand::thread_rng().gen());

static COUNTER: Lazy<AtomicU32> =
    Lazy::new(|| AtomicU32::new(rand::thread_rng().gen_range(0..0x00ff_ffff)));

impl ObjectId {
    pub const LEN: usize = 12;

    /// Mint a fresh id
    pub fn new() -> Self {
        let seconds = Utc::now().timestamp() as u32;
        let count = COUNTER.fetch_add(1, Ordering::SeqCst) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse with the document store's rules: 24 hex characters (any case),
    /// or any string of exactly 12 bytes, taken as the raw id bytes.
    pub fn parse(raw: &str) -> Result<Self, ObjectIdError> {
        if raw.len() == 24 {
            let mut bytes = [0u8; 12];
            return hex::decode_to_slice(raw, &mut bytes)
                .map(|_| Self(bytes))
                .map_err(|_| ObjectIdError::InvalidSyntax(raw.to_string()));
        }

        if raw.len() == Self::LEN {
            let mut bytes = [0u8; 12];
            bytes.copy_from_slice(raw.as_bytes());
            return Ok(Self(bytes));
        }

        Err(ObjectIdError::InvalidSyntax(raw.to_string()))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
