//! Canonical serialization for node-list fingerprints.
//!
//! Node-list fingerprints and policy hashes are xxh64 over this encoding, so
//! two runs agree on a hash exactly when they produced the same value.
//!
//! ## Determinism Guarantees
//!
//! - Struct fields encode in declaration order
//! - `Vec` and `BTreeSet` encode in iteration order, which is stable
//! - Hashed types never contain a `HashMap`
//!
//! Node lists are hashed inside a [`SchemaEnvelope`], so a change to the
//! `Node`/`Dag` layout (and the schema version bump that goes with it)
//! changes every fingerprint instead of silently colliding with old ones.

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

use crate::EXTRACTION_KERNEL_SCHEMA_VERSION;

/// Seed for every kernel hash.
const HASH_SEED: u64 = 0;

/// A value tagged with the schema version it was encoded under.
#[derive(Debug, Serialize)]
pub struct SchemaEnvelope<'a, T> {
    /// [`EXTRACTION_KERNEL_SCHEMA_VERSION`] at encoding time.
    pub schema_version: &'static str,
    /// The wrapped value.
    pub body: &'a T,
}

impl<'a, T: Serialize> SchemaEnvelope<'a, T> {
    /// Wrap `body` under the current schema version.
    pub fn current(body: &'a T) -> Self {
        Self {
            schema_version: EXTRACTION_KERNEL_SCHEMA_VERSION,
            body,
        }
    }

    /// Hex hash of the envelope.
    pub fn hash_hex(&self) -> String {
        canonical_hash_hex(self)
    }
}

/// Encode a value as canonical JSON bytes.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    // Only maps with non-string keys can fail, and no kernel type has one.
    serde_json::to_vec(value).expect("canonical encoding of kernel types cannot fail")
}

/// xxh64 of the canonical encoding.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    xxh64(&to_canonical_bytes(value), HASH_SEED)
}

/// [`canonical_hash`] rendered as 16 lowercase hex digits.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}
