//! Ring identifier arithmetic.
//!
//! A [Did] is a point on the finite ring R(P) where P = 2^160. All
//! arithmetic wraps modulo P, and every ordering question on the ring is
//! asked relative to some base point via [between].
use std::fmt;
use std::ops::Add;
use std::ops::Neg;
use std::ops::Sub;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::Deserialize;
use serde::Serialize;
use sha1::Digest;
use sha1::Sha1;

use crate::consts::RING_BITS;
use crate::error::Error;
use crate::error::Result;

/// Number of bytes backing a [Did]. 20 bytes is the SHA-1 digest width.
pub const DID_LEN: usize = RING_BITS / 8;

/// A 160-bit identifier on the ring, for nodes and keys alike.
#[derive(Copy, Clone, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
pub struct Did([u8; DID_LEN]);

impl Did {
    /// The zero point of the ring.
    pub const ZERO: Did = Did([0u8; DID_LEN]);

    /// Hash an arbitrary string onto the ring.
    pub fn digest(s: &str) -> Self {
        let hash = Sha1::digest(s.as_bytes());
        Self(hash.into())
    }

    /// Raw big-endian bytes of this identifier.
    pub fn as_bytes(&self) -> &[u8; DID_LEN] {
        &self.0
    }

    /// Start of the i-th finger interval: (self + 2^i) mod 2^160.
    pub fn finger_start(&self, index: usize) -> Did {
        *self + Did::from(BigUint::from(2u16).pow(index as u32))
    }
}

/// Test whether `x` lies on the open-closed arc (left, right] of the ring.
///
/// The arc is walked clockwise from `left`; it may wrap through zero. The
/// degenerate arc (a, a] is empty, so `between(a, x, a)` is false for
/// every `x`.
pub fn between(left: Did, x: Did, right: Did) -> bool {
    x != left && x - left <= right - left
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Did {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Did(0x{}..)", hex::encode(&self.0[..4]))
    }
}

impl From<Did> for BigUint {
    fn from(did: Did) -> BigUint {
        BigUint::from_bytes_be(did.as_bytes())
    }
}

impl From<BigUint> for Did {
    fn from(a: BigUint) -> Self {
        let wrapped = a % (BigUint::from(2u16).pow(RING_BITS as u32));
        let mut tail = wrapped.to_bytes_be();
        let mut bytes = vec![0u8; DID_LEN - tail.len()];
        bytes.append(&mut tail);
        let mut raw = [0u8; DID_LEN];
        raw.copy_from_slice(&bytes);
        Self(raw)
    }
}

impl From<u32> for Did {
    fn from(n: u32) -> Did {
        Self::from(BigUint::from(n))
    }
}

impl FromStr for Did {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        let raw: [u8; DID_LEN] = bytes
            .try_into()
            .map_err(|_| Error::BadIdLength(DID_LEN))?;
        Ok(Self(raw))
    }
}

impl Neg for Did {
    type Output = Self;
    fn neg(self) -> Self {
        let ret = BigUint::from(2u16).pow(RING_BITS as u32) - BigUint::from(self);
        ret.into()
    }
}

impl Add for Did {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        ((BigUint::from(self) + BigUint::from(rhs)) % (BigUint::from(2u16).pow(RING_BITS as u32)))
            .into()
    }
}

impl Sub for Did {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}
