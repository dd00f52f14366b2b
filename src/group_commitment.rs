//! Pedersen-style commitment to a group element under a base pair.

use ark_bls12_381::{Fr, G1Projective};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write};
use std::ops::{Add, Mul};

/// Commitment `(t_1, t_2) = (r·b_1, r·b_2 + t)` to a group element `t`
/// under the base pair `(b_1, b_2)` with randomness `r`.
///
/// Homomorphic: adding commitments commits to the sum of the committed
/// elements under the sum of the randomnesses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct GroupCommitment {
    pub t_1: G1Projective,
    pub t_2: G1Projective,
}

impl GroupCommitment {
    pub fn new(b_1: G1Projective, b_2: G1Projective, t: G1Projective, r: Fr) -> Self {
        Self {
            t_1: b_1.mul(r),
            t_2: b_2.mul(r) + t,
        }
    }

    pub fn serialize<W: Write>(&self, mut w: W) -> Result<(), SerializationError> {
        self.t_1.serialize_compressed(&mut w)?;
        self.t_2.serialize_compressed(&mut w)?;
        Ok(())
    }

    pub fn deserialize<R: Read>(mut r: R) -> Result<Self, SerializationError> {
        Ok(Self {
            t_1: G1Projective::deserialize_compressed(&mut r)?,
            t_2: G1Projective::deserialize_compressed(&mut r)?,
        })
    }
}

impl Add for GroupCommitment {
    type Output = GroupCommitment;

    fn add(self, other: Self) -> Self {
        Self {
            t_1: self.t_1 + other.t_1,
            t_2: self.t_2 + other.t_2,
        }
    }
}

impl Mul<Fr> for GroupCommitment {
    type Output = GroupCommitment;

    fn mul(self, scalar: Fr) -> Self {
        Self {
            t_1: self.t_1.mul(scalar),
            t_2: self.t_2.mul(scalar),
        }
    }
}
