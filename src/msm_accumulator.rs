//! Deferred verification of MSM equations.
//!
//! Verifiers assert curve equations of the form `C == ⟨scalars, bases⟩`
//! throughout a proof, but none of them has to hold eagerly: each is folded
//! into a running random linear combination and a single large MSM at the
//! end decides all of them at once. A dishonest prover survives the batch
//! only with probability 1/|𝔽| per wrong equation.

use ark_bls12_381::{Fr, G1Affine, G1Projective};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::{UniformRand, Zero};
use std::collections::HashMap;
use std::ops::Mul;

use crate::errors::ShuffleError;
use crate::util::msm;

const LOG_TARGET: &str = "zk_shuffle::msm_accumulator";

/// Collector of deferred `C == ⟨scalars, bases⟩` checks.
///
/// Owned by exactly one verification. `verify` consumes the accumulator,
/// so no check can be added after the final MSM has been evaluated.
pub struct MsmAccumulator {
    accumulated: G1Projective,
    base_scalar_map: HashMap<G1Affine, Fr>,
}

impl MsmAccumulator {
    pub fn new() -> Self {
        Self {
            accumulated: G1Projective::zero(),
            base_scalar_map: HashMap::new(),
        }
    }

    /// Lazily assert `expected == ⟨scalars, bases⟩`.
    ///
    /// A fresh random weight keeps independently accumulated equations from
    /// cancelling each other.
    pub fn accumulate_check(
        &mut self,
        expected: G1Projective,
        scalars: &[Fr],
        bases: &[G1Affine],
        rng: &mut impl RngCore,
    ) -> Result<(), ShuffleError> {
        if scalars.len() != bases.len() {
            return Err(ShuffleError::InvalidArgument(format!(
                "accumulate_check: {} scalars against {} bases",
                scalars.len(),
                bases.len()
            )));
        }

        let rho = Fr::rand(rng);
        self.accumulated += expected.mul(rho);
        for (base, scalar) in bases.iter().zip(scalars.iter()) {
            let entry = self.base_scalar_map.entry(*base).or_insert_with(Fr::zero);
            *entry += rho * scalar;
        }
        Ok(())
    }

    /// Evaluate the batched equation. True iff every accumulated check holds
    /// (up to the negligible batching error).
    pub fn verify(self) -> Result<bool, ShuffleError> {
        let (bases, scalars): (Vec<G1Affine>, Vec<Fr>) =
            self.base_scalar_map.into_iter().unzip();
        tracing::debug!(target: LOG_TARGET, bases = bases.len(), "evaluating batched msm");
        Ok(msm(&bases, &scalars)? == self.accumulated)
    }
}
