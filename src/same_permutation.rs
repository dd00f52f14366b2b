//! Same-permutation argument.
//!
//! Reduces "A and M commit to vectors related by one permutation σ" to a
//! grand product. After challenges (α, β) the prover forms
//! `bᵢ = α·σ(i) + â_i + β` with `â = σ(a)`; the multiset equality of the
//! pairs `(i, aᵢ)` and `(σ(i), â_i)` makes `∏ bᵢ` match the verifier's
//! `∏ (α·i + aᵢ + β)` exactly when σ is a permutation, and diverge with
//! overwhelming probability otherwise.

use ark_bls12_381::{Fr, G1Projective};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::One;
use std::ops::Mul;

use crate::crs::Crs;
use crate::errors::ShuffleError;
use crate::grand_product::{self, GrandProductProof};
use crate::msm_accumulator::MsmAccumulator;
use crate::transcript::ShuffleTranscript;
use crate::util::permute_vector;

const LOG_TARGET: &str = "zk_shuffle::same_permutation";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SamePermutationProof {
    pub b_comm: G1Projective,
    pub gprod: GrandProductProof,
}

#[tracing::instrument(target = LOG_TARGET, skip_all, fields(ell = vec_a.len()))]
pub fn prove(
    crs: &Crs,
    a_comm: G1Projective,
    m_comm: G1Projective,
    vec_a: &[Fr],
    perm: &[u32],
    vec_r_a: &[Fr],
    vec_r_m: &[Fr],
    transcript: &mut ShuffleTranscript,
    rng: &mut impl RngCore,
) -> Result<SamePermutationProof, ShuffleError> {
    if vec_a.len() != crs.ell() || perm.len() != crs.ell() {
        return Err(ShuffleError::InvalidArgument(
            "same-permutation vectors must match the crs".to_string(),
        ));
    }
    if vec_r_a.len() != crs.hs.len() || vec_r_m.len() != crs.hs.len() {
        return Err(ShuffleError::InvalidArgument(
            "same-permutation blinders must match the crs".to_string(),
        ));
    }

    // Step 1
    transcript.append_point(b"same_perm_step1", &a_comm);
    transcript.append_point(b"same_perm_step1", &m_comm);
    transcript.append_scalars(b"same_perm_step1", vec_a);
    let alpha = transcript.get_and_append_challenge(b"same_perm_alpha");
    let beta = transcript.get_and_append_challenge(b"same_perm_beta");

    // Step 2
    let permuted_a = permute_vector(vec_a, perm);
    let mut vec_b = Vec::with_capacity(perm.len());
    let mut p = Fr::one();
    for (sigma_i, a_hat_i) in perm.iter().zip(permuted_a.iter()) {
        let b_i = alpha * Fr::from(*sigma_i as u64) + a_hat_i + beta;
        p *= b_i;
        vec_b.push(b_i);
    }

    let b_comm = a_comm + m_comm.mul(alpha) + crs.gsum.mul(beta);
    let vec_r_b: Vec<Fr> = vec_r_a
        .iter()
        .zip(vec_r_m.iter())
        .map(|(r_a, r_m)| *r_a + alpha * r_m)
        .collect();

    let gprod = grand_product::prove(crs, b_comm, p, &vec_b, &vec_r_b, transcript, rng)?;

    Ok(SamePermutationProof { b_comm, gprod })
}

#[tracing::instrument(target = LOG_TARGET, skip_all, fields(ell = vec_a.len()))]
pub fn verify(
    proof: &SamePermutationProof,
    crs: &Crs,
    a_comm: G1Projective,
    m_comm: G1Projective,
    vec_a: &[Fr],
    transcript: &mut ShuffleTranscript,
    msm_accumulator: &mut MsmAccumulator,
    rng: &mut impl RngCore,
) -> Result<bool, ShuffleError> {
    if vec_a.len() != crs.ell() {
        return Err(ShuffleError::InvalidArgument(
            "same-permutation vector must match the crs".to_string(),
        ));
    }

    // Step 1
    transcript.append_point(b"same_perm_step1", &a_comm);
    transcript.append_point(b"same_perm_step1", &m_comm);
    transcript.append_scalars(b"same_perm_step1", vec_a);
    let alpha = transcript.get_and_append_challenge(b"same_perm_alpha");
    let beta = transcript.get_and_append_challenge(b"same_perm_beta");

    // Step 2: the public product over (i, a_i) pairs.
    let mut p = Fr::one();
    for (i, a_i) in vec_a.iter().enumerate() {
        p *= alpha * Fr::from(i as u64) + a_i + beta;
    }

    // B − A − α·M must equal β·ΣGs.
    let shifted = proof.b_comm - a_comm - m_comm.mul(alpha);
    msm_accumulator.accumulate_check(shifted, &[beta], &[crs.gsum], rng)?;

    grand_product::verify(
        &proof.gprod,
        crs,
        proof.b_comm,
        p,
        transcript,
        msm_accumulator,
        rng,
    )
}

impl SamePermutationProof {
    pub fn serialize<W: Write>(&self, mut w: W) -> Result<(), SerializationError> {
        self.b_comm.serialize_compressed(&mut w)?;
        self.gprod.serialize(&mut w)
    }

    pub fn deserialize<R: Read>(mut r: R, rounds: usize) -> Result<Self, SerializationError> {
        Ok(Self {
            b_comm: G1Projective::deserialize_compressed(&mut r)?,
            gprod: GrandProductProof::deserialize(&mut r, rounds)?,
        })
    }
}
