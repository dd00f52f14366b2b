//! Discrete-log inner-product argument.
//!
//! Proves knowledge of vectors `c`, `d` opening a combined commitment
//! `C = ⟨c, G⟩ + ⟨d, G′⟩ + ⟨c, d⟩·Q` for public bases `G`, `G′` and point
//! `Q`, in log₂(n) halving rounds. The second base set is always the first
//! one rescaled coordinate-wise, so the verifier takes the scaling factors
//! instead of materialized points and performs no group operations at all:
//! its entire check is one equation handed to the MSM accumulator.

use ark_bls12_381::{Fr, G1Affine, G1Projective};
use ark_ec::CurveGroup;
use ark_ff::{batch_inversion, Field};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::One;
use std::ops::Mul;

use crate::errors::ShuffleError;
use crate::msm_accumulator::MsmAccumulator;
use crate::transcript::ShuffleTranscript;
use crate::util::{batch_to_affine, inner_product, msm};

const LOG_TARGET: &str = "zk_shuffle::inner_product";

/// One (L, R) pair per halving round plus the two fully folded scalars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InnerProductProof {
    pub vec_l: Vec<G1Projective>,
    pub vec_r: Vec<G1Projective>,
    pub c_final: Fr,
    pub d_final: Fr,
}

/// Prove `combined = ⟨c, G⟩ + ⟨d, G′⟩ + ⟨c, d⟩·Q`.
///
/// Vector lengths must be a power of two; callers pad to meet this.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(n = vec_c.len()))]
pub fn prove(
    bases_g: &[G1Affine],
    bases_g_prime: &[G1Affine],
    q: G1Projective,
    combined: G1Projective,
    vec_c: Vec<Fr>,
    vec_d: Vec<Fr>,
    transcript: &mut ShuffleTranscript,
) -> Result<InnerProductProof, ShuffleError> {
    let n = vec_c.len();
    if n == 0 || !n.is_power_of_two() {
        return Err(ShuffleError::InvalidArgument(
            "inner-product vector length must be a nonzero power of two".to_string(),
        ));
    }
    if vec_d.len() != n || bases_g.len() != n || bases_g_prime.len() != n {
        return Err(ShuffleError::InvalidArgument(
            "inner-product vectors and bases must have equal length".to_string(),
        ));
    }

    transcript.append_point(b"ipa_step1", &combined);

    let mut c = vec_c;
    let mut d = vec_d;
    let mut g = bases_g.to_vec();
    let mut g_prime = bases_g_prime.to_vec();

    let rounds = n.trailing_zeros() as usize;
    let mut vec_l = Vec::with_capacity(rounds);
    let mut vec_r = Vec::with_capacity(rounds);

    while c.len() > 1 {
        let half = c.len() / 2;
        let (c_l, c_r) = c.split_at(half);
        let (d_l, d_r) = d.split_at(half);
        let (g_l, g_r) = g.split_at(half);
        let (gp_l, gp_r) = g_prime.split_at(half);

        let l = msm(g_r, c_l)? + msm(gp_l, d_r)? + q.mul(inner_product(c_l, d_r));
        let r = msm(g_l, c_r)? + msm(gp_r, d_l)? + q.mul(inner_product(c_r, d_l));

        transcript.append_point(b"ipa_loop", &l);
        transcript.append_point(b"ipa_loop", &r);
        let gamma = transcript.get_and_append_challenge(b"ipa_gamma");
        let gamma_inv = gamma.inverse().unwrap();

        let mut c_next = Vec::with_capacity(half);
        let mut d_next = Vec::with_capacity(half);
        let mut g_next = Vec::with_capacity(half);
        let mut gp_next = Vec::with_capacity(half);
        for i in 0..half {
            c_next.push(c_l[i] + gamma * c_r[i]);
            d_next.push(d_l[i] + gamma_inv * d_r[i]);
            g_next.push(g_r[i].mul(gamma_inv) + g_l[i]);
            gp_next.push(gp_r[i].mul(gamma) + gp_l[i]);
        }
        c = c_next;
        d = d_next;
        g = batch_to_affine(&g_next);
        g_prime = batch_to_affine(&gp_next);

        vec_l.push(l);
        vec_r.push(r);
    }

    Ok(InnerProductProof {
        vec_l,
        vec_r,
        c_final: c[0],
        d_final: d[0],
    })
}

/// Verify against the original bases.
///
/// `g_prime_factors[i]` is the public scaling such that `G′_i =
/// g_prime_factors[i]·G_i`. The final curve equation is deferred to the
/// accumulator, so this returns `Ok(true)` for any structurally valid
/// proof; soundness is decided by `MsmAccumulator::verify`.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(n = bases_g.len()))]
pub fn verify(
    proof: &InnerProductProof,
    bases_g: &[G1Affine],
    g_prime_factors: &[Fr],
    q: G1Projective,
    combined: G1Projective,
    transcript: &mut ShuffleTranscript,
    msm_accumulator: &mut MsmAccumulator,
    rng: &mut impl RngCore,
) -> Result<bool, ShuffleError> {
    let n = bases_g.len();
    let rounds = proof.vec_l.len();
    if rounds >= 32 {
        return Err(ShuffleError::InvalidArgument(
            "inner-product proof claims too many rounds".to_string(),
        ));
    }
    if proof.vec_r.len() != rounds || n != (1usize << rounds) {
        return Err(ShuffleError::InvalidArgument(
            "inner-product proof shape does not match the base count".to_string(),
        ));
    }
    if g_prime_factors.len() != n {
        return Err(ShuffleError::InvalidArgument(
            "one scaling factor per base is required".to_string(),
        ));
    }

    transcript.append_point(b"ipa_step1", &combined);

    let mut gammas = Vec::with_capacity(rounds);
    for (l, r) in proof.vec_l.iter().zip(proof.vec_r.iter()) {
        transcript.append_point(b"ipa_loop", l);
        transcript.append_point(b"ipa_loop", r);
        gammas.push(transcript.get_and_append_challenge(b"ipa_gamma"));
    }
    let mut gammas_inv = gammas.clone();
    batch_inversion(&mut gammas_inv);

    // s-vector: coefficient of each original base after all folds. The
    // first set folds with γ⁻¹ on the right half, the rescaled set with γ.
    let mut scalars = Vec::with_capacity(n + 1 + 2 * rounds);
    for i in 0..n {
        let mut s = Fr::one();
        let mut s_inv = Fr::one();
        for j in 0..rounds {
            if (i >> (rounds - 1 - j)) & 1 == 1 {
                s *= gammas[j];
                s_inv *= gammas_inv[j];
            }
        }
        scalars.push(proof.c_final * s_inv + proof.d_final * s * g_prime_factors[i]);
    }
    scalars.push(proof.c_final * proof.d_final);
    for j in 0..rounds {
        scalars.push(-gammas_inv[j]);
    }
    for j in 0..rounds {
        scalars.push(-gammas[j]);
    }

    let mut bases = bases_g.to_vec();
    bases.push(q.into_affine());
    bases.extend(batch_to_affine(&proof.vec_l));
    bases.extend(batch_to_affine(&proof.vec_r));

    msm_accumulator.accumulate_check(combined, &scalars, &bases, rng)?;
    Ok(true)
}

impl InnerProductProof {
    pub fn serialize<W: Write>(&self, mut w: W) -> Result<(), SerializationError> {
        for (l, r) in self.vec_l.iter().zip(self.vec_r.iter()) {
            l.serialize_compressed(&mut w)?;
            r.serialize_compressed(&mut w)?;
        }
        self.c_final.serialize_compressed(&mut w)?;
        self.d_final.serialize_compressed(&mut w)?;
        Ok(())
    }

    pub fn deserialize<R: Read>(mut r: R, rounds: usize) -> Result<Self, SerializationError> {
        let mut vec_l = Vec::with_capacity(rounds);
        let mut vec_r = Vec::with_capacity(rounds);
        for _ in 0..rounds {
            vec_l.push(G1Projective::deserialize_compressed(&mut r)?);
            vec_r.push(G1Projective::deserialize_compressed(&mut r)?);
        }
        Ok(Self {
            vec_l,
            vec_r,
            c_final: Fr::deserialize_compressed(&mut r)?,
            d_final: Fr::deserialize_compressed(&mut r)?,
        })
    }
}
