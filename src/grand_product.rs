//! Grand-product argument.
//!
//! Proves `p = ∏ bᵢ` for a vector committed as `B = ⟨b, Gs⟩ + ⟨r_b, Hs⟩`.
//! The prover commits to the partial-product vector `c` (`c₀ = 1`,
//! `cᵢ = cᵢ₋₁·bᵢ₋₁`) and to the blinder cross term `r_p = ⟨r_c, r_b⟩`,
//! after which two challenges linearize the product constraints:
//!
//!   * β batches the chain `cᵢ·bᵢ = cᵢ₊₁` (ending in `p`) into a single
//!     inner product `⟨c, d⟩` against the derived vector
//!     `dᵢ = β^{i+1}·bᵢ − β^i·[i≥1] + α·[i=0]`,
//!   * α pins `c₀ = 1`; its coefficient in the inner product involves only
//!     committed values, so a prover cannot compensate for a shifted `c₀`.
//!
//! The resulting claim `⟨c, d⟩ = βˡ·p + α + r_p` is carried by the
//! inner-product argument: the commitment to `d` is derivable by the
//! verifier from `B` alone, because `d` over the rescaled bases
//! `β^{-(i+1)}·Gᵢ` opens to `⟨b, Gs⟩` plus a public shift through `G₀` and
//! `Gsum`.

use ark_bls12_381::{Fr, G1Projective};
use ark_ff::Field;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::One;
use std::ops::Mul;

use crate::crs::Crs;
use crate::errors::ShuffleError;
use crate::inner_product::{self, InnerProductProof};
use crate::msm_accumulator::MsmAccumulator;
use crate::transcript::ShuffleTranscript;
use crate::util::{batch_to_affine, generate_blinders, inner_product, msm};

const LOG_TARGET: &str = "zk_shuffle::grand_product";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrandProductProof {
    pub c_comm: G1Projective,
    pub r_p: Fr,
    pub ipa: InnerProductProof,
}

/// `β^{-(i+1)}` on the message bases, 1 on the blinder bases.
fn g_prime_factors(beta_inv: Fr, ell: usize, n_blinders: usize) -> Vec<Fr> {
    let mut factors = Vec::with_capacity(ell + n_blinders);
    let mut power = Fr::one();
    for _ in 0..ell {
        power *= beta_inv;
        factors.push(power);
    }
    factors.extend(std::iter::repeat(Fr::one()).take(n_blinders));
    factors
}

/// `dᵢ = β^{i+1}·bᵢ − β^i·[i≥1] + α·[i=0]`.
fn derived_vector(vec_b: &[Fr], alpha: Fr, beta: Fr) -> Vec<Fr> {
    let mut d = Vec::with_capacity(vec_b.len());
    let mut power = Fr::one();
    for (i, b) in vec_b.iter().enumerate() {
        // power holds β^i here.
        let linear = if i == 0 { -alpha } else { power };
        power *= beta;
        d.push(power * b - linear);
    }
    d
}

/// Combined inner-product commitment, computable by both sides:
/// `C + B + β⁻¹·((α+1)·G₀ − Gsum) + z·H`.
fn combined_commitment(
    crs: &Crs,
    b_comm: G1Projective,
    c_comm: G1Projective,
    alpha: Fr,
    beta_inv: Fr,
    z: Fr,
) -> G1Projective {
    c_comm
        + b_comm
        + crs.gs[0].mul(beta_inv * (alpha + Fr::one()))
        - crs.gsum.mul(beta_inv)
        + crs.h.mul(z)
}

#[tracing::instrument(target = LOG_TARGET, skip_all, fields(ell = vec_b.len()))]
pub fn prove(
    crs: &Crs,
    b_comm: G1Projective,
    p: Fr,
    vec_b: &[Fr],
    vec_r_b: &[Fr],
    transcript: &mut ShuffleTranscript,
    rng: &mut impl RngCore,
) -> Result<GrandProductProof, ShuffleError> {
    let ell = crs.ell();
    let n_blinders = crs.hs.len();
    if vec_b.len() != ell || vec_r_b.len() != n_blinders {
        return Err(ShuffleError::InvalidArgument(
            "grand-product witness does not match the crs".to_string(),
        ));
    }
    if !crs.n().is_power_of_two() {
        return Err(ShuffleError::InvalidArgument(
            "grand-product requires a power-of-two total length".to_string(),
        ));
    }

    // Step 1
    transcript.append_point(b"gprod_step1", &b_comm);
    transcript.append_scalar(b"gprod_step1", &p);

    // Step 2: partial products and their blinded commitment.
    let mut vec_c = Vec::with_capacity(ell);
    let mut product = Fr::one();
    for b in vec_b.iter() {
        vec_c.push(product);
        product *= b;
    }
    debug_assert_eq!(product, p);

    let vec_r_c = generate_blinders(rng, n_blinders);
    let c_comm = msm(&crs.gs, &vec_c)? + msm(&crs.hs, &vec_r_c)?;
    let r_p = inner_product(&vec_r_c, vec_r_b);

    transcript.append_point(b"gprod_step2", &c_comm);
    transcript.append_scalar(b"gprod_step2", &r_p);
    let alpha = transcript.get_and_append_challenge(b"gprod_alpha");
    let beta = transcript.get_and_append_challenge(b"gprod_beta");
    let beta_inv = beta.inverse().unwrap();

    // Step 3: assemble the inner-product instance.
    let mut vec_x = vec_c;
    vec_x.extend_from_slice(&vec_r_c);
    let mut vec_d = derived_vector(vec_b, alpha, beta);
    vec_d.extend_from_slice(vec_r_b);

    let factors = g_prime_factors(beta_inv, ell, n_blinders);
    let mut bases_g = crs.gs.clone();
    bases_g.extend_from_slice(&crs.hs);
    let bases_g_prime = batch_to_affine(
        &bases_g
            .iter()
            .zip(factors.iter())
            .map(|(g, u)| g.mul(*u))
            .collect::<Vec<_>>(),
    );

    let z = beta.pow([ell as u64]) * p + alpha + r_p;
    debug_assert_eq!(inner_product(&vec_x, &vec_d), z);
    let combined = combined_commitment(crs, b_comm, c_comm, alpha, beta_inv, z);

    let ipa = inner_product::prove(
        &bases_g,
        &bases_g_prime,
        crs.h,
        combined,
        vec_x,
        vec_d,
        transcript,
    )?;

    Ok(GrandProductProof { c_comm, r_p, ipa })
}

/// Replays the transcript, rebuilds the combined commitment from public
/// data and defers the single curve equation to the accumulator.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(ell = crs.ell()))]
pub fn verify(
    proof: &GrandProductProof,
    crs: &Crs,
    b_comm: G1Projective,
    p: Fr,
    transcript: &mut ShuffleTranscript,
    msm_accumulator: &mut MsmAccumulator,
    rng: &mut impl RngCore,
) -> Result<bool, ShuffleError> {
    let ell = crs.ell();
    let n_blinders = crs.hs.len();

    transcript.append_point(b"gprod_step1", &b_comm);
    transcript.append_scalar(b"gprod_step1", &p);
    transcript.append_point(b"gprod_step2", &proof.c_comm);
    transcript.append_scalar(b"gprod_step2", &proof.r_p);
    let alpha = transcript.get_and_append_challenge(b"gprod_alpha");
    let beta = transcript.get_and_append_challenge(b"gprod_beta");
    let beta_inv = beta.inverse().unwrap();

    let z = beta.pow([ell as u64]) * p + alpha + proof.r_p;
    let combined = combined_commitment(crs, b_comm, proof.c_comm, alpha, beta_inv, z);

    let factors = g_prime_factors(beta_inv, ell, n_blinders);
    let mut bases_g = crs.gs.clone();
    bases_g.extend_from_slice(&crs.hs);

    inner_product::verify(
        &proof.ipa,
        &bases_g,
        &factors,
        crs.h,
        combined,
        transcript,
        msm_accumulator,
        rng,
    )
}

impl GrandProductProof {
    pub fn serialize<W: Write>(&self, mut w: W) -> Result<(), SerializationError> {
        self.c_comm.serialize_compressed(&mut w)?;
        self.r_p.serialize_compressed(&mut w)?;
        self.ipa.serialize(&mut w)
    }

    pub fn deserialize<R: Read>(mut r: R, rounds: usize) -> Result<Self, SerializationError> {
        Ok(Self {
            c_comm: G1Projective::deserialize_compressed(&mut r)?,
            r_p: Fr::deserialize_compressed(&mut r)?,
            ipa: InnerProductProof::deserialize(&mut r, rounds)?,
        })
    }
}
