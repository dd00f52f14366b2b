//! Small algebra helpers shared across the arguments.

use ark_bls12_381::{Fr, G1Affine, G1Projective};
use ark_ec::{CurveGroup, VariableBaseMSM};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::{UniformRand, Zero};
use std::ops::Mul;

use crate::crs::Crs;
use crate::errors::ShuffleError;
use crate::N_BLINDERS;

/// Multi-scalar multiplication ⟨scalars, bases⟩ over affine bases.
pub fn msm(bases: &[G1Affine], scalars: &[Fr]) -> Result<G1Projective, ShuffleError> {
    G1Projective::msm(bases, scalars)
        .map_err(|_| ShuffleError::CryptoFailure("msm bases/scalars length mismatch".to_string()))
}

/// ⟨a, b⟩ = Σ aᵢ·bᵢ.
pub fn inner_product(a: &[Fr], b: &[Fr]) -> Fr {
    a.iter().zip(b.iter()).map(|(x, y)| *x * y).sum()
}

/// Permute `xs` by `perm`: out[i] = xs[perm[i]].
pub fn permute_vector<T: Copy>(xs: &[T], perm: &[u32]) -> Vec<T> {
    perm.iter().map(|&i| xs[i as usize]).collect()
}

/// Normalize a batch of projective points to affine in one inversion pass.
pub fn batch_to_affine(points: &[G1Projective]) -> Vec<G1Affine> {
    G1Projective::normalize_batch(points)
}

pub fn affine_sum(points: &[G1Affine]) -> G1Affine {
    points
        .iter()
        .fold(G1Projective::zero(), |acc, p| acc + p)
        .into_affine()
}

pub fn generate_blinders(rng: &mut impl RngCore, count: usize) -> Vec<Fr> {
    (0..count).map(|_| Fr::rand(rng)).collect()
}

/// Prepare an honest shuffle instance from input vectors `rs`, `ss`.
///
/// Applies the permutation, scales every output pair by the randomizer `k`
/// and commits to the permutation under fresh blinders:
/// `ts[i] = k·rs[perm[i]]`, `us[i] = k·ss[perm[i]]`,
/// `m = ⟨perm, Gs⟩ + ⟨r_m, Hs⟩`.
///
/// Returns `(ts, us, m, r_m)`; `r_m` must be kept by the prover.
pub fn shuffle_permute_and_commit_input(
    crs: &Crs,
    rs: &[G1Affine],
    ss: &[G1Affine],
    perm: &[u32],
    k: &Fr,
    rng: &mut impl RngCore,
) -> Result<(Vec<G1Affine>, Vec<G1Affine>, G1Projective, Vec<Fr>), ShuffleError> {
    if rs.len() != ss.len() || rs.len() != perm.len() {
        return Err(ShuffleError::InvalidArgument(
            "shuffle input vectors must have equal length".to_string(),
        ));
    }

    let ts: Vec<G1Projective> = permute_vector(rs, perm).iter().map(|p| p.mul(*k)).collect();
    let us: Vec<G1Projective> = permute_vector(ss, perm).iter().map(|p| p.mul(*k)).collect();

    let perm_scalars: Vec<Fr> = perm.iter().map(|&i| Fr::from(i as u64)).collect();
    let r_m = generate_blinders(rng, N_BLINDERS);
    let m = msm(&crs.gs, &perm_scalars)? + msm(&crs.hs, &r_m)?;

    Ok((batch_to_affine(&ts), batch_to_affine(&us), m, r_m))
}
