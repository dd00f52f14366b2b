//! Same-multiscalar argument.
//!
//! Proves that three multiscalar equations `A = ⟨x, G⟩`, `Z_T = ⟨x, T⟩`,
//! `Z_U = ⟨x, U⟩` share one secret vector `x`. The recursion mirrors the
//! inner-product argument over three base copies at once: a single
//! challenge per round folds `x` and all three base sequences, so a prover
//! cannot satisfy the copies with different vectors. Identity entries in
//! `T` and `U` are allowed (the shuffle pads with them).

use ark_bls12_381::{Fr, G1Affine, G1Projective};
use ark_ff::{batch_inversion, Field};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::One;
use std::ops::Mul;

use crate::errors::ShuffleError;
use crate::msm_accumulator::MsmAccumulator;
use crate::transcript::ShuffleTranscript;
use crate::util::{batch_to_affine, msm};

const LOG_TARGET: &str = "zk_shuffle::same_multiscalar";

/// Six round points per halving round plus the fully folded scalar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SameMultiscalarProof {
    pub vec_l_g: Vec<G1Projective>,
    pub vec_l_t: Vec<G1Projective>,
    pub vec_l_u: Vec<G1Projective>,
    pub vec_r_g: Vec<G1Projective>,
    pub vec_r_t: Vec<G1Projective>,
    pub vec_r_u: Vec<G1Projective>,
    pub x_final: Fr,
}

#[tracing::instrument(target = LOG_TARGET, skip_all, fields(n = vec_x.len()))]
pub fn prove(
    bases_g: &[G1Affine],
    a_comm: G1Projective,
    z_t: G1Projective,
    z_u: G1Projective,
    vec_t: &[G1Affine],
    vec_u: &[G1Affine],
    vec_x: Vec<Fr>,
    transcript: &mut ShuffleTranscript,
) -> Result<SameMultiscalarProof, ShuffleError> {
    let n = vec_x.len();
    if n == 0 || !n.is_power_of_two() {
        return Err(ShuffleError::InvalidArgument(
            "same-multiscalar vector length must be a nonzero power of two".to_string(),
        ));
    }
    if bases_g.len() != n || vec_t.len() != n || vec_u.len() != n {
        return Err(ShuffleError::InvalidArgument(
            "same-multiscalar bases must match the vector length".to_string(),
        ));
    }

    transcript.append_point(b"sms_step1", &a_comm);
    transcript.append_point(b"sms_step1", &z_t);
    transcript.append_point(b"sms_step1", &z_u);

    let mut x = vec_x;
    let mut g = bases_g.to_vec();
    let mut t = vec_t.to_vec();
    let mut u = vec_u.to_vec();

    let rounds = n.trailing_zeros() as usize;
    let mut proof = SameMultiscalarProof {
        vec_l_g: Vec::with_capacity(rounds),
        vec_l_t: Vec::with_capacity(rounds),
        vec_l_u: Vec::with_capacity(rounds),
        vec_r_g: Vec::with_capacity(rounds),
        vec_r_t: Vec::with_capacity(rounds),
        vec_r_u: Vec::with_capacity(rounds),
        x_final: Fr::one(),
    };

    while x.len() > 1 {
        let half = x.len() / 2;
        let (x_l, x_r) = x.split_at(half);
        let (g_l, g_r) = g.split_at(half);
        let (t_l, t_r) = t.split_at(half);
        let (u_l, u_r) = u.split_at(half);

        let l_g = msm(g_r, x_l)?;
        let l_t = msm(t_r, x_l)?;
        let l_u = msm(u_r, x_l)?;
        let r_g = msm(g_l, x_r)?;
        let r_t = msm(t_l, x_r)?;
        let r_u = msm(u_l, x_r)?;

        transcript.append_points(b"sms_loop", &[l_g, l_t, l_u, r_g, r_t, r_u]);
        let gamma = transcript.get_and_append_challenge(b"sms_gamma");
        let gamma_inv = gamma.inverse().unwrap();

        let mut x_next = Vec::with_capacity(half);
        let mut g_next = Vec::with_capacity(half);
        let mut t_next = Vec::with_capacity(half);
        let mut u_next = Vec::with_capacity(half);
        for i in 0..half {
            x_next.push(x_l[i] + gamma * x_r[i]);
            g_next.push(g_r[i].mul(gamma_inv) + g_l[i]);
            t_next.push(t_r[i].mul(gamma_inv) + t_l[i]);
            u_next.push(u_r[i].mul(gamma_inv) + u_l[i]);
        }
        x = x_next;
        g = batch_to_affine(&g_next);
        t = batch_to_affine(&t_next);
        u = batch_to_affine(&u_next);

        proof.vec_l_g.push(l_g);
        proof.vec_l_t.push(l_t);
        proof.vec_l_u.push(l_u);
        proof.vec_r_g.push(r_g);
        proof.vec_r_t.push(r_t);
        proof.vec_r_u.push(r_u);
    }

    proof.x_final = x[0];
    Ok(proof)
}

/// Discharge the three folded equations into the accumulator, one per base
/// copy. Returns `Ok(true)` for any structurally valid proof; the batched
/// MSM decides acceptance.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(n = bases_g.len()))]
pub fn verify(
    proof: &SameMultiscalarProof,
    bases_g: &[G1Affine],
    a_comm: G1Projective,
    z_t: G1Projective,
    z_u: G1Projective,
    vec_t: &[G1Affine],
    vec_u: &[G1Affine],
    transcript: &mut ShuffleTranscript,
    msm_accumulator: &mut MsmAccumulator,
    rng: &mut impl RngCore,
) -> Result<bool, ShuffleError> {
    let n = bases_g.len();
    let rounds = proof.vec_l_g.len();
    if rounds >= 32 {
        return Err(ShuffleError::InvalidArgument(
            "same-multiscalar proof claims too many rounds".to_string(),
        ));
    }
    let lists = [
        &proof.vec_l_t,
        &proof.vec_l_u,
        &proof.vec_r_g,
        &proof.vec_r_t,
        &proof.vec_r_u,
    ];
    if lists.iter().any(|l| l.len() != rounds) || n != (1usize << rounds) {
        return Err(ShuffleError::InvalidArgument(
            "same-multiscalar proof shape does not match the base count".to_string(),
        ));
    }
    if vec_t.len() != n || vec_u.len() != n {
        return Err(ShuffleError::InvalidArgument(
            "same-multiscalar bases must have equal length".to_string(),
        ));
    }

    transcript.append_point(b"sms_step1", &a_comm);
    transcript.append_point(b"sms_step1", &z_t);
    transcript.append_point(b"sms_step1", &z_u);

    let mut gammas = Vec::with_capacity(rounds);
    for j in 0..rounds {
        transcript.append_points(
            b"sms_loop",
            &[
                proof.vec_l_g[j],
                proof.vec_l_t[j],
                proof.vec_l_u[j],
                proof.vec_r_g[j],
                proof.vec_r_t[j],
                proof.vec_r_u[j],
            ],
        );
        gammas.push(transcript.get_and_append_challenge(b"sms_gamma"));
    }
    let mut gammas_inv = gammas.clone();
    batch_inversion(&mut gammas_inv);

    let mut s_inv = Vec::with_capacity(n);
    for i in 0..n {
        let mut coeff = proof.x_final;
        for j in 0..rounds {
            if (i >> (rounds - 1 - j)) & 1 == 1 {
                coeff *= gammas_inv[j];
            }
        }
        s_inv.push(coeff);
    }

    for (expected, copy_bases, vec_l, vec_r) in [
        (a_comm, bases_g, &proof.vec_l_g, &proof.vec_r_g),
        (z_t, vec_t, &proof.vec_l_t, &proof.vec_r_t),
        (z_u, vec_u, &proof.vec_l_u, &proof.vec_r_u),
    ] {
        let mut scalars = s_inv.clone();
        scalars.extend(gammas_inv.iter().map(|g| -*g));
        scalars.extend(gammas.iter().map(|g| -*g));

        let mut bases = copy_bases.to_vec();
        bases.extend(batch_to_affine(vec_l));
        bases.extend(batch_to_affine(vec_r));

        msm_accumulator.accumulate_check(expected, &scalars, &bases, rng)?;
    }
    Ok(true)
}

impl SameMultiscalarProof {
    pub fn serialize<W: Write>(&self, mut w: W) -> Result<(), SerializationError> {
        for j in 0..self.vec_l_g.len() {
            self.vec_l_g[j].serialize_compressed(&mut w)?;
            self.vec_l_t[j].serialize_compressed(&mut w)?;
            self.vec_l_u[j].serialize_compressed(&mut w)?;
            self.vec_r_g[j].serialize_compressed(&mut w)?;
            self.vec_r_t[j].serialize_compressed(&mut w)?;
            self.vec_r_u[j].serialize_compressed(&mut w)?;
        }
        self.x_final.serialize_compressed(&mut w)?;
        Ok(())
    }

    pub fn deserialize<R: Read>(mut r: R, rounds: usize) -> Result<Self, SerializationError> {
        let mut proof = SameMultiscalarProof {
            vec_l_g: Vec::with_capacity(rounds),
            vec_l_t: Vec::with_capacity(rounds),
            vec_l_u: Vec::with_capacity(rounds),
            vec_r_g: Vec::with_capacity(rounds),
            vec_r_t: Vec::with_capacity(rounds),
            vec_r_u: Vec::with_capacity(rounds),
            x_final: Fr::one(),
        };
        for _ in 0..rounds {
            proof.vec_l_g.push(G1Projective::deserialize_compressed(&mut r)?);
            proof.vec_l_t.push(G1Projective::deserialize_compressed(&mut r)?);
            proof.vec_l_u.push(G1Projective::deserialize_compressed(&mut r)?);
            proof.vec_r_g.push(G1Projective::deserialize_compressed(&mut r)?);
            proof.vec_r_t.push(G1Projective::deserialize_compressed(&mut r)?);
            proof.vec_r_u.push(G1Projective::deserialize_compressed(&mut r)?);
        }
        proof.x_final = Fr::deserialize_compressed(&mut r)?;
        Ok(proof)
    }
}
