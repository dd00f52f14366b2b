//! Top-level shuffle argument.
//!
//! Proves that `(ts, us)` is a permutation of `(rs, ss)` re-randomized by
//! one secret scalar `k`, with the permutation committed in `m_comm`. The
//! transcript first binds every public vector and squeezes the challenge
//! vector `a`; the claim is then split across three sub-arguments sharing
//! that transcript:
//!
//!   * same-permutation: `A` commits to `σ(a)` for the σ inside `m_comm`,
//!   * same-scalar: `T` and `U` commit to `k·R` and `k·S` for one `k`,
//!   * same-multiscalar: one vector opens `A′`, `T.t_2` and `U.t_2`
//!     against the extended bases, tying the permuted challenges to the
//!     shuffled ciphertext vectors.
//!
//! Verification defers every MSM equation to the accumulator; the single
//! batched check at the end decides acceptance.

use ark_bls12_381::{Fr, G1Affine, G1Projective};
use ark_ec::AffineRepr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::UniformRand;
use std::ops::Mul;

use crate::crs::Crs;
use crate::errors::ShuffleError;
use crate::group_commitment::GroupCommitment;
use crate::msm_accumulator::MsmAccumulator;
use crate::same_multiscalar::{self, SameMultiscalarProof};
use crate::same_permutation::{self, SamePermutationProof};
use crate::same_scalar::{self, SameScalarProof};
use crate::transcript::ShuffleTranscript;
use crate::util::{batch_to_affine, generate_blinders, msm, permute_vector};
use crate::N_BLINDERS;

const LOG_TARGET: &str = "zk_shuffle::shuffle";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShuffleProof {
    pub a_comm: G1Projective,
    pub t_comm: GroupCommitment,
    pub u_comm: GroupCommitment,
    pub r_comm: G1Projective,
    pub s_comm: G1Projective,
    pub same_perm: SamePermutationProof,
    pub same_scalar: SameScalarProof,
    pub same_multiscalar: SameMultiscalarProof,
}

fn check_dimensions(
    crs: &Crs,
    rs: &[G1Affine],
    ss: &[G1Affine],
    ts: &[G1Affine],
    us: &[G1Affine],
) -> Result<(), ShuffleError> {
    let ell = crs.ell();
    if rs.len() != ell || ss.len() != ell || ts.len() != ell || us.len() != ell {
        return Err(ShuffleError::InvalidArgument(
            "shuffle vectors must match the crs length".to_string(),
        ));
    }
    if ell < N_BLINDERS {
        return Err(ShuffleError::InvalidArgument(
            "shuffle vectors shorter than the blinder count".to_string(),
        ));
    }
    if !crs.n().is_power_of_two() {
        return Err(ShuffleError::InvalidArgument(
            "total vector length must be a power of two".to_string(),
        ));
    }
    Ok(())
}

/// Bases for the same-multiscalar step: the CRS message and blinder bases
/// extended by `Gt`, `Gu`, and the shuffled vectors zero-padded so that the
/// blinder slots line up with `r_t` and `r_u` against `H`.
fn extended_bases(
    crs: &Crs,
    ts: &[G1Affine],
    us: &[G1Affine],
) -> (Vec<G1Affine>, Vec<G1Affine>, Vec<G1Affine>) {
    let singles = batch_to_affine(&[crs.gt, crs.gu, crs.h]);
    let (gt, gu, h) = (singles[0], singles[1], singles[2]);

    let mut bases_g = crs.gs.clone();
    bases_g.extend_from_slice(&crs.hs[..N_BLINDERS - 2]);
    bases_g.push(gt);
    bases_g.push(gu);

    let mut vec_t = ts.to_vec();
    vec_t.extend_from_slice(&[G1Affine::zero(), G1Affine::zero(), h, G1Affine::zero()]);

    let mut vec_u = us.to_vec();
    vec_u.extend_from_slice(&[G1Affine::zero(), G1Affine::zero(), G1Affine::zero(), h]);

    (bases_g, vec_t, vec_u)
}

#[tracing::instrument(target = LOG_TARGET, skip_all, fields(ell = rs.len()))]
pub fn prove(
    crs: &Crs,
    rs: &[G1Affine],
    ss: &[G1Affine],
    ts: &[G1Affine],
    us: &[G1Affine],
    m_comm: G1Projective,
    perm: &[u32],
    k: Fr,
    vec_r_m: &[Fr],
    rng: &mut impl RngCore,
) -> Result<ShuffleProof, ShuffleError> {
    check_dimensions(crs, rs, ss, ts, us)?;
    if perm.len() != crs.ell() || vec_r_m.len() != N_BLINDERS {
        return Err(ShuffleError::InvalidArgument(
            "permutation or commitment blinders do not match the crs".to_string(),
        ));
    }

    let mut transcript = ShuffleTranscript::new(b"shuffle_argument");

    // Step 1: bind the instance, squeeze the challenge vector.
    transcript.append_affine_points(b"shuffle_step1", rs);
    transcript.append_affine_points(b"shuffle_step1", ss);
    transcript.append_affine_points(b"shuffle_step1", ts);
    transcript.append_affine_points(b"shuffle_step1", us);
    transcript.append_point(b"shuffle_step1", &m_comm);
    let vec_a = transcript.get_and_append_challenges(b"shuffle_vec_a", crs.ell());

    // Step 2: commit to the permuted challenges. The last two blinder
    // slots are reserved for r_t and r_u in the multiscalar step.
    let vec_r_a = generate_blinders(rng, N_BLINDERS - 2);
    let mut vec_r_a_prime = vec_r_a.clone();
    vec_r_a_prime.push(Fr::from(0u64));
    vec_r_a_prime.push(Fr::from(0u64));

    let permuted_a = permute_vector(&vec_a, perm);
    let a_comm = msm(&crs.gs, &permuted_a)? + msm(&crs.hs, &vec_r_a_prime)?;

    let same_perm = same_permutation::prove(
        crs,
        a_comm,
        m_comm,
        &vec_a,
        perm,
        &vec_r_a_prime,
        vec_r_m,
        &mut transcript,
        rng,
    )?;

    // Step 3: fold the instance to single points and commit to their
    // k-multiples.
    let r_t = Fr::rand(rng);
    let r_u = Fr::rand(rng);
    let r_comm = msm(rs, &vec_a)?;
    let s_comm = msm(ss, &vec_a)?;
    let t_comm = GroupCommitment::new(crs.gt, crs.h, r_comm.mul(k), r_t);
    let u_comm = GroupCommitment::new(crs.gu, crs.h, s_comm.mul(k), r_u);

    let same_scalar = same_scalar::prove(
        crs,
        r_comm,
        s_comm,
        t_comm,
        u_comm,
        k,
        r_t,
        r_u,
        &mut transcript,
        rng,
    )?;

    // Step 4: one witness vector opens A′ and both t_2 components.
    let a_prime = a_comm + t_comm.t_1 + u_comm.t_1;
    let (bases_g, vec_t, vec_u) = extended_bases(crs, ts, us);

    let mut vec_x = permuted_a;
    vec_x.extend_from_slice(&vec_r_a);
    vec_x.push(r_t);
    vec_x.push(r_u);

    let same_multiscalar = same_multiscalar::prove(
        &bases_g,
        a_prime,
        t_comm.t_2,
        u_comm.t_2,
        &vec_t,
        &vec_u,
        vec_x,
        &mut transcript,
    )?;

    Ok(ShuffleProof {
        a_comm,
        t_comm,
        u_comm,
        r_comm,
        s_comm,
        same_perm,
        same_scalar,
        same_multiscalar,
    })
}

/// Verify a shuffle proof.
///
/// Returns `Ok(false)` for a well-formed but dishonest proof and an error
/// only for malformed input. The final accumulator check ratifies every
/// deferred equation at once.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(ell = rs.len()))]
pub fn verify(
    proof: &ShuffleProof,
    crs: &Crs,
    rs: &[G1Affine],
    ss: &[G1Affine],
    ts: &[G1Affine],
    us: &[G1Affine],
    m_comm: G1Projective,
    rng: &mut impl RngCore,
) -> Result<bool, ShuffleError> {
    crs.validate()?;
    check_dimensions(crs, rs, ss, ts, us)?;

    // A zero randomizer would have wiped out the ciphertexts.
    if ts[0].is_zero() {
        return Err(ShuffleError::InvalidArgument("randomizer is zero".to_string()));
    }

    let mut transcript = ShuffleTranscript::new(b"shuffle_argument");
    let mut msm_accumulator = MsmAccumulator::new();

    // Step 1
    transcript.append_affine_points(b"shuffle_step1", rs);
    transcript.append_affine_points(b"shuffle_step1", ss);
    transcript.append_affine_points(b"shuffle_step1", ts);
    transcript.append_affine_points(b"shuffle_step1", us);
    transcript.append_point(b"shuffle_step1", &m_comm);
    let vec_a = transcript.get_and_append_challenges(b"shuffle_vec_a", crs.ell());

    // Step 2
    if !same_permutation::verify(
        &proof.same_perm,
        crs,
        proof.a_comm,
        m_comm,
        &vec_a,
        &mut transcript,
        &mut msm_accumulator,
        rng,
    )? {
        return Ok(false);
    }

    // Step 3
    if !same_scalar::verify(
        &proof.same_scalar,
        crs,
        proof.r_comm,
        proof.s_comm,
        proof.t_comm,
        proof.u_comm,
        &mut transcript,
    ) {
        return Ok(false);
    }

    // Step 4
    let a_prime = proof.a_comm + proof.t_comm.t_1 + proof.u_comm.t_1;
    let (bases_g, vec_t, vec_u) = extended_bases(crs, ts, us);
    if !same_multiscalar::verify(
        &proof.same_multiscalar,
        &bases_g,
        a_prime,
        proof.t_comm.t_2,
        proof.u_comm.t_2,
        &vec_t,
        &vec_u,
        &mut transcript,
        &mut msm_accumulator,
        rng,
    )? {
        return Ok(false);
    }

    // The folded instance points must match the challenge vector.
    msm_accumulator.accumulate_check(proof.r_comm, &vec_a, rs, rng)?;
    msm_accumulator.accumulate_check(proof.s_comm, &vec_a, ss, rng)?;

    msm_accumulator.verify()
}

impl ShuffleProof {
    pub fn serialize<W: Write>(&self, mut w: W) -> Result<(), SerializationError> {
        self.a_comm.serialize_compressed(&mut w)?;
        self.t_comm.serialize(&mut w)?;
        self.u_comm.serialize(&mut w)?;
        self.r_comm.serialize_compressed(&mut w)?;
        self.s_comm.serialize_compressed(&mut w)?;
        self.same_perm.serialize(&mut w)?;
        self.same_scalar.serialize(&mut w)?;
        self.same_multiscalar.serialize(&mut w)?;
        Ok(())
    }

    /// `rounds` is `log2(ℓ + N_BLINDERS)`, i.e. `Crs::log2_n`.
    pub fn deserialize<R: Read>(mut r: R, rounds: usize) -> Result<Self, SerializationError> {
        Ok(Self {
            a_comm: G1Projective::deserialize_compressed(&mut r)?,
            t_comm: GroupCommitment::deserialize(&mut r)?,
            u_comm: GroupCommitment::deserialize(&mut r)?,
            r_comm: G1Projective::deserialize_compressed(&mut r)?,
            s_comm: G1Projective::deserialize_compressed(&mut r)?,
            same_perm: SamePermutationProof::deserialize(&mut r, rounds)?,
            same_scalar: SameScalarProof::deserialize(&mut r)?,
            same_multiscalar: SameMultiscalarProof::deserialize(&mut r, rounds)?,
        })
    }

    /// Exact wire size in bytes of a proof for `ell` shuffled pairs.
    pub fn serialized_size(ell: usize) -> usize {
        const POINT: usize = 48;
        const SCALAR: usize = 32;
        let rounds = (ell + N_BLINDERS).trailing_zeros() as usize;
        let instance = 7 * POINT;
        let same_perm = POINT + (POINT + SCALAR + rounds * 2 * POINT + 2 * SCALAR);
        let same_scalar = 4 * POINT + 3 * SCALAR;
        let same_multiscalar = rounds * 6 * POINT + SCALAR;
        instance + same_perm + same_scalar + same_multiscalar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::shuffle_permute_and_commit_input;
    use ark_std::rand::rngs::StdRng;
    use ark_std::rand::SeedableRng;
    use ark_std::UniformRand;

    const ELL: usize = 60;

    struct Instance {
        crs: Crs,
        rs: Vec<G1Affine>,
        ss: Vec<G1Affine>,
        ts: Vec<G1Affine>,
        us: Vec<G1Affine>,
        m_comm: G1Projective,
        perm: Vec<u32>,
        k: Fr,
        vec_r_m: Vec<Fr>,
    }

    /// Reverse permutation, k = 7, seeded rng — the reference scenario.
    fn reference_instance(rng: &mut StdRng) -> Instance {
        let crs = Crs::rand(ELL, rng);
        let rs = batch_to_affine(
            &(0..ELL).map(|_| G1Projective::rand(rng)).collect::<Vec<_>>(),
        );
        let ss = batch_to_affine(
            &(0..ELL).map(|_| G1Projective::rand(rng)).collect::<Vec<_>>(),
        );
        let perm: Vec<u32> = (0..ELL as u32).rev().collect();
        let k = Fr::from(7u64);
        let (ts, us, m_comm, vec_r_m) =
            shuffle_permute_and_commit_input(&crs, &rs, &ss, &perm, &k, rng).unwrap();
        Instance {
            crs,
            rs,
            ss,
            ts,
            us,
            m_comm,
            perm,
            k,
            vec_r_m,
        }
    }

    fn prove_instance(inst: &Instance, rng: &mut StdRng) -> ShuffleProof {
        prove(
            &inst.crs,
            &inst.rs,
            &inst.ss,
            &inst.ts,
            &inst.us,
            inst.m_comm,
            &inst.perm,
            inst.k,
            &inst.vec_r_m,
            rng,
        )
        .unwrap()
    }

    fn verify_instance(
        proof: &ShuffleProof,
        inst: &Instance,
        rng: &mut StdRng,
    ) -> Result<bool, ShuffleError> {
        verify(
            proof,
            &inst.crs,
            &inst.rs,
            &inst.ss,
            &inst.ts,
            &inst.us,
            inst.m_comm,
            rng,
        )
    }

    #[test]
    fn test_completeness() {
        let mut rng = StdRng::seed_from_u64(0);
        let inst = reference_instance(&mut rng);
        let proof = prove_instance(&inst, &mut rng);
        assert!(verify_instance(&proof, &inst, &mut rng).unwrap());
    }

    #[test]
    fn test_bad_permutation() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut inst = reference_instance(&mut rng);

        // Prove under a permutation that disagrees with the one used to
        // build ts/us: identity with positions 0 and 1 swapped.
        let mut wrong_perm: Vec<u32> = (0..ELL as u32).collect();
        wrong_perm.swap(0, 1);
        inst.perm = wrong_perm;

        let proof = prove_instance(&inst, &mut rng);
        assert!(!verify_instance(&proof, &inst, &mut rng).unwrap());
    }

    #[test]
    fn test_bad_scalar() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut inst = reference_instance(&mut rng);
        let proof = prove_instance(&inst, &mut rng);

        // Re-randomize one output pair with a different scalar.
        inst.us[5] = inst.us[5].mul(Fr::rand(&mut rng)).into();
        assert!(!verify_instance(&proof, &inst, &mut rng).unwrap());
    }

    #[test]
    fn test_zero_randomizer() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut inst = reference_instance(&mut rng);
        let proof = prove_instance(&inst, &mut rng);

        inst.ts[0] = G1Affine::zero();
        let err = verify_instance(&proof, &inst, &mut rng).unwrap_err();
        assert!(err.to_string().contains("randomizer is zero"));
    }

    #[test]
    fn test_tampered_permutation_commitment() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut inst = reference_instance(&mut rng);
        let proof = prove_instance(&inst, &mut rng);

        // The verifier sees a different M than the prover committed to.
        inst.m_comm += G1Projective::rand(&mut rng);
        assert!(!verify_instance(&proof, &inst, &mut rng).unwrap());
    }

    #[test]
    fn test_tampered_a_commitment() {
        let mut rng = StdRng::seed_from_u64(0);
        let inst = reference_instance(&mut rng);
        let mut proof = prove_instance(&inst, &mut rng);

        // Shift A within the blinder-base span.
        proof.a_comm += G1Projective::from(inst.crs.hs[0]);
        assert!(!verify_instance(&proof, &inst, &mut rng).unwrap());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut rng = StdRng::seed_from_u64(0);
        let inst = reference_instance(&mut rng);
        let proof = prove_instance(&inst, &mut rng);

        let mut bytes = Vec::new();
        proof.serialize(&mut bytes).unwrap();
        assert_eq!(bytes.len(), ShuffleProof::serialized_size(ELL));

        let decoded = ShuffleProof::deserialize(bytes.as_slice(), inst.crs.log2_n()).unwrap();
        assert_eq!(decoded, proof);

        let mut bytes2 = Vec::new();
        decoded.serialize(&mut bytes2).unwrap();
        assert_eq!(bytes, bytes2);

        assert!(verify_instance(&decoded, &inst, &mut rng).unwrap());
    }
}
