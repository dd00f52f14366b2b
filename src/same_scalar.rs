//! Same-scalar argument.
//!
//! Sigma protocol proving that the group commitments `T` and `U` commit to
//! `k·R` and `k·S` for one secret scalar `k`, without revealing it. The
//! check is constant-size, so it is performed directly rather than through
//! the MSM accumulator.

use ark_bls12_381::{Fr, G1Projective};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Read, SerializationError, Write};
use ark_std::rand::RngCore;
use ark_std::UniformRand;
use std::ops::Mul;

use crate::crs::Crs;
use crate::errors::ShuffleError;
use crate::group_commitment::GroupCommitment;
use crate::transcript::ShuffleTranscript;

const LOG_TARGET: &str = "zk_shuffle::same_scalar";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SameScalarProof {
    pub a_t: GroupCommitment,
    pub a_u: GroupCommitment,
    pub z_k: Fr,
    pub z_t: Fr,
    pub z_u: Fr,
}

#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn prove(
    crs: &Crs,
    r_point: G1Projective,
    s_point: G1Projective,
    t_comm: GroupCommitment,
    u_comm: GroupCommitment,
    k: Fr,
    r_t: Fr,
    r_u: Fr,
    transcript: &mut ShuffleTranscript,
    rng: &mut impl RngCore,
) -> Result<SameScalarProof, ShuffleError> {
    let r_k = Fr::rand(rng);
    let r_at = Fr::rand(rng);
    let r_au = Fr::rand(rng);

    let a_t = GroupCommitment::new(crs.gt, crs.h, r_point.mul(r_k), r_at);
    let a_u = GroupCommitment::new(crs.gu, crs.h, s_point.mul(r_k), r_au);

    append_statement(transcript, &r_point, &s_point, &t_comm, &u_comm, &a_t, &a_u);
    let e = transcript.get_and_append_challenge(b"same_scalar_chal");

    Ok(SameScalarProof {
        a_t,
        a_u,
        z_k: r_k + e * k,
        z_t: r_at + e * r_t,
        z_u: r_au + e * r_u,
    })
}

/// Direct constant-size check of the two commitment equations.
#[tracing::instrument(target = LOG_TARGET, skip_all)]
pub fn verify(
    proof: &SameScalarProof,
    crs: &Crs,
    r_point: G1Projective,
    s_point: G1Projective,
    t_comm: GroupCommitment,
    u_comm: GroupCommitment,
    transcript: &mut ShuffleTranscript,
) -> bool {
    append_statement(
        transcript, &r_point, &s_point, &t_comm, &u_comm, &proof.a_t, &proof.a_u,
    );
    let e = transcript.get_and_append_challenge(b"same_scalar_chal");

    let expected_t = GroupCommitment::new(crs.gt, crs.h, r_point.mul(proof.z_k), proof.z_t);
    let expected_u = GroupCommitment::new(crs.gu, crs.h, s_point.mul(proof.z_k), proof.z_u);

    expected_t == proof.a_t + t_comm.mul(e) && expected_u == proof.a_u + u_comm.mul(e)
}

fn append_statement(
    transcript: &mut ShuffleTranscript,
    r_point: &G1Projective,
    s_point: &G1Projective,
    t_comm: &GroupCommitment,
    u_comm: &GroupCommitment,
    a_t: &GroupCommitment,
    a_u: &GroupCommitment,
) {
    transcript.append_points(
        b"same_scalar_step1",
        &[
            *r_point, *s_point, t_comm.t_1, t_comm.t_2, u_comm.t_1, u_comm.t_2, a_t.t_1, a_t.t_2,
            a_u.t_1, a_u.t_2,
        ],
    );
}

impl SameScalarProof {
    pub fn serialize<W: Write>(&self, mut w: W) -> Result<(), SerializationError> {
        self.a_t.serialize(&mut w)?;
        self.a_u.serialize(&mut w)?;
        self.z_k.serialize_compressed(&mut w)?;
        self.z_t.serialize_compressed(&mut w)?;
        self.z_u.serialize_compressed(&mut w)?;
        Ok(())
    }

    pub fn deserialize<R: Read>(mut r: R) -> Result<Self, SerializationError> {
        Ok(Self {
            a_t: GroupCommitment::deserialize(&mut r)?,
            a_u: GroupCommitment::deserialize(&mut r)?,
            z_k: Fr::deserialize_compressed(&mut r)?,
            z_t: Fr::deserialize_compressed(&mut r)?,
            z_u: Fr::deserialize_compressed(&mut r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::rand::rngs::StdRng;
    use ark_std::rand::SeedableRng;

    struct Setup {
        crs: Crs,
        r_point: G1Projective,
        s_point: G1Projective,
        t_comm: GroupCommitment,
        u_comm: GroupCommitment,
        k: Fr,
        r_t: Fr,
        r_u: Fr,
    }

    fn random_setup(rng: &mut StdRng) -> Setup {
        let crs = Crs::rand(4, rng);
        let r_point = G1Projective::rand(rng);
        let s_point = G1Projective::rand(rng);
        let k = Fr::rand(rng);
        let r_t = Fr::rand(rng);
        let r_u = Fr::rand(rng);
        let t_comm = GroupCommitment::new(crs.gt, crs.h, r_point.mul(k), r_t);
        let u_comm = GroupCommitment::new(crs.gu, crs.h, s_point.mul(k), r_u);
        Setup {
            crs,
            r_point,
            s_point,
            t_comm,
            u_comm,
            k,
            r_t,
            r_u,
        }
    }

    fn prove_setup(setup: &Setup, rng: &mut StdRng) -> SameScalarProof {
        let mut transcript = ShuffleTranscript::new(b"same_scalar_test");
        prove(
            &setup.crs,
            setup.r_point,
            setup.s_point,
            setup.t_comm,
            setup.u_comm,
            setup.k,
            setup.r_t,
            setup.r_u,
            &mut transcript,
            rng,
        )
        .unwrap()
    }

    fn verify_setup(proof: &SameScalarProof, setup: &Setup) -> bool {
        let mut transcript = ShuffleTranscript::new(b"same_scalar_test");
        verify(
            proof,
            &setup.crs,
            setup.r_point,
            setup.s_point,
            setup.t_comm,
            setup.u_comm,
            &mut transcript,
        )
    }

    #[test]
    fn test_completeness() {
        let mut rng = StdRng::seed_from_u64(0);
        let setup = random_setup(&mut rng);
        let proof = prove_setup(&setup, &mut rng);
        assert!(verify_setup(&proof, &setup));
    }

    #[test]
    fn test_soundness_different_scalars() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut setup = random_setup(&mut rng);
        // U commits to k'·S for k' ≠ k.
        setup.u_comm = GroupCommitment::new(
            setup.crs.gu,
            setup.crs.h,
            setup.s_point.mul(setup.k + Fr::from(1u64)),
            setup.r_u,
        );
        let proof = prove_setup(&setup, &mut rng);
        assert!(!verify_setup(&proof, &setup));
    }

    #[test]
    fn test_soundness_tampered_response() {
        let mut rng = StdRng::seed_from_u64(0);
        let setup = random_setup(&mut rng);
        let mut proof = prove_setup(&setup, &mut rng);
        proof.z_k += Fr::from(1u64);
        assert!(!verify_setup(&proof, &setup));
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut rng = StdRng::seed_from_u64(0);
        let setup = random_setup(&mut rng);
        let proof = prove_setup(&setup, &mut rng);

        let mut bytes = Vec::new();
        proof.serialize(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 4 * 48 + 3 * 32);
        assert_eq!(
            SameScalarProof::deserialize(bytes.as_slice()).unwrap(),
            proof
        );
    }
}
