//! End-to-end rotation flow: generate a validator set, shuffle it several
//! epochs in a row, and verify each epoch's proof from its serialized form.

use ark_bls12_381::{Fr, G1Affine, G1Projective};
use ark_ec::CurveGroup;
use ark_std::rand::rngs::StdRng;
use ark_std::rand::prelude::SliceRandom;
use ark_std::rand::SeedableRng;
use ark_std::UniformRand;

use zk_shuffle::shuffle;
use zk_shuffle::{shuffle_permute_and_commit_input, Crs, ShuffleProof};

const ELL: usize = 60;

fn random_points(n: usize, rng: &mut StdRng) -> Vec<G1Affine> {
    let points: Vec<G1Projective> = (0..n).map(|_| G1Projective::rand(rng)).collect();
    G1Projective::normalize_batch(&points)
}

#[test]
fn rotate_three_epochs() {
    let mut rng = StdRng::seed_from_u64(0);
    let crs = Crs::rand(ELL, &mut rng);

    let mut rs = random_points(ELL, &mut rng);
    let mut ss = random_points(ELL, &mut rng);

    for _epoch in 0..3 {
        let mut perm: Vec<u32> = (0..ELL as u32).collect();
        perm.shuffle(&mut rng);
        let k = Fr::rand(&mut rng);

        let (ts, us, m, r_m) =
            shuffle_permute_and_commit_input(&crs, &rs, &ss, &perm, &k, &mut rng).unwrap();

        let proof =
            shuffle::prove(&crs, &rs, &ss, &ts, &us, m, &perm, k, &r_m, &mut rng).unwrap();

        // Ship the proof as bytes, verify the decoded copy.
        let mut bytes = Vec::new();
        proof.serialize(&mut bytes).unwrap();
        assert_eq!(bytes.len(), ShuffleProof::serialized_size(ELL));
        let decoded = ShuffleProof::deserialize(bytes.as_slice(), crs.log2_n()).unwrap();

        assert!(shuffle::verify(&decoded, &crs, &rs, &ss, &ts, &us, m, &mut rng).unwrap());

        // A verifier that saw different inputs rejects the same proof.
        assert!(!shuffle::verify(&decoded, &crs, &ss, &rs, &ts, &us, m, &mut rng).unwrap());

        rs = ts;
        ss = us;
    }
}

#[test]
fn truncated_proof_bytes_rejected() {
    let mut rng = StdRng::seed_from_u64(0);
    let crs = Crs::rand(ELL, &mut rng);
    let rs = random_points(ELL, &mut rng);
    let ss = random_points(ELL, &mut rng);

    let perm: Vec<u32> = (0..ELL as u32).rev().collect();
    let k = Fr::rand(&mut rng);
    let (ts, us, m, r_m) =
        shuffle_permute_and_commit_input(&crs, &rs, &ss, &perm, &k, &mut rng).unwrap();
    let proof = shuffle::prove(&crs, &rs, &ss, &ts, &us, m, &perm, k, &r_m, &mut rng).unwrap();

    let mut bytes = Vec::new();
    proof.serialize(&mut bytes).unwrap();
    assert!(ShuffleProof::deserialize(&bytes[..bytes.len() - 1], crs.log2_n()).is_err());

    // Corrupting a point encoding fails decoding, not verification.
    bytes[0] ^= 0x01;
    assert!(ShuffleProof::deserialize(bytes.as_slice(), crs.log2_n()).is_err());
}
