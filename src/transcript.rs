//! Fiat-Shamir transcript shared by the shuffle proof and its sub-arguments.
//!
//! A thin wrapper over a byte-oriented keyed sponge. Every appended value
//! goes in under a label as its canonical compressed encoding, and every
//! challenge is squeezed as 512 bits, reduced into the scalar field, and
//! appended back under the same label. Two runs with identical call
//! sequences yield identical challenges; any reordering or value change
//! diverges.

use ark_bls12_381::{Fr, G1Affine, G1Projective};
use ark_ff::PrimeField;
use ark_serialize::CanonicalSerialize;
use ark_std::vec::Vec;
use ark_std::Zero;
use merlin::Transcript;

pub struct ShuffleTranscript {
    inner: Transcript,
}

impl ShuffleTranscript {
    /// Create a transcript seeded with a domain-separation label.
    pub fn new(label: &'static [u8]) -> Self {
        Self {
            inner: Transcript::new(label),
        }
    }

    fn append_serializable<T: CanonicalSerialize>(&mut self, label: &'static [u8], item: &T) {
        let mut bytes = Vec::with_capacity(item.compressed_size());
        item.serialize_compressed(&mut bytes)
            .expect("serializing into a Vec cannot fail");
        self.inner.append_message(label, &bytes);
    }

    pub fn append_point(&mut self, label: &'static [u8], point: &G1Projective) {
        self.append_serializable(label, point);
    }

    pub fn append_points(&mut self, label: &'static [u8], points: &[G1Projective]) {
        for point in points {
            self.append_serializable(label, point);
        }
    }

    pub fn append_affine_points(&mut self, label: &'static [u8], points: &[G1Affine]) {
        for point in points {
            self.append_serializable(label, point);
        }
    }

    pub fn append_scalar(&mut self, label: &'static [u8], scalar: &Fr) {
        self.append_serializable(label, scalar);
    }

    pub fn append_scalars(&mut self, label: &'static [u8], scalars: &[Fr]) {
        for scalar in scalars {
            self.append_serializable(label, scalar);
        }
    }

    /// Squeeze a challenge in 𝔽*, appending it back into the transcript.
    ///
    /// 512 bits are squeezed and reduced mod r so the result is
    /// statistically uniform. A zero outcome is re-squeezed: every caller
    /// either inverts the challenge or relies on it being nonzero.
    pub fn get_and_append_challenge(&mut self, label: &'static [u8]) -> Fr {
        loop {
            let mut bytes = [0u8; 64];
            self.inner.challenge_bytes(label, &mut bytes);
            let challenge = Fr::from_le_bytes_mod_order(&bytes);
            if !challenge.is_zero() {
                self.append_scalar(label, &challenge);
                return challenge;
            }
        }
    }

    pub fn get_and_append_challenges(&mut self, label: &'static [u8], count: usize) -> Vec<Fr> {
        (0..count)
            .map(|_| self.get_and_append_challenge(label))
            .collect()
    }
}
