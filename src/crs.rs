//! Common reference string: public bases every argument commits against.

use ark_bls12_381::{G1Affine, G1Projective};
use ark_ec::{AffineRepr, CurveGroup};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::{UniformRand, Zero};

use crate::errors::ShuffleError;
use crate::util::{affine_sum, batch_to_affine};
use crate::N_BLINDERS;

/// Common reference string for the shuffle argument.
///
/// `gs` are the message bases, `hs` the blinder bases, and `h`, `gt`, `gu`
/// independent generators for the group commitments. `gsum` and `hsum`
/// cache the base sums so verifiers can fold constant vectors without an
/// MSM.
#[derive(Clone, Debug)]
pub struct Crs {
    pub gs: Vec<G1Affine>,
    pub hs: Vec<G1Affine>,
    pub h: G1Projective,
    pub gt: G1Projective,
    pub gu: G1Projective,
    pub gsum: G1Affine,
    pub hsum: G1Affine,
}

impl Crs {
    /// Sample a CRS with `ell` message bases. Test and benchmark setup;
    /// production deployments derive the bases from a public seed.
    pub fn rand(ell: usize, rng: &mut impl RngCore) -> Self {
        let gs = batch_to_affine(
            &(0..ell)
                .map(|_| G1Projective::rand(rng))
                .collect::<Vec<_>>(),
        );
        let hs = batch_to_affine(
            &(0..N_BLINDERS)
                .map(|_| G1Projective::rand(rng))
                .collect::<Vec<_>>(),
        );
        let gsum = affine_sum(&gs);
        let hsum = affine_sum(&hs);
        Self {
            gs,
            hs,
            h: G1Projective::rand(rng),
            gt: G1Projective::rand(rng),
            gu: G1Projective::rand(rng),
            gsum,
            hsum,
        }
    }

    /// Number of message bases (the shuffle vector length ℓ).
    pub fn ell(&self) -> usize {
        self.gs.len()
    }

    /// Total vector length used by the recursive arguments.
    pub fn n(&self) -> usize {
        self.gs.len() + self.hs.len()
    }

    pub fn log2_n(&self) -> usize {
        self.n().trailing_zeros() as usize
    }

    /// Reject a malformed CRS: identity elements, `gt == gu`, or cached
    /// sums inconsistent with the bases.
    pub fn validate(&self) -> Result<(), ShuffleError> {
        if self.gs.iter().any(|g| g.is_zero()) || self.hs.iter().any(|h| h.is_zero()) {
            return Err(ShuffleError::InvalidArgument(
                "crs contains an identity base".to_string(),
            ));
        }
        if self.h.is_zero() || self.gt.is_zero() || self.gu.is_zero() {
            return Err(ShuffleError::InvalidArgument(
                "crs contains an identity generator".to_string(),
            ));
        }
        if self.gt == self.gu {
            return Err(ShuffleError::InvalidArgument(
                "crs generators gt and gu coincide".to_string(),
            ));
        }
        if self.gsum != affine_sum(&self.gs) || self.hsum != affine_sum(&self.hs) {
            return Err(ShuffleError::InvalidArgument(
                "crs cached base sums are inconsistent".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::rand::rngs::StdRng;
    use ark_std::rand::SeedableRng;

    #[test]
    fn test_rand_crs_is_valid() {
        let mut rng = StdRng::seed_from_u64(0);
        let crs = Crs::rand(12, &mut rng);
        assert_eq!(crs.ell(), 12);
        assert_eq!(crs.n(), 12 + N_BLINDERS);
        crs.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_identity_base() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut crs = Crs::rand(12, &mut rng);
        crs.gs[3] = G1Affine::zero();
        assert!(crs.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_gt_eq_gu() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut crs = Crs::rand(12, &mut rng);
        crs.gu = crs.gt;
        assert!(crs.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_stale_sum() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut crs = Crs::rand(12, &mut rng);
        crs.gsum = (G1Projective::from(crs.gsum) + crs.gs[0]).into_affine();
        assert!(crs.validate().is_err());
    }
}
