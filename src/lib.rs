//! Zero-knowledge shuffle argument over BLS12-381.
//!
//! Non-interactive proof that four vectors of G1 points `(rs, ss, ts, us)`
//! satisfy `ts[i] = k·rs[σ(i)]`, `us[i] = k·ss[σ(i)]` for a secret
//! permutation σ (committed in `m`) and a secret re-randomizer `k`. Built
//! for anonymity-set rotation of validator identities: the shuffler proves
//! the rotation was honest without revealing σ or `k`.
//!
//! The top-level proof composes four sub-arguments over one Fiat-Shamir
//! transcript; verification batches all deferred curve checks into a
//! single multi-scalar multiplication.
//!
//! ```ignore
//! let crs = Crs::rand(ell, &mut rng);
//! let (ts, us, m, r_m) =
//!     shuffle_permute_and_commit_input(&crs, &rs, &ss, &perm, &k, &mut rng)?;
//! let proof = shuffle::prove(&crs, &rs, &ss, &ts, &us, m, &perm, k, &r_m, &mut rng)?;
//! assert!(shuffle::verify(&proof, &crs, &rs, &ss, &ts, &us, m, &mut rng)?);
//! ```

pub mod crs;
pub mod errors;
pub mod grand_product;
pub mod group_commitment;
pub mod inner_product;
pub mod msm_accumulator;
pub mod same_multiscalar;
pub mod same_permutation;
pub mod same_scalar;
pub mod shuffle;
pub mod transcript;
pub mod util;

pub use crs::Crs;
pub use errors::ShuffleError;
pub use group_commitment::GroupCommitment;
pub use msm_accumulator::MsmAccumulator;
pub use shuffle::ShuffleProof;
pub use transcript::ShuffleTranscript;
pub use util::shuffle_permute_and_commit_input;

/// Reserved blinder slots in every committed vector. The shuffle uses the
/// first `N_BLINDERS - 2` for the vector blinders and the last two for the
/// group-commitment randomnesses `r_t`, `r_u`.
pub const N_BLINDERS: usize = 4;
