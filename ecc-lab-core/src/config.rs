//! The configuration surface spec §9 enumerates.
//!
//! Every knob here is a closed, serializable choice rather than a free-form
//! string, so a malformed TOML file (the device crate's job, see its
//! `config` module) fails at deserialization instead of at first use deep
//! inside a scalar multiplication.

use crate::bigint::BigInt;
use crate::curve::CurveModel;
use crate::point::CoordinateSystem;
use crate::reduction::ReductionContext;
use crate::scalarmult::{Algorithm, Direction};
use serde::{Deserialize, Serialize};

/// Which [`CurveModel`] family a curve uses, carried separately from the
/// model's own parameter values since those arrive later over the wire
/// (spec §6's `c` command) rather than at configuration time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum CurveModelKind {
    ShortWeierstrass,
    Montgomery,
    Edwards,
    TwistedEdwards,
}

impl CurveModelKind {
    /// A model of this kind with every parameter zeroed, ready for the `c`
    /// command to fill in via [`CurveModel::set_param`].
    pub fn zeroed(self) -> CurveModel {
        match self {
            CurveModelKind::ShortWeierstrass => CurveModel::ShortWeierstrass {
                a: BigInt::zero(),
                b: BigInt::zero(),
            },
            CurveModelKind::Montgomery => CurveModel::Montgomery {
                a: BigInt::zero(),
                b: BigInt::zero(),
            },
            CurveModelKind::Edwards => CurveModel::Edwards {
                c: BigInt::zero(),
                d: BigInt::zero(),
            },
            CurveModelKind::TwistedEdwards => CurveModel::TwistedEdwards {
                a: BigInt::zero(),
                d: BigInt::zero(),
            },
        }
    }
}

/// Pluggable reduction backend, spec §9 "Reduction".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ReductionKind {
    None,
    Barrett,
    Montgomery,
}

impl ReductionKind {
    /// Builds the uninitialized context this choice names; the caller still
    /// owes it a [`ReductionContext::setup`] call once the curve's prime is
    /// known (`Curve::new` does this).
    pub fn to_context(self) -> ReductionContext {
        match self {
            ReductionKind::None => ReductionContext::none(),
            ReductionKind::Barrett => ReductionContext::barrett_placeholder(),
            ReductionKind::Montgomery => ReductionContext::montgomery_placeholder(),
        }
    }
}

/// Multiplication/squaring strategy, spec §9. The strategy only changes
/// internal cutover thresholds in this rewrite: `BigInt`'s `Vec<u64>`
/// schoolbook multiply is the one code path regardless of which variant is
/// selected, but the enum is kept so a configuration round-trips through
/// (de)serialization exactly as the spec enumerates it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum MultiplicationStrategy {
    Base,
    Comba,
    Karatsuba,
    ToomCook,
}

/// Message digest selection, spec §9 "Hash".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    None,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

/// Scalar-sampling method, spec §4.1/§9 "Random-mod".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum RandomMod {
    SampleAndReject,
    Reduce,
}

/// Per-algorithm toggles orthogonal to the algorithm choice itself, spec
/// §9's bullet list under "Mult algorithm".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScalarMultToggles {
    pub algorithm: Algorithm,
    pub direction: Direction,
    pub complete: bool,
    pub always: bool,
    pub precompute_negation: bool,
    pub width: usize,
    pub base: u64,
}

impl Default for ScalarMultToggles {
    fn default() -> Self {
        ScalarMultToggles {
            algorithm: Algorithm::Ltr,
            direction: Direction::Ltr,
            complete: false,
            always: false,
            precompute_negation: false,
            width: 4,
            base: 16,
        }
    }
}

/// The full set of knobs a configuration selects among, spec §9's
/// "Configuration surface enumerated" list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    pub reduction: ReductionKind,
    pub multiplication: MultiplicationStrategy,
    pub squaring: MultiplicationStrategy,
    pub hash: HashAlgorithm,
    pub random_mod: RandomMod,
    pub scalar_mult: ScalarMultToggles,
    pub curve_model: CurveModelKind,
    pub coordinate_system: CoordinateSystem,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            reduction: ReductionKind::Montgomery,
            multiplication: MultiplicationStrategy::Base,
            squaring: MultiplicationStrategy::Base,
            hash: HashAlgorithm::Sha256,
            random_mod: RandomMod::SampleAndReject,
            scalar_mult: ScalarMultToggles::default(),
            curve_model: CurveModelKind::ShortWeierstrass,
            coordinate_system: CoordinateSystem::JacobianWeierstrass,
        }
    }
}
