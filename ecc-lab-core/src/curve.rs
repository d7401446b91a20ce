//! Curve domain parameters.
//!
//! Grounded on `templates/curve.c`/`curve.h`/`gen/defs.h`'s `curve_t`: a
//! prime, per-model parameters, the group order and cofactor, the
//! generator and neutral element, and the reduction contexts for both
//! moduli. The original fixed the parameter set at code-generation time
//! (`{% for param in params %} bn_t {{ param }}; {% endfor %}`); here
//! [`CurveModel`] plays that role as a runtime tagged union instead.

use crate::bigint::BigInt;
use crate::error::{Error, Result};
use crate::point::{CoordinateSystem, Point};
use crate::reduction::ReductionContext;
use zeroize::Zeroize;

/// Curve-model parameters, one variant per family spec §4.7 lists.
#[derive(Clone, Debug, Zeroize)]
pub enum CurveModel {
    /// `y^2 = x^3 + ax + b`.
    ShortWeierstrass { a: BigInt, b: BigInt },
    /// `By^2 = x^3 + Ax^2 + x`.
    Montgomery { a: BigInt, b: BigInt },
    /// `x^2 + y^2 = c^2(1 + d x^2 y^2)`.
    Edwards { c: BigInt, d: BigInt },
    /// `a x^2 + y^2 = 1 + d x^2 y^2`.
    TwistedEdwards { a: BigInt, d: BigInt },
}

impl CurveModel {
    /// Update the named parameter in place. Grounded on `curve_new`'s
    /// `switch (params[i]->name)` dispatch.
    pub fn set_param(&mut self, name: char, value: BigInt) -> Result<()> {
        match (self, name) {
            (CurveModel::ShortWeierstrass { a, .. }, 'a') => *a = value,
            (CurveModel::ShortWeierstrass { b, .. }, 'b') => *b = value,
            (CurveModel::Montgomery { a, .. }, 'a') => *a = value,
            (CurveModel::Montgomery { b, .. }, 'b') => *b = value,
            (CurveModel::Edwards { c, .. }, 'c') => *c = value,
            (CurveModel::Edwards { d, .. }, 'd') => *d = value,
            (CurveModel::TwistedEdwards { a, .. }, 'a') => *a = value,
            (CurveModel::TwistedEdwards { d, .. }, 'd') => *d = value,
            _ => return Err(Error::InvalidInput),
        }
        Ok(())
    }

    /// Encode every model parameter into the field's reduction form.
    pub fn red_encode(&mut self, red: &ReductionContext, p: &BigInt) -> Result<()> {
        let fields: Vec<&mut BigInt> = match self {
            CurveModel::ShortWeierstrass { a, b } => vec![a, b],
            CurveModel::Montgomery { a, b } => vec![a, b],
            CurveModel::Edwards { c, d } => vec![c, d],
            CurveModel::TwistedEdwards { a, d } => vec![a, d],
        };
        for field in fields {
            *field = red.encode(field, p)?;
        }
        Ok(())
    }
}

/// Domain parameters for one elliptic curve, plus the precomputed
/// reduction state both the field and the scalar ring use.
#[derive(Clone, Debug, Zeroize)]
pub struct Curve {
    #[zeroize(skip)]
    coordinate_system: CoordinateSystem,
    pub model: CurveModel,
    pub p: BigInt,
    pub p_red: ReductionContext,
    pub n: BigInt,
    pub n_red: ReductionContext,
    pub h: BigInt,
    #[zeroize(skip)]
    pub generator: Point,
    #[zeroize(skip)]
    pub neutral: Point,
}

impl Curve {
    /// Builds a curve and runs `reduction.setup(p)`, matching spec §4.7:
    /// "Setting parameter `p` triggers `reduction.setup(p)`."
    pub fn new(
        coordinate_system: CoordinateSystem,
        model: CurveModel,
        p: BigInt,
        n: BigInt,
        h: BigInt,
        mut p_red: ReductionContext,
    ) -> Result<Self> {
        p_red.setup(&p)?;
        Ok(Curve {
            coordinate_system,
            model,
            p,
            p_red,
            n,
            n_red: ReductionContext::None,
            h,
            generator: Point::new(coordinate_system),
            neutral: Point::infinity(coordinate_system),
        })
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    /// Re-keys the field modulus and re-derives `p_red`. Grounded on
    /// `curve.c`'s parameter dispatch for the `'p'` name.
    pub fn set_p(&mut self, p: BigInt) -> Result<()> {
        self.p_red.setup(&p)?;
        self.p = p;
        Ok(())
    }

    /// Installs a reduction backend for the scalar ring mod `n` (used by
    /// ECDSA's `s = k^-1(e + rd) mod n`); defaults to [`ReductionContext::None`].
    pub fn set_n_reduction(&mut self, mut n_red: ReductionContext) -> Result<()> {
        n_red.setup(&self.n)?;
        self.n_red = n_red;
        Ok(())
    }

    pub fn set_n(&mut self, n: BigInt) -> Result<()> {
        self.n_red.setup(&n)?;
        self.n = n;
        Ok(())
    }

    pub fn set_h(&mut self, h: BigInt) {
        self.h = h;
    }

    /// Generic parameter dispatch by single-character name, matching the
    /// TLV path convention spec §6 describes (`p`, `n`, `h`, plus the
    /// curve-model letters).
    pub fn set_param(&mut self, name: char, value: BigInt) -> Result<()> {
        match name {
            'p' => self.set_p(value),
            'n' => self.set_n(value),
            'h' => {
                self.set_h(value);
                Ok(())
            }
            _ => self.model.set_param(name, value),
        }
    }

    /// Moves the generator and neutral element's coordinates into the
    /// field's residue representation, and the curve-model parameters
    /// along with them. Call once after all raw parameters have been set
    /// (spec §3: "Point coordinates carry the residue form; all formulas
    /// operate entirely on encoded residues").
    pub fn finalize(&mut self) -> Result<()> {
        self.model.red_encode(&self.p_red, &self.p)?;
        self.generator.red_encode_in_place(&self.p_red, &self.p)?;
        self.neutral.red_encode_in_place(&self.p_red, &self.p)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_param_dispatches_by_model() {
        let mut model = CurveModel::ShortWeierstrass {
            a: BigInt::zero(),
            b: BigInt::zero(),
        };
        model.set_param('a', BigInt::from_u64(7)).unwrap();
        match &model {
            CurveModel::ShortWeierstrass { a, .. } => assert_eq!(*a, BigInt::from_u64(7)),
            _ => unreachable!(),
        }
        assert!(model.set_param('d', BigInt::zero()).is_err());
    }

    #[test]
    fn curve_new_sets_up_reduction() {
        let p = BigInt::from_u64(97);
        let model = CurveModel::ShortWeierstrass {
            a: BigInt::from_u64(2),
            b: BigInt::from_u64(3),
        };
        let curve = Curve::new(
            CoordinateSystem::JacobianWeierstrass,
            model,
            p,
            BigInt::from_u64(89),
            BigInt::one(),
            ReductionContext::montgomery_placeholder(),
        )
        .unwrap();
        // Montgomery setup should have produced a nonzero r_mod_n.
        match &curve.p_red {
            ReductionContext::Montgomery { r_mod_n, .. } => assert!(!r_mod_n.is_zero()),
            _ => unreachable!(),
        }
    }
}
