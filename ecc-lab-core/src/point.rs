//! Points in a configurable coordinate system.
//!
//! The original codegen specialized a fixed `point_t` struct per curve
//! (one `bn_t` field per coordinate name) because the C layer picked a
//! coordinate system at code-generation time. This engine picks one at
//! runtime instead, so [`Point`] carries its coordinates in a small sorted
//! map keyed by name rather than as named struct fields — grounded on
//! `templates/point.c`/`defs.h`'s `point_t { bn_t <vars>...; bool infinity; }`.

use crate::bigint::BigInt;
use crate::curve::Curve;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use subtle::{Choice, ConditionallySelectable};

/// Which named coordinates a point carries, one variant per coordinate
/// system spec §3/§4.4 lists.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// Short-Weierstrass Jacobian: `x = X/Z^2`, `y = Y/Z^3`.
    JacobianWeierstrass,
    /// Short-Weierstrass homogeneous projective: `x = X/Z`, `y = Y/Z`.
    ProjectiveWeierstrass,
    /// Montgomery curve, X-only ladder coordinates: `x = X/Z`.
    MontgomeryXz,
    /// Twisted-Edwards extended projective: `x = X/Z`, `y = Y/Z`, `T = XY/Z`.
    ExtendedEdwards,
    /// Twisted-Edwards homogeneous projective: `x = X/Z`, `y = Y/Z`.
    ProjectiveEdwards,
}

impl CoordinateSystem {
    /// Coordinate names, in the order the original templates declared them.
    pub fn variables(self) -> &'static [char] {
        match self {
            CoordinateSystem::JacobianWeierstrass => &['X', 'Y', 'Z'],
            CoordinateSystem::ProjectiveWeierstrass => &['X', 'Y', 'Z'],
            CoordinateSystem::MontgomeryXz => &['X', 'Z'],
            CoordinateSystem::ExtendedEdwards => &['X', 'Y', 'Z', 'T'],
            CoordinateSystem::ProjectiveEdwards => &['X', 'Y', 'Z'],
        }
    }
}

/// A point in some [`CoordinateSystem`]. Grounded on `templates/point.c`'s
/// `point_t`/`point_new`/`point_copy`/`point_set`/`point_equals`.
///
/// Unlike [`BigInt`] this does not derive `Zeroize`: `zeroize`'s blanket
/// impls don't cover `BTreeMap`, and intermediate points are short-lived
/// scratch values rather than long-resident secrets the way a private
/// scalar is.
#[derive(Clone, Debug)]
pub struct Point {
    system: CoordinateSystem,
    coords: BTreeMap<char, BigInt>,
    pub infinity: bool,
}

impl Point {
    /// A fresh point with every coordinate initialized to zero, matching
    /// `point_new`'s `bn_init` of each field.
    pub fn new(system: CoordinateSystem) -> Self {
        let coords = system.variables().iter().map(|&c| (c, BigInt::zero())).collect();
        Point {
            system,
            coords,
            infinity: false,
        }
    }

    pub fn system(&self) -> CoordinateSystem {
        self.system
    }

    /// The neutral element, flagged via `infinity` rather than a
    /// coordinate convention a formula would have to special-case. `X` (if
    /// the system has one) is set to 1 so X-only Montgomery-ladder formulas
    /// that don't consult the flag still see the conventional `(1 : 0)`
    /// representation of infinity rather than `(0 : 0)`.
    pub fn infinity(system: CoordinateSystem) -> Self {
        let mut p = Point::new(system);
        p.infinity = true;
        if p.coords.contains_key(&'X') {
            p.coords.insert('X', BigInt::one());
        }
        p
    }

    /// Read coordinate `name`. Panics if `name` is not part of this point's
    /// coordinate system — a programming error, not a runtime condition.
    pub fn get(&self, name: char) -> &BigInt {
        self.coords
            .get(&name)
            .unwrap_or_else(|| panic!("coordinate {name} not present in {:?}", self.system))
    }

    pub fn set(&mut self, name: char, value: BigInt) {
        assert!(
            self.coords.contains_key(&name),
            "coordinate {name} not present in {:?}",
            self.system
        );
        self.coords.insert(name, value);
    }

    pub fn coordinate_names(&self) -> impl Iterator<Item = char> + '_ {
        self.coords.keys().copied()
    }

    /// `point_copy`/`point_set`: a defensive clone.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Selects `a` if `choice` is true, else `b`, coordinate-wise, without
    /// branching on `choice` — the state-swap primitive a constant-time
    /// ladder step needs so the secret bit it swaps on doesn't leak through
    /// a data-dependent branch. Panics if `a`/`b` are not the same
    /// coordinate system, a programming error rather than a runtime
    /// condition the way [`Point::get`]/[`Point::set`] treat a missing
    /// coordinate.
    pub fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        assert_eq!(a.system, b.system, "conditional_select between different coordinate systems");
        let coords = a
            .coords
            .iter()
            .map(|(&name, av)| (name, BigInt::conditional_select(av, b.get(name), choice)))
            .collect();
        let infinity = u8::conditional_select(&(a.infinity as u8), &(b.infinity as u8), choice) != 0;
        Point {
            system: a.system,
            coords,
            infinity,
        }
    }

    /// `point_equals`: coordinate-wise equality plus the infinity flag. Does
    /// *not* normalize projective factors — use [`Point::equals_affine`] for
    /// that.
    pub fn equals(&self, other: &Self) -> bool {
        self.infinity == other.infinity && self.system == other.system && self.coords == other.coords
    }

    /// Normalizes both points to affine `(x, y)` under `curve` before
    /// comparing. `None` in either coordinate (points at infinity) are
    /// compared via the `infinity` flag alone.
    pub fn equals_affine(&self, other: &Self, curve: &Curve) -> Result<bool> {
        if self.infinity || other.infinity {
            return Ok(self.infinity == other.infinity);
        }
        let (sx, sy) = self.to_affine(curve)?;
        let (ox, oy) = other.to_affine(curve)?;
        Ok(sx == ox && sy == oy)
    }

    /// Converts to affine `(x, y)`, dividing out the projective factor.
    /// Grounded on `templates/point.c::point_to_affine`, which includes the
    /// coordinate system's own `ops.c` division formula; here that formula
    /// is just the division this function performs directly since the
    /// engine is not specialized per coordinate system at build time.
    pub fn to_affine(&self, curve: &Curve) -> Result<(BigInt, BigInt)> {
        if self.infinity {
            return Err(Error::InvalidInput);
        }
        let red = &curve.p_red;
        let p = &curve.p;
        match self.system {
            CoordinateSystem::JacobianWeierstrass => {
                let z = red.decode(self.get('Z'), p)?;
                let z_inv = z.inv_mod(p)?;
                let z_inv = red.encode(&z_inv, p)?;
                let z_inv2 = red.sqr(&z_inv, p)?;
                let z_inv3 = red.mul(&z_inv2, &z_inv, p)?;
                let x = red.mul(self.get('X'), &z_inv2, p)?;
                let y = red.mul(self.get('Y'), &z_inv3, p)?;
                Ok((red.decode(&x, p)?, red.decode(&y, p)?))
            }
            CoordinateSystem::ProjectiveWeierstrass | CoordinateSystem::ProjectiveEdwards => {
                let z = red.decode(self.get('Z'), p)?;
                let z_inv = z.inv_mod(p)?;
                let z_inv = red.encode(&z_inv, p)?;
                let x = red.mul(self.get('X'), &z_inv, p)?;
                let y = red.mul(self.get('Y'), &z_inv, p)?;
                Ok((red.decode(&x, p)?, red.decode(&y, p)?))
            }
            CoordinateSystem::MontgomeryXz => {
                let z = red.decode(self.get('Z'), p)?;
                let z_inv = z.inv_mod(p)?;
                let z_inv = red.encode(&z_inv, p)?;
                let x = red.mul(self.get('X'), &z_inv, p)?;
                Ok((red.decode(&x, p)?, BigInt::zero()))
            }
            CoordinateSystem::ExtendedEdwards => {
                let z = red.decode(self.get('Z'), p)?;
                let z_inv = z.inv_mod(p)?;
                let z_inv = red.encode(&z_inv, p)?;
                let x = red.mul(self.get('X'), &z_inv, p)?;
                let y = red.mul(self.get('Y'), &z_inv, p)?;
                Ok((red.decode(&x, p)?, red.decode(&y, p)?))
            }
        }
    }

    /// Builds a point from affine `(x, y)`. Grounded on
    /// `templates/point.c::point_from_affine`: copies `x -> X`, `y -> Y`,
    /// sets `Z` to the residue form of 1, and (extended Edwards only) sets
    /// `T = x*y`.
    pub fn from_affine(x: &BigInt, y: &BigInt, curve: &Curve) -> Result<Self> {
        let mut point = Point::new(curve.coordinate_system());
        let red = &curve.p_red;
        let p = &curve.p;
        let ex = red.encode(x, p)?;
        let ey = red.encode(y, p)?;
        point.set('X', ex.clone());
        if point.coords.contains_key(&'Y') {
            point.set('Y', ey.clone());
        }
        if point.coords.contains_key(&'Z') {
            point.set('Z', red.encode(&BigInt::one(), p)?);
        }
        if point.coords.contains_key(&'T') {
            point.set('T', red.mul(&ex, &ey, p)?);
        }
        Ok(point)
    }

    /// Applies `red`'s `encode` to every coordinate.
    pub fn red_encode_in_place(&mut self, red: &crate::reduction::ReductionContext, p: &BigInt) -> Result<()> {
        let names: Vec<char> = self.coordinate_names().collect();
        for name in names {
            let encoded = red.encode(self.get(name), p)?;
            self.set(name, encoded);
        }
        Ok(())
    }

    /// Applies `red`'s `decode` to every coordinate.
    pub fn red_decode_in_place(&mut self, red: &crate::reduction::ReductionContext, p: &BigInt) -> Result<()> {
        let names: Vec<char> = self.coordinate_names().collect();
        for name in names {
            let decoded = red.decode(self.get(name), p)?;
            self.set(name, decoded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveModel;
    use crate::reduction::ReductionContext;

    fn test_curve() -> Curve {
        // secp256r1
        let p = BigInt::from_hex(
            "ffffffff00000001000000000000000000000000ffffffffffffffffffffff",
        )
        .unwrap();
        let a = BigInt::from_hex(
            "ffffffff00000001000000000000000000000000fffffffffffffffffffffc",
        )
        .unwrap();
        let b = BigInt::from_hex(
            "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b",
        )
        .unwrap();
        let n = BigInt::from_hex(
            "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551",
        )
        .unwrap();
        Curve::new(
            CoordinateSystem::JacobianWeierstrass,
            CurveModel::ShortWeierstrass { a, b },
            p,
            n,
            BigInt::one(),
            ReductionContext::montgomery_placeholder(),
        )
        .unwrap()
    }

    #[test]
    fn affine_round_trip() {
        let curve = test_curve();
        let gx = BigInt::from_hex(
            "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296",
        )
        .unwrap();
        let gy = BigInt::from_hex(
            "4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5",
        )
        .unwrap();
        let p = Point::from_affine(&gx, &gy, &curve).unwrap();
        let (x, y) = p.to_affine(&curve).unwrap();
        assert_eq!(x, gx.modulo(&curve.p).unwrap());
        assert_eq!(y, gy.modulo(&curve.p).unwrap());
    }

    #[test]
    fn equals_affine_ignores_projective_factor() {
        let curve = test_curve();
        let gx = BigInt::from_u64(5);
        let gy = BigInt::from_u64(7);
        let p1 = Point::from_affine(&gx, &gy, &curve).unwrap();
        let mut p2 = p1.clone();
        // Scale Z by an arbitrary nonzero residue, X and Y accordingly, and
        // confirm affine equality survives even though `equals` would not.
        let factor = curve.p_red.encode(&BigInt::from_u64(3), &curve.p).unwrap();
        let f2 = curve.p_red.sqr(&factor, &curve.p).unwrap();
        let f3 = curve.p_red.mul(&f2, &factor, &curve.p).unwrap();
        p2.set('X', curve.p_red.mul(p2.get('X'), &f2, &curve.p).unwrap());
        p2.set('Y', curve.p_red.mul(p2.get('Y'), &f3, &curve.p).unwrap());
        p2.set('Z', curve.p_red.mul(p2.get('Z'), &factor, &curve.p).unwrap());
        assert!(!p1.equals(&p2));
        assert!(p1.equals_affine(&p2, &curve).unwrap());
    }
}
