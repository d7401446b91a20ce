//! A configurable elliptic-curve scalar-multiplication engine for
//! side-channel analysis research.
//!
//! This crate is the pure math layer: arbitrary-precision integers
//! ([`bigint`]), pluggable modular reduction ([`reduction`]), scalar
//! recoding ([`recoding`]), point representations ([`point`]), straight-line
//! formula evaluation ([`formula`]), scalar multiplication ([`scalarmult`]),
//! curve domain parameters ([`curve`]), the aggregate knob surface
//! ([`config`]), and the process-wide random source ([`rng`]). It performs
//! no I/O and knows nothing about the command channel a consumer drives it
//! over; that lives in the `ecc-lab-device` binary crate.

pub mod bigint;
pub mod config;
pub mod curve;
pub mod error;
pub mod formula;
pub mod point;
pub mod recoding;
pub mod reduction;
pub mod rng;
pub mod scalarmult;

pub use bigint::BigInt;
pub use curve::{Curve, CurveModel};
pub use error::{Error, Result};
pub use formula::{Formula, FormulaKind};
pub use point::{CoordinateSystem, Point};
pub use reduction::ReductionContext;
pub use scalarmult::{point_add, scalar_mult, Algorithm, Direction, FormulaSet, ScalarMultConfig};
