//! Point-arithmetic formulas as straight-line programs.
//!
//! Grounded directly on the `pyecsca-codegen` template family
//! (`templates/formula_add.c`, `formula_neg.c`, `formula_dadd.c`,
//! `ops.c`): those templates render exactly this allocate/init/run/
//! return/clear lifecycle into C source at code-generation time, from a
//! declarative `(allocations, initializations, operations, returns)`
//! tuple. [`Formula`] keeps that same declarative shape but interprets it
//! at runtime instead of rendering it to a function body.

use crate::bigint::BigInt;
use crate::curve::Curve;
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// A single modular operation, grounded on `ops.c`'s `render_op`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Op {
    Add,
    Sub,
    Neg,
    Mul,
    Sqr,
    Inv,
    Div,
}

/// One line of a formula's straight-line program: `dst = op(src1, src2)`.
/// `src2` is unused (and ignored) for the unary ops `Neg`/`Sqr`/`Inv`.
#[derive(Clone, Debug)]
pub struct Operation {
    pub op: Op,
    pub dst: String,
    pub src1: String,
    pub src2: Option<String>,
}

impl Operation {
    pub fn binary(op: Op, dst: &str, src1: &str, src2: &str) -> Self {
        Operation {
            op,
            dst: dst.to_string(),
            src1: src1.to_string(),
            src2: Some(src2.to_string()),
        }
    }

    pub fn unary(op: Op, dst: &str, src1: &str) -> Self {
        Operation {
            op,
            dst: dst.to_string(),
            src1: src1.to_string(),
            src2: None,
        }
    }
}

/// Which point operation a [`Formula`] realizes, per spec §4.5's seven
/// kinds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormulaKind {
    Add,
    Dbl,
    Tpl,
    Neg,
    /// Rescale: restores a coordinate-system invariant some formulas drift
    /// away from (e.g. renormalizing a projective factor).
    Scl,
    /// Differential add: `P + Q` given `P - Q`.
    Dadd,
    /// Combined ladder step, producing two outputs from one call.
    Ladd,
}

/// A declarative straight-line program over a working set of named
/// `BigInt`s, resolved against a curve's reduction context at evaluation
/// time. Grounded on `ops.c`: `allocations` are the formula's static
/// working set (`bn_init` per name), `initializations` map a working name
/// to a small constant (optionally encoded into residue form before use),
/// `operations` is the ordered op list, and `returns` says which working
/// names become which output-point coordinates.
#[derive(Clone, Debug)]
pub struct Formula {
    pub kind: FormulaKind,
    pub allocations: Vec<String>,
    pub initializations: Vec<(String, i64, bool)>,
    pub operations: Vec<Operation>,
    pub returns: Vec<(String, String)>,
    /// Skip the formula body when an operand is the curve's neutral
    /// element, per spec §4.5's optional short-circuits.
    pub short_circuit: bool,
}

impl Formula {
    /// Runs the program against `inputs` (typically the operand points'
    /// named coordinates, e.g. `X1`, `Y1`, `Z1`, `X2`, `Y2`, `Z2`, plus any
    /// curve-model parameters the operations reference by name) and
    /// returns the outputs named in `returns`. Output keys are strings
    /// rather than bare coordinate characters so a combined formula (e.g.
    /// [`FormulaKind::Ladd`]) can return two points' worth of coordinates
    /// (`X4`/`Z4`/`X5`/`Z5`) without key collisions; callers that expect a
    /// single output point index by a one-character key.
    pub fn eval(&self, curve: &Curve, inputs: &BTreeMap<String, BigInt>) -> Result<BTreeMap<String, BigInt>> {
        let mut working: BTreeMap<String, BigInt> = inputs.clone();
        for name in &self.allocations {
            working.entry(name.clone()).or_insert_with(BigInt::zero);
        }
        for (name, value, encode) in &self.initializations {
            let raw = if *value >= 0 {
                BigInt::from_u64(*value as u64)
            } else {
                BigInt::from_u64((-value) as u64).neg()
            };
            let v = if *encode {
                curve.p_red.encode(&raw, &curve.p)?
            } else {
                raw
            };
            working.insert(name.clone(), v);
        }
        for op in &self.operations {
            let src1 = working
                .get(&op.src1)
                .cloned()
                .ok_or(Error::InvalidInput)?;
            let result = match op.op {
                Op::Neg => curve.p_red.neg(&src1, &curve.p)?,
                Op::Sqr => curve.p_red.sqr(&src1, &curve.p)?,
                Op::Inv => curve.p_red.inv(&src1, &curve.p)?,
                Op::Add | Op::Sub | Op::Mul | Op::Div => {
                    let src2_name = op.src2.as_ref().ok_or(Error::InvalidInput)?;
                    let src2 = working.get(src2_name).cloned().ok_or(Error::InvalidInput)?;
                    match op.op {
                        Op::Add => curve.p_red.add(&src1, &src2, &curve.p)?,
                        Op::Sub => curve.p_red.sub(&src1, &src2, &curve.p)?,
                        Op::Mul => curve.p_red.mul(&src1, &src2, &curve.p)?,
                        Op::Div => curve.p_red.div(&src1, &src2, &curve.p)?,
                        _ => unreachable!(),
                    }
                }
            };
            working.insert(op.dst.clone(), result);
        }
        let mut out = BTreeMap::new();
        for (name, coord) in &self.returns {
            let value = working.get(name).cloned().ok_or(Error::InvalidInput)?;
            out.insert(coord.clone(), value);
        }
        Ok(out)
    }

    /// Jacobian short-Weierstrass point addition (`add-2007-bl`-shape: no
    /// assumption on `a`). Operand coordinates are named `X1,Y1,Z1` and
    /// `X2,Y2,Z2`; the curve parameter is read from input name `"a"`.
    pub fn jacobian_add() -> Self {
        use Op::*;
        Formula {
            kind: FormulaKind::Add,
            allocations: vec![
                "Z1Z1", "Z2Z2", "U1", "U2", "S1", "S2", "H", "I", "Jj", "Rr", "V", "t0", "t1", "t2",
                "t3",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            initializations: vec![],
            operations: vec![
                Operation::unary(Sqr, "Z1Z1", "Z1"),
                Operation::unary(Sqr, "Z2Z2", "Z2"),
                Operation::binary(Mul, "U1", "X1", "Z2Z2"),
                Operation::binary(Mul, "U2", "X2", "Z1Z1"),
                Operation::binary(Mul, "t0", "Z2", "Z2Z2"),
                Operation::binary(Mul, "S1", "Y1", "t0"),
                Operation::binary(Mul, "t1", "Z1", "Z1Z1"),
                Operation::binary(Mul, "S2", "Y2", "t1"),
                Operation::binary(Sub, "H", "U2", "U1"),
                Operation::binary(Add, "t2", "H", "H"),
                Operation::unary(Sqr, "I", "t2"),
                Operation::binary(Mul, "Jj", "H", "I"),
                Operation::binary(Sub, "Rr", "S2", "S1"),
                Operation::binary(Add, "Rr", "Rr", "Rr"),
                Operation::binary(Mul, "V", "U1", "I"),
                Operation::unary(Sqr, "t3", "Rr"),
                Operation::binary(Sub, "t3", "t3", "Jj"),
                Operation::binary(Add, "t0", "V", "V"),
                Operation::binary(Sub, "X3", "t3", "t0"),
                Operation::binary(Sub, "t1", "V", "X3"),
                Operation::binary(Mul, "t1", "Rr", "t1"),
                Operation::binary(Mul, "t2", "S1", "Jj"),
                Operation::binary(Add, "t2", "t2", "t2"),
                Operation::binary(Sub, "Y3", "t1", "t2"),
                Operation::binary(Add, "t0", "Z1", "Z2"),
                Operation::unary(Sqr, "t0", "t0"),
                Operation::binary(Sub, "t0", "t0", "Z1Z1"),
                Operation::binary(Sub, "t0", "t0", "Z2Z2"),
                Operation::binary(Mul, "Z3", "t0", "H"),
            ],
            returns: vec![
                ("X3".into(), "X".into()),
                ("Y3".into(), "Y".into()),
                ("Z3".into(), "Z".into()),
            ],
            short_circuit: true,
        }
    }

    /// Jacobian short-Weierstrass point doubling, general `a` (`dbl-2007-bl`).
    pub fn jacobian_dbl() -> Self {
        use Op::*;
        Formula {
            kind: FormulaKind::Dbl,
            allocations: vec!["XX", "YY", "YYYY", "ZZ", "S", "M", "T", "t0", "t1", "t2"]
                .into_iter()
                .map(String::from)
                .collect(),
            initializations: vec![],
            operations: vec![
                Operation::unary(Sqr, "XX", "X1"),
                Operation::unary(Sqr, "YY", "Y1"),
                Operation::unary(Sqr, "YYYY", "YY"),
                Operation::unary(Sqr, "ZZ", "Z1"),
                Operation::binary(Add, "t0", "X1", "YY"),
                Operation::unary(Sqr, "t0", "t0"),
                Operation::binary(Sub, "t0", "t0", "XX"),
                Operation::binary(Sub, "t0", "t0", "YYYY"),
                Operation::binary(Add, "S", "t0", "t0"),
                Operation::binary(Add, "t1", "XX", "XX"),
                Operation::binary(Add, "t1", "t1", "XX"),
                Operation::unary(Sqr, "t2", "ZZ"),
                Operation::binary(Mul, "t2", "a", "t2"),
                Operation::binary(Add, "M", "t1", "t2"),
                Operation::unary(Sqr, "T", "M"),
                Operation::binary(Add, "t0", "S", "S"),
                Operation::binary(Sub, "X3", "T", "t0"),
                Operation::binary(Sub, "t0", "S", "X3"),
                Operation::binary(Mul, "t0", "M", "t0"),
                Operation::binary(Add, "t1", "YYYY", "YYYY"),
                Operation::binary(Add, "t1", "t1", "t1"),
                Operation::binary(Add, "t1", "t1", "t1"),
                Operation::binary(Sub, "Y3", "t0", "t1"),
                Operation::binary(Add, "t0", "Y1", "Z1"),
                Operation::unary(Sqr, "t0", "t0"),
                Operation::binary(Sub, "t0", "t0", "YY"),
                Operation::binary(Sub, "Z3", "t0", "ZZ"),
            ],
            returns: vec![
                ("X3".into(), "X".into()),
                ("Y3".into(), "Y".into()),
                ("Z3".into(), "Z".into()),
            ],
            short_circuit: true,
        }
    }

    /// Jacobian point negation: `(X, -Y, Z)`.
    pub fn jacobian_neg() -> Self {
        use Op::*;
        Formula {
            kind: FormulaKind::Neg,
            allocations: vec![],
            initializations: vec![],
            operations: vec![Operation::unary(Neg, "Y3", "Y1")],
            returns: vec![
                ("X1".into(), "X".into()),
                ("Y3".into(), "Y".into()),
                ("Z1".into(), "Z".into()),
            ],
            short_circuit: true,
        }
    }

    /// Montgomery-curve X-only differential addition (`dadd`): given `P`
    /// (`X1,Z1`), `Q` (`X2,Z2`), and `P-Q` (`X3,Z3` fed in as `XD,ZD`),
    /// returns `P+Q`. Needs only field multiplications, matching the
    /// "differential ladder" knob in spec §4.6.
    pub fn montgomery_xz_dadd() -> Self {
        use Op::*;
        Formula {
            kind: FormulaKind::Dadd,
            allocations: vec!["t0", "t1", "t2", "t3"].into_iter().map(String::from).collect(),
            initializations: vec![],
            operations: vec![
                Operation::binary(Sub, "t0", "X1", "Z1"),
                Operation::binary(Add, "t1", "X2", "Z2"),
                Operation::binary(Mul, "t0", "t0", "t1"),
                Operation::binary(Add, "t2", "X1", "Z1"),
                Operation::binary(Sub, "t3", "X2", "Z2"),
                Operation::binary(Mul, "t2", "t2", "t3"),
                Operation::binary(Add, "t1", "t0", "t2"),
                Operation::unary(Sqr, "t1", "t1"),
                Operation::binary(Sub, "t3", "t0", "t2"),
                Operation::unary(Sqr, "t3", "t3"),
                Operation::binary(Mul, "X3", "ZD", "t1"),
                Operation::binary(Mul, "Z3", "XD", "t3"),
            ],
            returns: vec![("X3".into(), "X".into()), ("Z3".into(), "Z".into())],
            short_circuit: false,
        }
    }

    /// Montgomery-curve X-only doubling, using curve parameter `"a24" =
    /// (a+2)/4` provided by the caller via `inputs`.
    pub fn montgomery_xz_dbl() -> Self {
        use Op::*;
        Formula {
            kind: FormulaKind::Dbl,
            allocations: vec!["t0", "t1", "t2"].into_iter().map(String::from).collect(),
            initializations: vec![],
            operations: vec![
                Operation::binary(Add, "t0", "X1", "Z1"),
                Operation::unary(Sqr, "t0", "t0"),
                Operation::binary(Sub, "t1", "X1", "Z1"),
                Operation::unary(Sqr, "t1", "t1"),
                Operation::binary(Sub, "t2", "t0", "t1"),
                Operation::binary(Mul, "X3", "t0", "t1"),
                Operation::binary(Mul, "t0", "a24", "t2"),
                Operation::binary(Add, "t0", "t0", "t1"),
                Operation::binary(Mul, "Z3", "t2", "t0"),
            ],
            returns: vec![("X3".into(), "X".into()), ("Z3".into(), "Z".into())],
            short_circuit: false,
        }
    }

    /// Combined Montgomery-ladder step (RFC 7748 `x_{2k}`/`x_{2k+1}`
    /// shape): from `P0` (`X1,Z1`) and `P1` (`X2,Z2`) differing by the base
    /// point `XD,ZD`, computes `2*P0` (returned as `X4,Z4`) and `P0+P1`
    /// (returned as `X5,Z5`) in one pass, sharing the `A`/`AA`/`B`/`BB`/`E`
    /// intermediates between the doubling and the differential addition the
    /// way the classic X25519 ladder step does. Curve parameter `"a24" =
    /// (a+2)/4` is read from `inputs`, matching [`Formula::montgomery_xz_dbl`].
    pub fn montgomery_xz_ladd() -> Self {
        use Op::*;
        Formula {
            kind: FormulaKind::Ladd,
            allocations: vec!["A", "AA", "B", "BB", "E", "C", "D", "DA", "CB", "t0", "t1"]
                .into_iter()
                .map(String::from)
                .collect(),
            initializations: vec![],
            operations: vec![
                Operation::binary(Add, "A", "X1", "Z1"),
                Operation::unary(Sqr, "AA", "A"),
                Operation::binary(Sub, "B", "X1", "Z1"),
                Operation::unary(Sqr, "BB", "B"),
                Operation::binary(Sub, "E", "AA", "BB"),
                Operation::binary(Add, "C", "X2", "Z2"),
                Operation::binary(Sub, "D", "X2", "Z2"),
                Operation::binary(Mul, "DA", "D", "A"),
                Operation::binary(Mul, "CB", "C", "B"),
                Operation::binary(Add, "t0", "DA", "CB"),
                Operation::unary(Sqr, "t0", "t0"),
                Operation::binary(Mul, "X5", "ZD", "t0"),
                Operation::binary(Sub, "t1", "DA", "CB"),
                Operation::unary(Sqr, "t1", "t1"),
                Operation::binary(Mul, "Z5", "XD", "t1"),
                Operation::binary(Mul, "X4", "AA", "BB"),
                Operation::binary(Mul, "t0", "a24", "E"),
                Operation::binary(Add, "t0", "BB", "t0"),
                Operation::binary(Mul, "Z4", "E", "t0"),
            ],
            returns: vec![
                ("X4".into(), "X4".into()),
                ("Z4".into(), "Z4".into()),
                ("X5".into(), "X5".into()),
                ("Z5".into(), "Z5".into()),
            ],
            short_circuit: false,
        }
    }

    /// Extended twisted-Edwards addition, general `a` (`add-2008-hwcd-4`,
    /// unified: the same formula handles doubling too, but
    /// [`Formula::edwards_extended_dbl`] uses the cheaper dedicated
    /// doubling below). Operand coordinates are `X1,Y1,Z1,T1` and
    /// `X2,Y2,Z2,T2`; curve parameters `"a"`/`"d"` are read from `inputs`
    /// the way [`Formula::jacobian_add`] reads `"a"`.
    pub fn edwards_extended_add() -> Self {
        use Op::*;
        Formula {
            kind: FormulaKind::Add,
            allocations: vec!["t0", "t1", "t2", "t3", "t5", "A", "B", "C", "D", "E", "F", "G", "H"]
                .into_iter()
                .map(String::from)
                .collect(),
            initializations: vec![],
            operations: vec![
                Operation::binary(Add, "t0", "X1", "Y1"),
                Operation::binary(Add, "t1", "X2", "Y2"),
                Operation::binary(Mul, "t2", "t0", "t1"),
                Operation::binary(Mul, "A", "X1", "X2"),
                Operation::binary(Mul, "B", "Y1", "Y2"),
                Operation::binary(Mul, "t3", "T1", "T2"),
                Operation::binary(Mul, "C", "d", "t3"),
                Operation::binary(Mul, "D", "Z1", "Z2"),
                Operation::binary(Sub, "E", "t2", "A"),
                Operation::binary(Sub, "E", "E", "B"),
                Operation::binary(Sub, "F", "D", "C"),
                Operation::binary(Add, "G", "D", "C"),
                Operation::binary(Mul, "t5", "a", "A"),
                Operation::binary(Sub, "H", "B", "t5"),
                Operation::binary(Mul, "X3", "E", "F"),
                Operation::binary(Mul, "Y3", "G", "H"),
                Operation::binary(Mul, "T3", "E", "H"),
                Operation::binary(Mul, "Z3", "F", "G"),
            ],
            returns: vec![
                ("X3".into(), "X".into()),
                ("Y3".into(), "Y".into()),
                ("Z3".into(), "Z".into()),
                ("T3".into(), "T".into()),
            ],
            short_circuit: true,
        }
    }

    /// Extended twisted-Edwards doubling, general `a` (`dbl-2008-hwcd`).
    /// Curve parameter `"a"` is read from `inputs`.
    pub fn edwards_extended_dbl() -> Self {
        use Op::*;
        Formula {
            kind: FormulaKind::Dbl,
            allocations: vec!["A", "B", "C", "D", "t0", "t1", "E", "F", "G", "H"]
                .into_iter()
                .map(String::from)
                .collect(),
            initializations: vec![],
            operations: vec![
                Operation::unary(Sqr, "A", "X1"),
                Operation::unary(Sqr, "B", "Y1"),
                Operation::unary(Sqr, "t0", "Z1"),
                Operation::binary(Add, "C", "t0", "t0"),
                Operation::binary(Mul, "D", "a", "A"),
                Operation::binary(Add, "t1", "X1", "Y1"),
                Operation::unary(Sqr, "t1", "t1"),
                Operation::binary(Sub, "E", "t1", "A"),
                Operation::binary(Sub, "E", "E", "B"),
                Operation::binary(Add, "G", "D", "B"),
                Operation::binary(Sub, "F", "G", "C"),
                Operation::binary(Sub, "H", "D", "B"),
                Operation::binary(Mul, "X3", "E", "F"),
                Operation::binary(Mul, "Y3", "G", "H"),
                Operation::binary(Mul, "T3", "E", "H"),
                Operation::binary(Mul, "Z3", "F", "G"),
            ],
            returns: vec![
                ("X3".into(), "X".into()),
                ("Y3".into(), "Y".into()),
                ("Z3".into(), "Z".into()),
                ("T3".into(), "T".into()),
            ],
            short_circuit: true,
        }
    }

    /// Extended twisted-Edwards negation: `(-X, Y, Z, -T)`.
    pub fn edwards_extended_neg() -> Self {
        use Op::*;
        Formula {
            kind: FormulaKind::Neg,
            allocations: vec![],
            initializations: vec![],
            operations: vec![
                Operation::unary(Neg, "X3", "X1"),
                Operation::unary(Neg, "T3", "T1"),
            ],
            returns: vec![
                ("X3".into(), "X".into()),
                ("Y1".into(), "Y".into()),
                ("Z1".into(), "Z".into()),
                ("T3".into(), "T".into()),
            ],
            short_circuit: true,
        }
    }
}
