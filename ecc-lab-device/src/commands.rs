//! One handler per spec §6 command letter.
//!
//! Grounded on `main.c`'s `cmd_init_prng, cmd_set_curve, cmd_generate,
//! cmd_set_privkey, cmd_set_pubkey, cmd_scalar_mult, cmd_ecdh,
//! cmd_ecdsa_sign, cmd_ecdsa_verify`, plus the `t`/`d` commands spec §6's
//! table lists that the original's retrieved excerpt has no body for.
//!
//! Singletons (current curve, privkey, pubkey) live on [`Device`], threaded
//! through by `&mut self` rather than as C-style `static` globals — the one
//! deliberate structural departure from the original, which spec §5's
//! single-threaded `init -> commands -> deinit` lifecycle doesn't actually
//! require process-global storage to implement.

use crate::error::{DeviceError, Result};
use crate::hal::TriggerBitmap;
use crate::prng::SpongePrng;
use crate::{asn1, hash, tlv};
use ecc_lab_core::config::Configuration;
use ecc_lab_core::curve::Curve;
use ecc_lab_core::point::{CoordinateSystem, Point};
use ecc_lab_core::scalarmult::{FormulaSet, ScalarMultConfig};
use ecc_lab_core::{point_add, scalar_mult, BigInt, Formula};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A reply frame: a letter plus its hex-framed payload. The status (`z`)
/// frame is appended by the caller after every dispatch, not produced here.
pub type Reply = (char, Vec<u8>);

pub struct Device {
    config: Configuration,
    curve: Option<Curve>,
    privkey: Option<BigInt>,
    pubkey: Option<Point>,
    trigger: TriggerBitmap,
    prng: Arc<Mutex<SpongePrng>>,
}

impl Device {
    pub fn new(config: Configuration, prng: Arc<Mutex<SpongePrng>>) -> Self {
        Device {
            config,
            curve: None,
            privkey: None,
            pubkey: None,
            trigger: TriggerBitmap::default(),
            prng,
        }
    }

    /// Dispatches one command frame, returning the payload replies to send
    /// before the final status frame.
    pub fn dispatch(&mut self, command: char, payload: &[u8]) -> Result<Vec<Reply>> {
        debug!(command, len = payload.len(), "dispatch");
        match command {
            'v' => Ok(vec![]),
            'i' => self.cmd_init_prng(payload),
            'c' => self.cmd_set_curve(payload),
            'g' => self.cmd_generate(),
            's' => self.cmd_set_privkey(payload),
            'w' => self.cmd_set_pubkey(payload),
            'm' => self.cmd_scalar_mult(payload),
            'e' => self.cmd_ecdh(payload),
            'a' => self.cmd_ecdsa_sign(payload),
            'r' => self.cmd_ecdsa_verify(payload),
            't' => self.cmd_set_trigger(payload),
            'd' => self.cmd_debug(payload),
            other => Err(DeviceError::UnknownCommand(other)),
        }
    }

    fn curve(&self) -> Result<&Curve> {
        self.curve.as_ref().ok_or(DeviceError::NoCurve)
    }

    fn privkey(&self) -> Result<&BigInt> {
        self.privkey.as_ref().ok_or(DeviceError::NoPrivateKey)
    }

    fn pubkey(&self) -> Result<&Point> {
        self.pubkey.as_ref().ok_or(DeviceError::NoPublicKey)
    }

    fn scalar_mult_config(&self, curve: &Curve) -> Result<ScalarMultConfig> {
        let toggles = &self.config.scalar_mult;
        let formulas = match curve.coordinate_system() {
            CoordinateSystem::JacobianWeierstrass => FormulaSet {
                add: Some(Formula::jacobian_add()),
                dbl: Some(Formula::jacobian_dbl()),
                neg: Some(Formula::jacobian_neg()),
                dadd: None,
                ladd: None,
                scl: None,
            },
            CoordinateSystem::MontgomeryXz => FormulaSet {
                add: None,
                dbl: Some(Formula::montgomery_xz_dbl()),
                neg: None,
                dadd: Some(Formula::montgomery_xz_dadd()),
                ladd: Some(Formula::montgomery_xz_ladd()),
                scl: None,
            },
            CoordinateSystem::ExtendedEdwards => FormulaSet {
                add: Some(Formula::edwards_extended_add()),
                dbl: Some(Formula::edwards_extended_dbl()),
                neg: Some(Formula::edwards_extended_neg()),
                dadd: None,
                ladd: None,
                scl: None,
            },
            // `ProjectiveWeierstrass` and `ProjectiveEdwards` are selectable
            // (spec §1.4) but have no formulas implemented yet.
            _ => return Err(DeviceError::Core(ecc_lab_core::Error::InvalidInput)),
        };
        Ok(ScalarMultConfig {
            algorithm: toggles.algorithm,
            direction: toggles.direction,
            complete: toggles.complete,
            always: toggles.always,
            precompute_negation: toggles.precompute_negation,
            width: toggles.width,
            base: toggles.base,
            formulas,
        })
    }

    fn random_scalar(&self, modulus: &BigInt) -> Result<BigInt> {
        use ecc_lab_core::config::RandomMod;
        let mut guard = self.prng.lock().expect("prng lock poisoned");
        let value = match self.config.random_mod {
            RandomMod::SampleAndReject => BigInt::rand_mod_sample(modulus, &mut *guard),
            RandomMod::Reduce => BigInt::rand_mod_reduce(modulus, &mut *guard),
        };
        Ok(value?)
    }

    // ---- i: seed PRNG ----------------------------------------------------

    fn cmd_init_prng(&mut self, payload: &[u8]) -> Result<Vec<Reply>> {
        self.prng.lock().expect("prng lock poisoned").seed(payload);
        Ok(vec![])
    }

    // ---- c: set curve parameters ------------------------------------------

    fn cmd_set_curve(&mut self, payload: &[u8]) -> Result<Vec<Reply>> {
        let map = tlv::parse_to_map(payload)?;
        let p = map.get("p").map(|b| BigInt::from_bytes_be(b)).ok_or(DeviceError::Tlv)?;
        let n = map.get("n").map(|b| BigInt::from_bytes_be(b)).unwrap_or_else(BigInt::zero);
        let h = map.get("h").map(|b| BigInt::from_bytes_be(b)).unwrap_or_else(BigInt::one);

        let coordinate_system = self.config.coordinate_system;
        let model = self.config.curve_model.zeroed();
        let reduction = self.config.reduction.to_context();
        let mut curve = Curve::new(coordinate_system, model, p, n, h, reduction)?;

        for (path, bytes) in &map {
            if path.len() != 1 {
                continue;
            }
            let name = path.chars().next().unwrap();
            if matches!(name, 'p' | 'n' | 'h') {
                continue;
            }
            curve.set_param(name, BigInt::from_bytes_be(bytes))?;
        }

        if let (Some(x), Some(y)) = (map.get("gx"), map.get("gy")) {
            let mut generator = Point::new(coordinate_system);
            let x = BigInt::from_bytes_be(x);
            let y = BigInt::from_bytes_be(y);
            generator.set('X', x.clone());
            if generator.coordinate_names().any(|c| c == 'Y') {
                generator.set('Y', y.clone());
            }
            if generator.coordinate_names().any(|c| c == 'Z') {
                generator.set('Z', BigInt::one());
            }
            if generator.coordinate_names().any(|c| c == 'T') {
                generator.set('T', x.mul(&y));
            }
            curve.generator = generator;
        }

        let mut neutral = Point::new(coordinate_system);
        neutral.infinity = map.get("in").map(|b| b.first().copied().unwrap_or(0) != 0).unwrap_or(true);
        for &var in coordinate_system.variables() {
            if let Some(bytes) = map.get(&format!("i{var}")) {
                neutral.set(var, BigInt::from_bytes_be(bytes));
            }
        }
        curve.neutral = neutral;

        curve.finalize()?;
        self.curve = Some(curve);
        Ok(vec![])
    }

    // ---- g: generate keypair ----------------------------------------------

    fn cmd_generate(&mut self) -> Result<Vec<Reply>> {
        let curve = self.curve()?;
        let privkey = self.random_scalar(&curve.n.clone())?;
        let config = self.scalar_mult_config(curve)?;
        let curve = self.curve()?;
        let pubkey = scalar_mult(&config, &privkey, &curve.generator, curve)?;

        let priv_bytes = privkey.to_bytes_be();
        let pub_bytes = affine_bytes(&pubkey, curve)?;

        self.privkey = Some(privkey);
        self.pubkey = Some(pubkey);

        Ok(vec![('s', priv_bytes), ('w', pub_bytes)])
    }

    // ---- s: set privkey -----------------------------------------------------

    fn cmd_set_privkey(&mut self, payload: &[u8]) -> Result<Vec<Reply>> {
        let map = tlv::parse_to_map(payload)?;
        let bytes = map.get("s").ok_or(DeviceError::Tlv)?;
        self.privkey = Some(BigInt::from_bytes_be(bytes));
        Ok(vec![])
    }

    // ---- w: set pubkey --------------------------------------------------

    fn cmd_set_pubkey(&mut self, payload: &[u8]) -> Result<Vec<Reply>> {
        let map = tlv::parse_to_map(payload)?;
        let curve = self.curve()?;
        let x = map.get("wx").ok_or(DeviceError::Tlv)?;
        let y = map.get("wy").ok_or(DeviceError::Tlv)?;
        let point = Point::from_affine(&BigInt::from_bytes_be(x), &BigInt::from_bytes_be(y), curve)?;
        self.pubkey = Some(point);
        Ok(vec![])
    }

    // ---- m: scalar-multiply -----------------------------------------------

    fn cmd_scalar_mult(&mut self, payload: &[u8]) -> Result<Vec<Reply>> {
        let map = tlv::parse_to_map(payload)?;
        let curve = self.curve()?;
        let scalar = map.get("s").map(|b| BigInt::from_bytes_be(b)).ok_or(DeviceError::Tlv)?;
        let base = match (map.get("wx"), map.get("wy")) {
            (Some(x), Some(y)) => Point::from_affine(&BigInt::from_bytes_be(x), &BigInt::from_bytes_be(y), curve)?,
            _ => curve.generator.copy(),
        };
        let config = self.scalar_mult_config(curve)?;
        let result = scalar_mult(&config, &scalar, &base, curve)?;
        let out = affine_bytes(&result, curve)?;
        Ok(vec![('w', out)])
    }

    // ---- e: ECDH ------------------------------------------------------------

    fn cmd_ecdh(&mut self, payload: &[u8]) -> Result<Vec<Reply>> {
        let map = tlv::parse_to_map(payload)?;
        let curve = self.curve()?;
        let x = map.get("wx").ok_or(DeviceError::Tlv)?;
        let y = map.get("wy").ok_or(DeviceError::Tlv)?;
        let other = Point::from_affine(&BigInt::from_bytes_be(x), &BigInt::from_bytes_be(y), curve)?;

        let privkey = self.privkey()?.clone();
        let config = self.scalar_mult_config(curve)?;
        let shared = scalar_mult(&config, &privkey, &other, curve)?;

        let (sx, _) = shared.to_affine(curve)?;
        let coord_size = curve.p.byte_len();
        let x_raw = sx.to_bytes_be_padded(coord_size)?;
        let hashed = hash::digest(self.config.hash, &x_raw);
        Ok(vec![('r', hashed)])
    }

    // ---- a: ECDSA sign --------------------------------------------------

    fn cmd_ecdsa_sign(&mut self, payload: &[u8]) -> Result<Vec<Reply>> {
        let map = tlv::parse_to_map(payload)?;
        let msg = map.get("d").ok_or(DeviceError::Tlv)?;

        let curve = self.curve()?;
        let digest = hash::digest(self.config.hash, msg);
        let e = hash::truncate_to_order(&digest, curve.n.bit_length());

        let k = self.random_scalar(&curve.n.clone())?;
        let curve = self.curve()?;
        let config = self.scalar_mult_config(curve)?;
        let point = scalar_mult(&config, &k, &curve.generator, curve)?;
        let (x, _) = point.to_affine(curve)?;
        let r = x.modulo(&curve.n)?;

        let privkey = self.privkey()?;
        let rd = r.mul_mod(privkey, &curve.n)?;
        let numerator = rd.add_mod(&e, &curve.n)?;
        let s = numerator.div_mod(&k, &curve.n)?;

        if r.is_zero() || s.is_zero() {
            return Err(DeviceError::ZeroSignatureComponent);
        }

        Ok(vec![('s', asn1::encode(&r, &s))])
    }

    // ---- r: ECDSA verify --------------------------------------------------

    fn cmd_ecdsa_verify(&mut self, payload: &[u8]) -> Result<Vec<Reply>> {
        let map = tlv::parse_to_map(payload)?;
        let msg = map.get("d").ok_or(DeviceError::Tlv)?;
        let sig = map.get("s").ok_or(DeviceError::Tlv)?;

        let Ok((r, s)) = asn1::decode(sig) else {
            return Ok(vec![('v', vec![0])]);
        };
        if r.is_zero() || s.is_zero() {
            return Ok(vec![('v', vec![0])]);
        }

        let curve = self.curve()?;
        let digest = hash::digest(self.config.hash, msg);
        let e = hash::truncate_to_order(&digest, curve.n.bit_length());

        let s_inv = s.inv_mod(&curve.n)?;
        let u1 = e.mul_mod(&s_inv, &curve.n)?;
        let u2 = r.mul_mod(&s_inv, &curve.n)?;

        let config = self.scalar_mult_config(curve)?;
        let pubkey = self.pubkey()?.clone();
        let p1 = scalar_mult(&config, &u1, &curve.generator, curve)?;
        let p2 = scalar_mult(&config, &u2, &pubkey, curve)?;

        let add = Formula::jacobian_add();
        let sum = point_add(&add, curve, &p1, &p2)?;
        let (x, _) = sum.to_affine(curve)?;
        let candidate = x.modulo(&curve.n)?;

        let valid = candidate == r;
        Ok(vec![('v', vec![valid as u8])])
    }

    // ---- t: set trigger-action bitmap --------------------------------------

    fn cmd_set_trigger(&mut self, payload: &[u8]) -> Result<Vec<Reply>> {
        let bytes: [u8; 4] = payload.try_into().map_err(|_| DeviceError::Framing)?;
        self.trigger = TriggerBitmap::from_le_bytes(bytes);
        Ok(vec![])
    }

    // ---- d: debug -----------------------------------------------------------

    fn cmd_debug(&mut self, payload: &[u8]) -> Result<Vec<Reply>> {
        let model_name = match &self.curve {
            Some(curve) => curve_model_name(curve),
            None => "none",
        };
        let coord_name = match &self.curve {
            Some(curve) => coordinate_system_name(curve.coordinate_system()),
            None => "none",
        };
        let summary = format!("{model_name},{coord_name}");
        Ok(vec![('r', payload.to_vec()), ('d', summary.into_bytes())])
    }
}

fn affine_bytes(point: &Point, curve: &Curve) -> Result<Vec<u8>> {
    let (x, y) = point.to_affine(curve)?;
    let coord_size = curve.p.byte_len();
    let mut out = x.to_bytes_be_padded(coord_size)?;
    out.extend(y.to_bytes_be_padded(coord_size)?);
    Ok(out)
}

fn curve_model_name(curve: &Curve) -> &'static str {
    use ecc_lab_core::CurveModel;
    match curve.model {
        CurveModel::ShortWeierstrass { .. } => "short-weierstrass",
        CurveModel::Montgomery { .. } => "montgomery",
        CurveModel::Edwards { .. } => "edwards",
        CurveModel::TwistedEdwards { .. } => "twisted-edwards",
    }
}

fn coordinate_system_name(system: CoordinateSystem) -> &'static str {
    match system {
        CoordinateSystem::JacobianWeierstrass => "jacobian-weierstrass",
        CoordinateSystem::ProjectiveWeierstrass => "projective-weierstrass",
        CoordinateSystem::MontgomeryXz => "montgomery-xz",
        CoordinateSystem::ExtendedEdwards => "extended-edwards",
        CoordinateSystem::ProjectiveEdwards => "projective-edwards",
    }
}
