//! Forward error correction: RS, LDPC and BCH behind one uniform front door.
//!
//! [`Fec`] is the uniform entry point described by the `poporon_t*`-style
//! front door this crate generalizes: [`Fec::create`] validates a
//! [`FecConfig`] and builds the family-specific codec state, after which
//! [`Fec::encode`]/[`Fec::decode`] dispatch on the family. Each family's own
//! type ([`RsCode`], [`BchCode`], [`LdpcCode`]) remains directly usable for
//! callers who want the family-specific API (erasure decoding, soft-decision
//! LDPC, ...) instead of the uniform one.

pub mod bch;
pub mod erasure;
mod error;
pub mod gf;
pub mod ldpc;
pub mod rng;
pub mod rs;

pub use bch::BchCode;
pub use erasure::ErasureSet;
pub use error::{FecError, Result};
pub use gf::GaloisField;
pub use ldpc::{LdpcCode, LdpcConfig, LdpcMatrixType, LdpcRate, BURST_RESISTANT_MAX_ITERATIONS};
pub use rng::Rng;
pub use rs::RsCode;

use serde::{Deserialize, Serialize};

/// A built identifier for this crate, filling the role of the original
/// library's `poporon_version_id`/`poporon_buildtime` pair. Not part of the
/// core codec logic (spec.md §1's "thin wrappers ... are out of scope"); kept
/// as a fixed constant rather than a build-script timestamp since this crate
/// has no release process of its own yet.
const VERSION_ID: u32 = 0x0001_0000;
const BUILDTIME: u32 = 0;

/// Returns a 32-bit version identifier for this crate.
pub fn version_id() -> u32 {
    VERSION_ID
}

/// Returns a 32-bit build timestamp for this crate (0 when unset).
pub fn buildtime() -> u32 {
    BUILDTIME
}

/// Construction-time parameters for an RS code (spec.md §6 defaults:
/// `m=8, p=0x11D, b=1, s=1, r=32`).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RsConfig {
    pub symbol_size: u8,
    pub generator_polynomial: u16,
    pub first_consecutive_root: u16,
    pub primitive_element: u16,
    pub num_roots: u8,
}

impl Default for RsConfig {
    fn default() -> Self {
        RsConfig {
            symbol_size: 8,
            generator_polynomial: 0x11D,
            first_consecutive_root: 1,
            primitive_element: 1,
            num_roots: 32,
        }
    }
}

/// Construction-time parameters for a BCH code (spec.md §6 defaults:
/// `m=4, p=0x13, t=3`).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BchConfig {
    pub symbol_size: u8,
    pub generator_polynomial: u16,
    pub correction_capability: u8,
}

impl Default for BchConfig {
    fn default() -> Self {
        BchConfig {
            symbol_size: 4,
            generator_polynomial: 0x13,
            correction_capability: 3,
        }
    }
}

/// Construction-time parameters for an LDPC code: a block size in bytes, a
/// rate, the matrix/interleave [`LdpcConfig`], and the decode-call
/// `max_iterations` the front door passes through on every `decode`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LdpcFecConfig {
    pub block_size: usize,
    pub rate: LdpcRate,
    pub matrix: LdpcConfig,
    pub max_iterations: u32,
}

impl Default for LdpcFecConfig {
    fn default() -> Self {
        LdpcFecConfig {
            block_size: 64,
            rate: LdpcRate::OneHalf,
            matrix: LdpcConfig::default(),
            max_iterations: 0,
        }
    }
}

impl LdpcFecConfig {
    /// The burst-resistant preset (spec.md §6): column weight 7, both
    /// interleavers on, 100-iteration budget.
    pub fn burst_resistant(block_size: usize, rate: LdpcRate) -> Self {
        LdpcFecConfig {
            block_size,
            rate,
            matrix: LdpcConfig::burst_resistant(),
            max_iterations: BURST_RESISTANT_MAX_ITERATIONS,
        }
    }
}

/// Selects and parameterizes one of the three FEC families (spec.md §6).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FecConfig {
    Rs(RsConfig),
    Bch(BchConfig),
    Ldpc(LdpcFecConfig),
}

/// Identifies which family a [`Fec`] handle was built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FecType {
    Rs,
    Bch,
    Ldpc,
}

enum FecFamily {
    Rs(RsCode),
    Bch(BchCode),
    Ldpc {
        code: LdpcCode,
        max_iterations: u32,
    },
}

/// A constructed, ready-to-use FEC codec of one family, matching the uniform
/// `create`/`encode`/`decode`/`destroy` surface of spec.md §4.9 and §6.
///
/// `destroy` has no explicit method: dropping a `Fec` releases every table,
/// buffer, and permutation it owns, matching §5's "bounded sequence on
/// handle destruction, regardless of which construction step failed" —
/// Rust's ordinary `Drop` glue gives that for free once construction is
/// transactional (built via `?` rather than manual partial-init cleanup).
pub struct Fec {
    family: FecFamily,
    parity_size: usize,
    info_size: usize,
    last_iterations: usize,
}

impl Fec {
    /// Validates `config` and constructs the family-specific state. For RS,
    /// this additionally solves `primitive_inverse * primitive_element == 1
    /// (mod field_size)` by scanning as described in spec.md §4.9.
    pub fn create(config: FecConfig) -> Result<Self> {
        match config {
            FecConfig::Rs(c) => {
                let rs = RsCode::new(
                    c.symbol_size,
                    c.generator_polynomial,
                    c.first_consecutive_root,
                    c.primitive_element,
                    c.num_roots,
                )?;
                let info_size = rs.max_info_len();
                let parity_size = rs.num_roots() as usize;
                Ok(Fec {
                    family: FecFamily::Rs(rs),
                    parity_size,
                    info_size,
                    last_iterations: 0,
                })
            }
            FecConfig::Bch(c) => {
                let bch = BchCode::new(c.symbol_size, c.generator_polynomial, c.correction_capability)?;
                let parity_bits = bch.codeword_length() - bch.data_length();
                // `n = 2^m - 1` is always odd, so data/parity bit widths are
                // never both byte-aligned; each field is packed into its own
                // ceil(bits / 8)-byte buffer and right-justified, the same
                // convention `pack_be`/`unpack_be` use throughout.
                let info_size = (bch.data_length() as usize + 7) / 8;
                let parity_size = (parity_bits as usize + 7) / 8;
                Ok(Fec {
                    family: FecFamily::Bch(bch),
                    parity_size,
                    info_size,
                    last_iterations: 0,
                })
            }
            FecConfig::Ldpc(c) => {
                let code = LdpcCode::new(c.block_size, c.rate, c.matrix)?;
                let info_size = code.info_bytes();
                let parity_size = code.parity_bytes();
                Ok(Fec {
                    family: FecFamily::Ldpc {
                        code,
                        max_iterations: c.max_iterations,
                    },
                    parity_size,
                    info_size,
                    last_iterations: 0,
                })
            }
        }
    }

    pub fn fec_type(&self) -> FecType {
        match &self.family {
            FecFamily::Rs(_) => FecType::Rs,
            FecFamily::Bch(_) => FecType::Bch,
            FecFamily::Ldpc { .. } => FecType::Ldpc,
        }
    }

    /// Number of belief-propagation iterations the most recent `decode`
    /// used; `0` for RS/BCH (and for an LDPC decode that converged on the
    /// unmodified codeword).
    pub fn iterations_used(&self) -> usize {
        self.last_iterations
    }

    /// The family's native redundancy size in bytes: parity symbols for RS,
    /// parity bytes for BCH (`ceil(parity_bits / 8)`), parity bytes for LDPC.
    pub fn parity_size(&self) -> usize {
        self.parity_size
    }

    /// The family's native information capacity in bytes: max data symbols
    /// for RS, data bytes for BCH (`ceil(data_length / 8)`), info bytes for LDPC.
    pub fn info_size(&self) -> usize {
        self.info_size
    }

    /// Encodes `data`, returning the parity bytes to append.
    ///
    /// For LDPC with an outer (byte) interleaver enabled, `data` is
    /// scattered in place to the byte order the parity bytes were computed
    /// against, so the caller's later `data ++ parity` concatenation is a
    /// valid codeword; `decode` undoes the scatter transparently. RS and
    /// BCH never mutate `data` (both are systematic encodings).
    pub fn encode(&self, data: &mut [u8]) -> Result<Vec<u8>> {
        match &self.family {
            FecFamily::Rs(rs) => rs.encode(data),
            FecFamily::Bch(bch) => {
                let (value, _) = pack_be(data, bch.data_length())?;
                let codeword = bch.encode(value)?;
                let parity_bits = bch.codeword_length() - bch.data_length();
                let parity_bytes = (parity_bits as usize + 7) / 8;
                Ok(unpack_be(codeword & ((1u32 << parity_bits) - 1), parity_bits, parity_bytes))
            }
            FecFamily::Ldpc { code, .. } => {
                let (info_out, parity_out) = code.encode(data)?;
                data.copy_from_slice(&info_out);
                Ok(parity_out)
            }
        }
    }

    /// Decodes `data`/`parity` in place, returning the number of applied
    /// corrections (RS symbol corrections, BCH bit flips, or LDPC
    /// belief-propagation iterations consumed).
    pub fn decode(&mut self, data: &mut [u8], parity: &mut [u8]) -> Result<usize> {
        let corrections = match &mut self.family {
            FecFamily::Rs(rs) => rs.decode(data, parity)?,
            FecFamily::Bch(bch) => {
                let parity_bits = bch.codeword_length() - bch.data_length();
                let (data_value, _) = pack_be(data, bch.data_length())?;
                let (parity_value, _) = pack_be(parity, parity_bits)?;
                let received = (data_value << parity_bits) | parity_value;
                let (corrected, errors) = bch.decode(received)?;
                let data_value = bch.extract_data(corrected);
                let restored = unpack_be(data_value, bch.data_length(), data.len());
                data.copy_from_slice(&restored);
                let restored_parity = unpack_be(corrected & ((1u32 << parity_bits) - 1), parity_bits, parity.len());
                parity.copy_from_slice(&restored_parity);
                errors as usize
            }
            FecFamily::Ldpc { code, max_iterations } => {
                let mut codeword = Vec::with_capacity(data.len() + parity.len());
                codeword.extend_from_slice(data);
                codeword.extend_from_slice(parity);
                let (info, iterations) = code.decode_hard(&codeword, *max_iterations)?;
                data.copy_from_slice(&info);
                self.last_iterations = iterations;
                return Ok(iterations);
            }
        };
        Ok(corrections)
    }
}

/// Packs the `ceil(bits / 8)`-byte, big-endian, zero-padded-high `data` into
/// a `u32`, returning `(value, data.len())`. Used to bridge the front door's
/// byte-buffer convention onto BCH's integer-packed codeword: a `bits`-wide
/// field is the plain big-endian integer of its `ceil(bits / 8)`-byte
/// buffer, e.g. a 5-bit value of 21 is stored as the single byte `21`, not
/// left-shifted into the top of the byte.
fn pack_be(data: &[u8], bits: u16) -> Result<(u32, usize)> {
    let needed = ((bits as usize) + 7) / 8;
    if data.len() < needed {
        return Err(FecError::InvalidArgument(format!(
            "buffer of {} bytes is too short for {bits} bits",
            data.len()
        )));
    }
    let mut value: u32 = 0;
    for &byte in &data[..needed] {
        value = (value << 8) | byte as u32;
    }
    Ok((value, data.len()))
}

/// Inverse of [`pack_be`]: writes `value` as `ceil(bits / 8)` big-endian
/// bytes into an `out_len`-byte buffer.
fn unpack_be(value: u32, bits: u16, out_len: usize) -> Vec<u8> {
    let needed = ((bits as usize) + 7) / 8;
    let mut out = vec![0u8; out_len];
    let bytes = value.to_be_bytes();
    let start = 4 - needed;
    out[..needed].copy_from_slice(&bytes[start..]);
    out
}

// --- FFI: a thin `extern "C"` layer over `Fec`, opaque-pointer style,
// mirroring the teacher's `fec_module_init`/`_encode`/`_decode`/`_cleanup`
// (itself mirroring the original library's `poporon_create`/`poporon_encode_u8`/
// `poporon_decode_u8`/`poporon_destroy`). Kept alongside the safe `Fec` API
// as a compatibility shim, not a replacement for it.

use std::ptr;
use std::slice;

/// Creates a default RS handle (spec.md §6 defaults). Returns null on
/// construction failure.
#[no_mangle]
pub extern "C" fn fec_module_create() -> *mut Fec {
    match Fec::create(FecConfig::Rs(RsConfig::default())) {
        Ok(fec) => Box::into_raw(Box::new(fec)),
        Err(_) => ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn fec_module_destroy(handle: *mut Fec) {
    if handle.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(handle));
    }
}

/// Encodes `data` and returns a heap-allocated parity buffer via
/// `out_len`/return pointer; null on failure. Ownership of the returned
/// buffer passes to the caller, who must free it with
/// [`fec_module_free_buffer`].
#[no_mangle]
pub extern "C" fn fec_module_encode(
    handle: *mut Fec,
    data: *mut u8,
    len: usize,
    out_len: *mut usize,
) -> *mut u8 {
    if handle.is_null() || data.is_null() {
        return ptr::null_mut();
    }
    let fec = unsafe { &mut *handle };
    let slice = unsafe { slice::from_raw_parts_mut(data, len) };
    match fec.encode(slice) {
        Ok(mut parity) => {
            unsafe {
                *out_len = parity.len();
            }
            let ptr = parity.as_mut_ptr();
            std::mem::forget(parity);
            ptr
        }
        Err(_) => ptr::null_mut(),
    }
}

/// Decodes `data`/`parity` in place; returns `true` on success, writing the
/// correction count into `corrected_num`.
#[no_mangle]
pub extern "C" fn fec_module_decode(
    handle: *mut Fec,
    data: *mut u8,
    data_len: usize,
    parity: *mut u8,
    parity_len: usize,
    corrected_num: *mut usize,
) -> bool {
    if handle.is_null() || data.is_null() || parity.is_null() {
        return false;
    }
    let fec = unsafe { &mut *handle };
    let data_slice = unsafe { slice::from_raw_parts_mut(data, data_len) };
    let parity_slice = unsafe { slice::from_raw_parts_mut(parity, parity_len) };
    match fec.decode(data_slice, parity_slice) {
        Ok(corrected) => {
            if !corrected_num.is_null() {
                unsafe {
                    *corrected_num = corrected;
                }
            }
            true
        }
        Err(_) => false,
    }
}

/// Frees a buffer returned by [`fec_module_encode`].
#[no_mangle]
pub extern "C" fn fec_module_free_buffer(ptr: *mut u8, len: usize) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        let _ = Vec::from_raw_parts(ptr, len, len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rs_front_door_round_trip() {
        let mut fec = Fec::create(FecConfig::Rs(RsConfig::default())).unwrap();
        assert_eq!(fec.fec_type(), FecType::Rs);
        let mut data: Vec<u8> = (0..64u16).map(|i| (i * 3 + 1) as u8).collect();
        let mut parity = fec.encode(&mut data).unwrap();
        let original = data.clone();
        data[5] ^= 0xFF;
        let corrected = fec.decode(&mut data, &mut parity).unwrap();
        assert_eq!(corrected, 1);
        assert_eq!(data, original);
    }

    #[test]
    fn bch_front_door_round_trip() {
        let mut fec = Fec::create(FecConfig::Bch(BchConfig::default())).unwrap();
        assert_eq!(fec.fec_type(), FecType::Bch);
        let mut data = vec![21u8];
        let mut parity = fec.encode(&mut data).unwrap();
        let original = data.clone();
        data[0] ^= 0x01;
        let corrected = fec.decode(&mut data, &mut parity).unwrap();
        assert_eq!(corrected, 1);
        assert_eq!(data, original);
    }

    #[test]
    fn ldpc_front_door_round_trip() {
        let mut fec = Fec::create(FecConfig::Ldpc(LdpcFecConfig {
            block_size: 64,
            rate: LdpcRate::OneHalf,
            matrix: LdpcConfig::default(),
            max_iterations: 0,
        }))
        .unwrap();
        assert_eq!(fec.fec_type(), FecType::Ldpc);
        let mut data: Vec<u8> = (0..64u32).map(|i| (17 * i + 23) as u8).collect();
        let mut parity = fec.encode(&mut data).unwrap();
        let original = data.clone();
        parity[0] ^= 0x01;
        let corrected = fec.decode(&mut data, &mut parity).unwrap();
        assert!(corrected > 0);
        assert_eq!(data, original);
    }

    #[test]
    fn ffi_encode_decode_round_trip() {
        let handle = fec_module_create();
        assert!(!handle.is_null());

        let mut data: Vec<u8> = (0..64u16).map(|i| (i * 5) as u8).collect();
        let mut out_len = 0usize;
        let parity_ptr = unsafe {
            fec_module_encode(handle, data.as_mut_ptr(), data.len(), &mut out_len as *mut usize)
        };
        assert!(!parity_ptr.is_null());
        let mut parity = unsafe { Vec::from_raw_parts(parity_ptr, out_len, out_len) };

        data[2] ^= 0xFF;
        let mut corrected = 0usize;
        let ok = unsafe {
            fec_module_decode(
                handle,
                data.as_mut_ptr(),
                data.len(),
                parity.as_mut_ptr(),
                parity.len(),
                &mut corrected as *mut usize,
            )
        };
        assert!(ok);
        assert_eq!(corrected, 1);

        fec_module_destroy(handle);
    }

    #[test]
    fn version_and_buildtime_are_stable() {
        assert_eq!(version_id(), version_id());
        assert_eq!(buildtime(), buildtime());
    }
}
