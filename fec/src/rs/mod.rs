//! Systematic Reed-Solomon codec over GF(2^m).

mod decode;
mod encode;

use crate::error::{FecError, Result};
use crate::gf::GaloisField;

/// Scratch buffers reused across decode calls, mirroring the original
/// library's single allocation of eight parallel arrays of length
/// `num_roots + 1`. Kept as a field of [`RsCode`] rather than allocated per
/// call so repeated decodes on the same code don't reallocate; `decode`
/// therefore takes `&mut self`, which doubles as the enforcement that no two
/// decodes on the same code run concurrently.
#[derive(Clone, Debug)]
struct DecoderWorkspace {
    error_locator: Vec<u16>,
    syndrome: Vec<u16>,
    coefficients: Vec<u16>,
    polynomial: Vec<u16>,
    error_evaluator: Vec<u16>,
    error_roots: Vec<u16>,
    register_coefficients: Vec<u16>,
    error_locations: Vec<u16>,
    primitive_inverse: u16,
}

impl DecoderWorkspace {
    fn new(num_roots: u8) -> Self {
        let len = num_roots as usize + 1;
        DecoderWorkspace {
            error_locator: vec![0; len],
            syndrome: vec![0; len],
            coefficients: vec![0; len],
            polynomial: vec![0; len],
            error_evaluator: vec![0; len],
            error_roots: vec![0; len],
            register_coefficients: vec![0; len],
            error_locations: vec![0; len],
            primitive_inverse: 0,
        }
    }
}

/// A systematic Reed-Solomon code over GF(2^m).
///
/// Holds the generator polynomial in log form (length `num_roots + 1`) and a
/// reusable decoder workspace. `b` (first consecutive root) and `s`
/// (primitive element) follow the naming used throughout the decode
/// pipeline's literature: the generator's roots are `alpha^(b*s),
/// alpha^((b+1)*s), ..., alpha^((b+r-1)*s)`.
pub struct RsCode {
    gf: GaloisField,
    first_consecutive_root: u16,
    primitive_element: u16,
    num_roots: u8,
    generator_polynomial: Vec<u16>,
    workspace: DecoderWorkspace,
}

impl RsCode {
    pub fn gf(&self) -> &GaloisField {
        &self.gf
    }

    pub fn num_roots(&self) -> u8 {
        self.num_roots
    }

    pub fn first_consecutive_root(&self) -> u16 {
        self.first_consecutive_root
    }

    pub fn primitive_element(&self) -> u16 {
        self.primitive_element
    }

    /// Maximum information length for this code: `field_size - num_roots`.
    pub fn max_info_len(&self) -> usize {
        self.gf.field_size() as usize - self.num_roots as usize
    }

    /// Builds an RS code over GF(2^`symbol_size`) with the given generator
    /// polynomial, first consecutive root `b`, primitive element `s`, and
    /// parity symbol count `r`.
    ///
    /// The generator polynomial is built coefficient-by-coefficient in value
    /// form by successive multiplication with `(x - alpha^(b*s + i*s))`, then
    /// converted to log form; `primitive_inverse` is found by scanning
    /// `primitive_inverse = 1, 1 + field_size, ...` for the first value
    /// congruent to `0 mod primitive_element`, giving up after
    /// `2 * field_size` steps.
    pub fn new(
        symbol_size: u8,
        field_generator_polynomial: u16,
        first_consecutive_root: u16,
        primitive_element: u16,
        num_roots: u8,
    ) -> Result<Self> {
        let gf = GaloisField::new(symbol_size, field_generator_polynomial)?;

        if primitive_element == 0 {
            return Err(FecError::Construction(
                "primitive_element must be non-zero".into(),
            ));
        }
        if num_roots == 0 {
            return Err(FecError::Construction("num_roots must be non-zero".into()));
        }
        if num_roots as u16 >= gf.field_size() {
            return Err(FecError::Construction(format!(
                "num_roots {num_roots} must be less than field_size {}",
                gf.field_size()
            )));
        }

        let r = num_roots as usize;
        // Builds the generator polynomial in value form by successively
        // multiplying in `(x - alpha^generator_root)` for each root, walking
        // `j` from high to low so `poly[j - 1]` is still last iteration's
        // value when `poly[j]` is updated.
        let mut poly = vec![0u16; r + 1];
        poly[0] = 1;
        let mut generator_root = first_consecutive_root.wrapping_mul(primitive_element);
        for i in 0..r {
            poly[i + 1] = 1;
            let mut j = i as isize;
            while j > 0 {
                let ju = j as usize;
                if poly[ju] != 0 {
                    let log_term = gf.log_of(poly[ju]);
                    poly[ju] = poly[ju - 1]
                        ^ gf.exp_of(gf.modulo(log_term as u32 + generator_root as u32));
                } else {
                    poly[ju] = poly[ju - 1];
                }
                j -= 1;
            }
            poly[0] = gf.exp_of(gf.modulo(gf.log_of(poly[0]) as u32 + generator_root as u32));

            generator_root = generator_root.wrapping_add(primitive_element);
        }

        let generator_polynomial: Vec<u16> = poly.iter().map(|&v| gf.log_of(v)).collect();

        let field_size = gf.field_size();
        let mut primitive_inverse: u32 = 1;
        let mut iterations: u32 = 0;
        loop {
            if primitive_inverse % primitive_element as u32 == 0 {
                break;
            }
            iterations += 1;
            if iterations > field_size as u32 * 2 {
                return Err(FecError::Construction(
                    "primitive_element has no inverse modulo field_size".into(),
                ));
            }
            primitive_inverse += field_size as u32;
        }

        let mut workspace = DecoderWorkspace::new(num_roots);
        workspace.primitive_inverse = (primitive_inverse / primitive_element as u32) as u16;

        log::debug!(
            "RS code constructed: m={symbol_size}, b={first_consecutive_root}, s={primitive_element}, r={num_roots}"
        );

        Ok(RsCode {
            gf,
            first_consecutive_root,
            primitive_element,
            num_roots,
            generator_polynomial,
            workspace,
        })
    }
}
