//! Binary BCH codec over GF(2^m), operating on single integer-packed
//! codewords rather than byte buffers.

use crate::error::{FecError, Result};
use crate::gf::GaloisField;

/// Upper bound on polynomial degree tracked by the BCH-specific
/// Berlekamp-Massey variant and minimal-polynomial builder; large enough for
/// any `t <= 16` over any supported `m`.
const MAX_POLY: usize = 64;
const MAX_T: u8 = 16;

/// A binary BCH code over GF(2^m), correcting up to `t` bit errors in an
/// `n`-bit codeword (`n = 2^m - 1`).
///
/// Unlike the RS codec, this decode pipeline represents zero directly as the
/// integer `0` rather than through a log-domain sentinel: the original
/// library's BCH implementation is a distinct, simpler variant of
/// Berlekamp-Massey that never needs to multiply by a logged zero.
pub struct BchCode {
    gf: GaloisField,
    correction_capability: u8,
    codeword_length: u16,
    data_length: u16,
    parity_bits: u16,
    generator_polynomial: u32,
    generator_degree: i32,
}

impl BchCode {
    pub fn codeword_length(&self) -> u16 {
        self.codeword_length
    }

    pub fn data_length(&self) -> u16 {
        self.data_length
    }

    pub fn correction_capability(&self) -> u8 {
        self.correction_capability
    }

    pub fn gf(&self) -> &GaloisField {
        &self.gf
    }

    /// Builds a BCH code. `symbol_size` must be in `3..=16`, `t` in `1..=16`.
    ///
    /// The generator polynomial is the LCM of the minimal polynomials of
    /// `alpha, alpha^2, ..., alpha^(2t)`: for each exponent not yet covered
    /// by a previous conjugate orbit, its minimal polynomial is built by
    /// accumulating `(x - alpha^conjugate)` over the orbit closed under
    /// repeated doubling mod `field_size`, then multiplied into the running
    /// generator via binary polynomial convolution.
    pub fn new(symbol_size: u8, generator_polynomial: u16, correction_capability: u8) -> Result<Self> {
        if !(3..=16).contains(&symbol_size) {
            return Err(FecError::Construction(format!(
                "symbol_size {symbol_size} out of range [3, 16] for BCH"
            )));
        }
        if correction_capability < 1 || correction_capability > MAX_T {
            return Err(FecError::Construction(format!(
                "correction_capability {correction_capability} out of range [1, {MAX_T}]"
            )));
        }

        let gf = GaloisField::new(symbol_size, generator_polynomial)?;
        let codeword_length = gf.field_size();

        let (gen, gen_deg) = build_generator(&gf, correction_capability);
        let parity_bits = gen_deg as u16;
        if parity_bits >= codeword_length {
            return Err(FecError::Construction(
                "generator degree leaves no room for data bits".into(),
            ));
        }
        let data_length = codeword_length - parity_bits;

        log::debug!(
            "BCH code constructed: m={symbol_size}, t={correction_capability}, n={codeword_length}, k={data_length}"
        );

        Ok(BchCode {
            gf,
            correction_capability,
            codeword_length,
            data_length,
            parity_bits,
            generator_polynomial: gen,
            generator_degree: gen_deg,
        })
    }

    /// Systematically encodes `data` (which must fit in `data_length` bits)
    /// into an `n`-bit codeword: the data occupies the high `k` bits, the
    /// remainder of binary division by the generator occupies the low
    /// `deg(g)` bits.
    pub fn encode(&self, data: u32) -> Result<u32> {
        if self.data_length < 32 && data >= (1u32 << self.data_length) {
            return Err(FecError::InvalidArgument(format!(
                "data {data} does not fit in {} bits",
                self.data_length
            )));
        }

        let shifted = data << self.parity_bits;
        let mut remainder = shifted;
        let gen_deg = self.generator_degree;

        let mut i = self.codeword_length as i32 - 1;
        while i >= gen_deg {
            if remainder & (1u32 << i) != 0 {
                remainder ^= self.generator_polynomial << (i - gen_deg);
            }
            i -= 1;
        }

        Ok(shifted ^ remainder)
    }

    /// Decodes `received`, returning `(corrected_codeword, errors_corrected)`.
    pub fn decode(&self, received: u32) -> Result<(u32, u32)> {
        let mask = if self.codeword_length >= 32 {
            u32::MAX
        } else {
            (1u32 << self.codeword_length) - 1
        };
        let received = received & mask;

        let mut syndromes = vec![0u16; 2 * self.correction_capability as usize];
        if !self.compute_syndromes(received, &mut syndromes) {
            return Ok((received, 0));
        }

        let (error_locator, error_count) = self.berlekamp_massey(&syndromes);
        if error_count > self.correction_capability as i32 {
            log::debug!(
                "BCH decode refused: {error_count} errors exceeds capability {}",
                self.correction_capability
            );
            return Err(FecError::DecodeRefused(
                "error count exceeds correction capability".into(),
            ));
        }

        let positions = self.chien_search(&error_locator, error_count);
        if positions.len() as i32 != error_count {
            log::debug!("BCH decode refused: located error count does not match locator degree");
            return Err(FecError::DecodeRefused(
                "located error count does not match locator degree".into(),
            ));
        }

        let mut corrected = received;
        for &pos in &positions {
            corrected ^= 1u32 << pos;
        }

        if self.compute_syndromes(corrected, &mut syndromes) {
            log::debug!("BCH decode refused: corrected codeword fails syndrome revalidation");
            return Err(FecError::DecodeRefused(
                "corrected codeword fails syndrome revalidation".into(),
            ));
        }

        Ok((corrected, positions.len() as u32))
    }

    pub fn extract_data(&self, codeword: u32) -> u32 {
        if self.data_length >= 32 {
            codeword >> self.parity_bits
        } else {
            (codeword >> self.parity_bits) & ((1u32 << self.data_length) - 1)
        }
    }

    fn compute_syndromes(&self, codeword: u32, syndromes: &mut [u16]) -> bool {
        let field_size = self.gf.field_size() as u32;
        let mut has_nonzero = false;

        for (i, syndrome) in syndromes.iter_mut().enumerate() {
            let mut value = 0u16;
            for j in 0..self.codeword_length as u32 {
                if codeword & (1u32 << j) != 0 {
                    let exp_val = (((i as u32 + 1) * j) % field_size) as u16;
                    value ^= self.gf.exp_of(exp_val);
                }
            }
            *syndrome = value;
            has_nonzero |= value != 0;
        }

        has_nonzero
    }

    fn poly_eval(&self, poly: &[u16], degree: i32, x: u16) -> u16 {
        if x == 0 {
            return poly[0];
        }
        let field_size = self.gf.field_size() as u32;
        let log_x = self.gf.log_of(x) as u32;

        let mut sum = 0u16;
        for i in 0..=degree as usize {
            if poly[i] != 0 {
                let exp_val = ((self.gf.log_of(poly[i]) as u32 + (log_x * i as u32) % field_size) % field_size) as u16;
                sum ^= self.gf.exp_of(exp_val);
            }
        }
        sum
    }

    /// A distinct, array-based Berlekamp-Massey variant (no log-domain
    /// sentinel): returns `(error_locator, error_count)`.
    fn berlekamp_massey(&self, syndromes: &[u16]) -> (Vec<u16>, i32) {
        let field_size = self.gf.field_size() as u32;
        let syndrome_count = syndromes.len() as i32;

        let mut current = vec![0u16; MAX_POLY];
        let mut prev = vec![0u16; MAX_POLY];
        current[0] = 1;
        prev[0] = 1;

        let mut error_count = 0i32;
        let mut shift = 1i32;
        let mut prev_discrepancy = 1u16;

        for iteration in 0..syndrome_count {
            let mut discrepancy = syndromes[iteration as usize];
            for i in 1..=error_count {
                let s_idx = iteration - i;
                if s_idx < 0 {
                    continue;
                }
                if current[i as usize] != 0 && syndromes[s_idx as usize] != 0 {
                    let log_sum = (self.gf.log_of(current[i as usize]) as u32
                        + self.gf.log_of(syndromes[s_idx as usize]) as u32)
                        % field_size;
                    discrepancy ^= self.gf.exp_of(log_sum as u16);
                }
            }

            if discrepancy == 0 {
                shift += 1;
            } else {
                let log_mult = (field_size - self.gf.log_of(prev_discrepancy) as u32
                    + self.gf.log_of(discrepancy) as u32)
                    % field_size;
                let multiplier = self.gf.exp_of(log_mult as u16);

                if 2 * error_count <= iteration {
                    let temp = current.clone();

                    for i in 0..(MAX_POLY as i32 - shift) {
                        let iu = i as usize;
                        if prev[iu] != 0 {
                            let log_product =
                                (self.gf.log_of(prev[iu]) as u32 + self.gf.log_of(multiplier) as u32) % field_size;
                            current[(i + shift) as usize] ^= self.gf.exp_of(log_product as u16);
                        }
                    }

                    prev = temp;
                    error_count = iteration + 1 - error_count;
                    prev_discrepancy = discrepancy;
                    shift = 1;
                } else {
                    for i in 0..(MAX_POLY as i32 - shift) {
                        let iu = i as usize;
                        if prev[iu] != 0 {
                            let log_product =
                                (self.gf.log_of(prev[iu]) as u32 + self.gf.log_of(multiplier) as u32) % field_size;
                            current[(i + shift) as usize] ^= self.gf.exp_of(log_product as u16);
                        }
                    }
                    shift += 1;
                }
            }
        }

        (current, error_count)
    }

    fn chien_search(&self, error_locator: &[u16], error_count: i32) -> Vec<u16> {
        let field_size = self.gf.field_size() as u32;
        let mut found = Vec::new();

        for i in 0..self.codeword_length as u32 {
            let alpha_inv = self.gf.exp_of(((field_size - i) % field_size) as u16);
            if self.poly_eval(error_locator, error_count, alpha_inv) == 0 {
                found.push(i as u16);
                if found.len() as i32 >= error_count {
                    break;
                }
            }
        }

        found
    }
}

fn poly_degree_binary(poly: u32) -> i32 {
    if poly == 0 {
        return -1;
    }
    31 - poly.leading_zeros() as i32
}

fn poly_multiply_binary(a: u32, deg_a: i32, b: u32) -> u32 {
    let mut result = 0u32;
    for i in 0..=deg_a {
        if a & (1u32 << i) != 0 {
            result ^= b << i;
        }
    }
    result
}

fn minimal_polynomial(gf: &GaloisField, exp: i32) -> u32 {
    let field_size = gf.field_size() as i32;
    let mut poly = vec![0u16; MAX_POLY];
    poly[0] = 1;
    let mut poly_deg = 0i32;

    let mut conjugate = exp;
    loop {
        let root = gf.exp_of(conjugate as u16);

        let mut j = poly_deg;
        while j >= 0 {
            let ju = j as usize;
            if ju + 1 < MAX_POLY {
                poly[ju + 1] ^= poly[ju];
            }
            if poly[ju] != 0 && root != 0 {
                let log_prod = (gf.log_of(poly[ju]) as i32 + gf.log_of(root) as i32) % field_size;
                poly[ju] = gf.exp_of(log_prod as u16);
            } else {
                poly[ju] = 0;
            }
            j -= 1;
        }
        poly_deg += 1;

        conjugate = (conjugate * 2) % field_size;
        if conjugate == exp {
            break;
        }
    }

    let mut binary_poly = 0u32;
    for i in 0..=poly_deg {
        if poly[i as usize] == 1 {
            binary_poly |= 1u32 << i;
        }
    }
    binary_poly
}

fn build_generator(gf: &GaloisField, t: u8) -> (u32, i32) {
    let field_size = gf.field_size() as i32;
    let mut used = vec![false; field_size as usize + 1];

    let mut gen = 1u32;
    let mut gen_deg = 0i32;

    for i in 1..=2 * t as i32 {
        let root_exp = i % field_size;
        if used[root_exp as usize] {
            continue;
        }

        let mut conj = root_exp;
        loop {
            used[conj as usize] = true;
            conj = (conj * 2) % field_size;
            if conj == root_exp {
                break;
            }
        }

        let min_poly = minimal_polynomial(gf, root_exp);
        gen = poly_multiply_binary(gen, gen_deg, min_poly);
        gen_deg = poly_degree_binary(gen);
    }

    (gen, gen_deg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_bch() -> BchCode {
        BchCode::new(4, 0x13, 3).unwrap()
    }

    #[test]
    fn round_trip_every_data_value() {
        let bch = default_bch();
        for data in 0..(1u32 << bch.data_length()) {
            let codeword = bch.encode(data).unwrap();
            let (corrected, errors) = bch.decode(codeword).unwrap();
            assert_eq!(corrected, codeword);
            assert_eq!(errors, 0);
            assert_eq!(bch.extract_data(corrected), data);
        }
    }

    #[test]
    fn corrects_every_single_bit_flip() {
        let bch = default_bch();
        let codeword = bch.encode(21).unwrap();
        for bit in 0..bch.codeword_length() {
            let flipped = codeword ^ (1u32 << bit);
            let (corrected, errors) = bch.decode(flipped).unwrap();
            assert_eq!(corrected, codeword);
            assert_eq!(errors, 1);
        }
    }

    #[test]
    fn corrects_every_double_bit_flip() {
        let bch = default_bch();
        let codeword = bch.encode(7).unwrap();
        let n = bch.codeword_length();
        for i in 0..n {
            for j in (i + 1)..n {
                let flipped = codeword ^ (1u32 << i) ^ (1u32 << j);
                let (corrected, errors) = bch.decode(flipped).unwrap();
                assert_eq!(corrected, codeword);
                assert_eq!(errors, 2);
            }
        }
    }

    #[test]
    fn rejects_data_too_large() {
        let bch = default_bch();
        let over = 1u32 << bch.data_length();
        assert!(bch.encode(over).is_err());
    }

    #[test]
    fn construction_rejects_bad_params() {
        assert!(BchCode::new(2, 0x13, 3).is_err());
        assert!(BchCode::new(4, 0x13, 0).is_err());
        assert!(BchCode::new(4, 0x13, 200).is_err());
    }
}
