//! GF(2^m) arithmetic tables shared by the RS and BCH codecs.

use crate::error::{FecError, Result};

/// A Galois field GF(2^m), represented by its log/exp tables.
///
/// `log_of[x]` gives the exponent `i` such that `alpha^i == x`; `exp_of[i]`
/// gives `alpha^i`. Both tables have length `field_size + 1`; the extra slot
/// is the sentinel used to represent "the log of zero" so that callers can
/// look up `exp_of[log_of[a] + log_of[b] mod field_size]` without branching
/// on whether `a` or `b` is zero — `log_of[0] == field_size` and
/// `exp_of[field_size] == 0` make the short-circuit fall out of the table
/// lookup itself.
#[derive(Clone, Debug)]
pub struct GaloisField {
    symbol_size: u8,
    field_size: u16,
    generator_polynomial: u16,
    log_of: Vec<u16>,
    exp_of: Vec<u16>,
}

impl GaloisField {
    /// Sentinel representing "log of zero" / "−infinity".
    pub const fn sentinel(&self) -> u16 {
        self.field_size
    }

    pub fn symbol_size(&self) -> u8 {
        self.symbol_size
    }

    pub fn field_size(&self) -> u16 {
        self.field_size
    }

    pub fn generator_polynomial(&self) -> u16 {
        self.generator_polynomial
    }

    pub fn log_of(&self, x: u16) -> u16 {
        self.log_of[x as usize]
    }

    pub fn exp_of(&self, i: u16) -> u16 {
        self.exp_of[i as usize]
    }

    /// Reduces `value` modulo `field_size` using the field's characteristic
    /// folding trick rather than a division: `while value >= field_size,
    /// value = (value - field_size); value = (value >> m) + (value & field_size)`.
    pub fn modulo(&self, mut value: u32) -> u16 {
        let field_size = self.field_size as u32;
        while value >= field_size {
            value -= field_size;
            value = (value >> self.symbol_size) + (value & field_size);
        }
        value as u16
    }

    /// Like [`modulo`](Self::modulo), but accepts a signed value, wrapping
    /// negative inputs into `[0, field_size)` first. Several decode-side log
    /// arithmetic expressions (Forney's denominator term, syndrome
    /// revalidation) subtract logs and can go negative before reduction.
    pub fn modulo_signed(&self, value: i64) -> u16 {
        let m = self.field_size as i64;
        let mut v = value % m;
        if v < 0 {
            v += m;
        }
        self.modulo(v as u32)
    }

    /// Field multiplication `a * b` via the log/exp tables.
    pub fn mul(&self, a: u16, b: u16) -> u16 {
        if a == 0 || b == 0 {
            return 0;
        }
        let sum = self.modulo(self.log_of(a) as u32 + self.log_of(b) as u32);
        self.exp_of(sum)
    }

    /// Constructs GF(2^m) from a symbol size `m` (1..=16) and a primitive
    /// polynomial. Fails if the polynomial is not primitive: iterating
    /// `x <- x * alpha mod p` for `field_size` steps from 1 must return to 1.
    pub fn new(symbol_size: u8, generator_polynomial: u16) -> Result<Self> {
        if !(1..=16).contains(&symbol_size) {
            return Err(FecError::Construction(format!(
                "symbol_size {symbol_size} out of range [1, 16]"
            )));
        }

        let field_size: u16 = (1u32 << symbol_size) as u16 - 1;
        let mut log_of = vec![0u16; field_size as usize + 1];
        let mut exp_of = vec![0u16; field_size as usize + 1];

        log_of[0] = field_size;
        exp_of[field_size as usize] = 0;

        let mut element: u32 = 1;
        let mut i: u16 = 0;
        while i < field_size {
            log_of[element as usize] = i;
            exp_of[i as usize] = element as u16;

            element <<= 1;
            if element & (1 << symbol_size) != 0 {
                element ^= generator_polynomial as u32;
            }
            element &= field_size as u32;

            i += 1;
        }

        if element != 1 {
            log::debug!(
                "GF(2^{symbol_size}) construction failed: 0x{generator_polynomial:X} is not primitive"
            );
            return Err(FecError::Construction(format!(
                "polynomial 0x{generator_polynomial:X} is not primitive for symbol_size {symbol_size}"
            )));
        }

        Ok(GaloisField {
            symbol_size,
            field_size,
            generator_polynomial,
            log_of,
            exp_of,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gf256_roundtrips_log_exp() {
        let gf = GaloisField::new(8, 0x11D).unwrap();
        assert_eq!(gf.exp_of(gf.field_size()), 0);
        for i in 0..gf.field_size() {
            let v = gf.exp_of(i);
            assert_eq!(gf.log_of(v), i);
        }
    }

    #[test]
    fn gf16_roundtrips_for_bch_default() {
        let gf = GaloisField::new(4, 0x13).unwrap();
        assert_eq!(gf.field_size(), 15);
        for i in 0..gf.field_size() {
            assert_eq!(gf.log_of(gf.exp_of(i)), i);
        }
    }

    #[test]
    fn non_primitive_polynomial_fails() {
        // 0x11 (x^8 + 1) is reducible, not primitive, over GF(2^8).
        assert!(GaloisField::new(8, 0x11).is_err());
    }

    #[test]
    fn mul_matches_repeated_addition_of_logs() {
        let gf = GaloisField::new(8, 0x11D).unwrap();
        assert_eq!(gf.mul(0, 5), 0);
        assert_eq!(gf.mul(5, 0), 0);
        let a = gf.exp_of(10);
        let b = gf.exp_of(20);
        assert_eq!(gf.mul(a, b), gf.exp_of(30));
    }

    #[test]
    fn symbol_size_out_of_range_rejected() {
        assert!(GaloisField::new(0, 0x11D).is_err());
        assert!(GaloisField::new(17, 0x11D).is_err());
    }
}
