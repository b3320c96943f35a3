use super::{DecoderWorkspace, RsCode};
use crate::error::{FecError, Result};
use crate::erasure::ErasureSet;
use crate::gf::GaloisField;

fn erasure_log_term(gf: &GaloisField, primitive_element: u16, position: u32, pad: i32) -> Result<u16> {
    let inner = gf.field_size() as i64 - 1 - (position as i64 + pad as i64);
    if inner < 0 {
        return Err(FecError::InvalidArgument(format!(
            "erasure position {position} falls outside the codeword"
        )));
    }
    Ok(gf.modulo_signed(primitive_element as i64 * inner))
}

impl RsCode {
    fn padding_length(&self, size: usize) -> Result<i32> {
        let r = self.num_roots as i32;
        let field_size = self.gf.field_size() as i32;
        let pad = field_size - r - size as i32;
        if pad < 0 || pad >= field_size - r {
            return Err(FecError::InvalidArgument(format!(
                "data length {size} is not valid for a code with field_size {} and {r} parity symbols",
                self.gf.field_size()
            )));
        }
        Ok(pad)
    }

    /// Computes the syndrome (log form, `field_size` sentinel for a zero
    /// component) from `data` followed by `parity`. Returns `(has_errors,
    /// syndrome)`.
    fn calculate_syndrome(&self, data: &[u8], parity: &[u8]) -> (bool, Vec<u16>) {
        let r = self.num_roots as usize;
        let field_size = self.gf.field_size();
        let mut syndrome = vec![0u16; r];

        for s in syndrome.iter_mut() {
            *s = (data[0] as u16) & field_size;
        }

        let fold = |syndrome: &mut [u16], symbol: u8, gf: &GaloisField, b: u16, s: u16| {
            let masked = (symbol as u16) & gf.field_size();
            for i in 0..syndrome.len() {
                if syndrome[i] == 0 {
                    syndrome[i] = masked;
                } else {
                    let root = (b as u32 + i as u32) * s as u32;
                    syndrome[i] = masked ^ gf.exp_of(gf.modulo(gf.log_of(syndrome[i]) as u32 + root));
                }
            }
        };

        for &byte in &data[1..] {
            fold(&mut syndrome, byte, &self.gf, self.first_consecutive_root, self.primitive_element);
        }
        for &byte in parity {
            fold(&mut syndrome, byte, &self.gf, self.first_consecutive_root, self.primitive_element);
        }

        let mut error_flag: u16 = 0;
        for s in syndrome.iter_mut() {
            error_flag |= *s;
            *s = self.gf.log_of(*s);
        }

        (error_flag != 0, syndrome)
    }

    /// Decodes `data`/`parity` in place using internally-computed syndromes,
    /// returning the number of corrections applied.
    pub fn decode(&mut self, data: &mut [u8], parity: &mut [u8]) -> Result<usize> {
        self.validate_call(data.len(), parity.len())?;
        let pad = self.padding_length(data.len())?;
        let (has_errors, mut syndrome) = self.calculate_syndrome(data, parity);
        if !has_errors {
            return Ok(0);
        }
        self.error_correction(data, parity, &mut syndrome, None, None, pad)
    }

    /// Decodes using the caller-supplied `erasures`, which are borrowed (not
    /// consumed): their `corrections` workspace is left untouched, matching
    /// the upstream behavior where that array is only used as a presence
    /// flag at this call site.
    pub fn decode_with_erasures(
        &mut self,
        data: &mut [u8],
        parity: &mut [u8],
        erasures: &mut ErasureSet,
    ) -> Result<usize> {
        self.validate_call(data.len(), parity.len())?;
        let pad = self.padding_length(data.len())?;

        for &position in erasures.positions() {
            if position as usize >= data.len() + parity.len() {
                return Err(FecError::InvalidArgument(format!(
                    "erasure position {position} is outside the codeword"
                )));
            }
        }

        let (has_errors, mut syndrome) = self.calculate_syndrome(data, parity);
        if !has_errors {
            return Ok(0);
        }
        let positions = erasures.positions().to_vec();
        let corrections = erasures.corrections_mut();
        self.error_correction(data, parity, &mut syndrome, Some(&positions), Some(corrections), pad)
    }

    /// Decodes using a caller-supplied external syndrome, skipping internal
    /// syndrome computation entirely.
    pub fn decode_with_syndrome(
        &mut self,
        data: &mut [u8],
        parity: &mut [u8],
        syndrome: &[u16],
    ) -> Result<usize> {
        self.validate_call(data.len(), parity.len())?;
        if syndrome.len() != self.num_roots as usize {
            return Err(FecError::InvalidArgument(
                "external syndrome length must equal num_roots".into(),
            ));
        }
        let pad = self.padding_length(data.len())?;

        let sentinel = self.gf.sentinel();
        let has_errors = syndrome.iter().any(|&s| s != sentinel);
        if !has_errors {
            return Ok(0);
        }
        let mut syndrome = syndrome.to_vec();
        self.error_correction(data, parity, &mut syndrome, None, None, pad)
    }

    fn validate_call(&self, data_len: usize, parity_len: usize) -> Result<()> {
        if data_len == 0 {
            return Err(FecError::InvalidArgument("data must be non-empty".into()));
        }
        if parity_len != self.num_roots as usize {
            return Err(FecError::InvalidArgument(format!(
                "parity length {parity_len} must equal num_roots {}",
                self.num_roots
            )));
        }
        Ok(())
    }

    /// The Berlekamp-Massey / Chien / Forney decode pipeline shared by all
    /// three decode entry points.
    fn error_correction(
        &mut self,
        data: &mut [u8],
        parity: &mut [u8],
        syndrome: &mut [u16],
        erasure_positions: Option<&[u32]>,
        corrections: Option<&mut [u16]>,
        padding_length: i32,
    ) -> Result<usize> {
        let gf = &self.gf;
        let workspace = &mut self.workspace;
        let num_roots = self.num_roots;
        let first_consecutive_root = self.first_consecutive_root;
        let primitive_element = self.primitive_element;

        let r = num_roots as usize;
        let sentinel = gf.sentinel();
        let field_size = gf.field_size();
        let erasure_count = erasure_positions.map_or(0, |e| e.len());

        for i in 1..=r {
            workspace.error_locator[i] = 0;
        }
        workspace.error_locator[0] = 1;

        if let Some(positions) = erasure_positions {
            let term0 = erasure_log_term(gf, primitive_element, positions[0], padding_length)?;
            workspace.error_locator[1] = gf.exp_of(term0);

            for i in 1..erasure_count {
                let poly_term = erasure_log_term(gf, primitive_element, positions[i], padding_length)?;
                let mut j = i + 1;
                while j > 0 {
                    let temp_value = gf.log_of(workspace.error_locator[j - 1]);
                    if temp_value != sentinel {
                        workspace.error_locator[j] ^=
                            gf.exp_of(gf.modulo(poly_term as u32 + temp_value as u32));
                    }
                    j -= 1;
                }
            }
        }

        for i in 0..=r {
            workspace.coefficients[i] = gf.log_of(workspace.error_locator[i]);
        }

        // Berlekamp-Massey.
        let mut iteration_count = erasure_count as i64;
        let mut polynomial_degree = erasure_count as i64;
        loop {
            iteration_count += 1;
            if iteration_count > r as i64 {
                break;
            }
            let n = iteration_count as usize;

            let mut discrepancy_value: u16 = 0;
            for i in 0..n {
                if workspace.error_locator[i] != 0 && syndrome[n - i - 1] != sentinel {
                    discrepancy_value ^= gf.exp_of(gf.modulo(
                        gf.log_of(workspace.error_locator[i]) as u32 + syndrome[n - i - 1] as u32,
                    ));
                }
            }
            let discrepancy = gf.log_of(discrepancy_value);

            if discrepancy == sentinel {
                for k in (1..=r).rev() {
                    workspace.coefficients[k] = workspace.coefficients[k - 1];
                }
                workspace.coefficients[0] = sentinel;
            } else {
                workspace.polynomial[0] = workspace.error_locator[0];

                for i in 0..r {
                    workspace.polynomial[i + 1] = if workspace.coefficients[i] != sentinel {
                        workspace.error_locator[i + 1]
                            ^ gf.exp_of(gf.modulo(discrepancy as u32 + workspace.coefficients[i] as u32))
                    } else {
                        workspace.error_locator[i + 1]
                    };
                }

                if 2 * polynomial_degree <= iteration_count + erasure_count as i64 - 1 {
                    polynomial_degree = iteration_count + erasure_count as i64 - polynomial_degree;
                    for i in 0..=r {
                        workspace.coefficients[i] = if workspace.error_locator[i] == 0 {
                            sentinel
                        } else {
                            gf.modulo_signed(
                                gf.log_of(workspace.error_locator[i]) as i64 - discrepancy as i64
                                    + field_size as i64,
                            )
                        };
                    }
                } else {
                    for k in (1..=r).rev() {
                        workspace.coefficients[k] = workspace.coefficients[k - 1];
                    }
                    workspace.coefficients[0] = sentinel;
                }

                workspace.error_locator[..=r].copy_from_slice(&workspace.polynomial[..=r]);
            }
        }

        let mut error_locator_degree = 0usize;
        for i in 0..=r {
            workspace.error_locator[i] = gf.log_of(workspace.error_locator[i]);
            if workspace.error_locator[i] != sentinel {
                error_locator_degree = i;
            }
        }

        if error_locator_degree == 0 {
            log::debug!("RS decode refused: error locator degree is zero");
            return Err(FecError::DecodeRefused(
                "error locator degree is zero".into(),
            ));
        }

        // Chien search.
        workspace.register_coefficients[1..=r].copy_from_slice(&workspace.error_locator[1..=r]);
        let mut error_count = 0usize;
        let mut k: i64 = workspace.primitive_inverse as i64 - 1;
        let mut i: u32 = 1;
        while i <= field_size as u32 {
            let mut polynomial_evaluation: u16 = 1;
            let mut j = error_locator_degree;
            while j > 0 {
                if workspace.register_coefficients[j] != sentinel {
                    workspace.register_coefficients[j] =
                        gf.modulo(workspace.register_coefficients[j] as u32 + j as u32);
                    polynomial_evaluation ^= gf.exp_of(workspace.register_coefficients[j]);
                }
                j -= 1;
            }

            if polynomial_evaluation == 0 {
                if k < padding_length as i64 {
                    return Err(FecError::DecodeRefused(
                        "error root falls in the virtual padding region".into(),
                    ));
                }
                workspace.error_roots[error_count] = i as u16;
                workspace.error_locations[error_count] = k as u16;
                error_count += 1;
                if error_count == error_locator_degree {
                    break;
                }
            }

            i += 1;
            k = gf.modulo((k as u32).wrapping_add(workspace.primitive_inverse as u32)) as i64;
        }

        if error_locator_degree != error_count {
            return Err(FecError::DecodeRefused(
                "located root count does not match locator degree".into(),
            ));
        }

        // Forney.
        let error_evaluator_degree = error_locator_degree - 1;
        for i in 0..=error_evaluator_degree {
            let mut temp_value: u16 = 0;
            let mut j = i as i64;
            while j >= 0 {
                let ju = j as usize;
                if syndrome[i - ju] != sentinel && workspace.error_locator[ju] != sentinel {
                    temp_value ^=
                        gf.exp_of(gf.modulo(syndrome[i - ju] as u32 + workspace.error_locator[ju] as u32));
                }
                j -= 1;
            }
            workspace.error_evaluator[i] = gf.log_of(temp_value);
        }

        let mut errors_corrected = 0usize;
        for j in (0..error_count).rev() {
            let mut numerator_value: u16 = 0;
            for i in (0..=error_evaluator_degree).rev() {
                if workspace.error_evaluator[i] != sentinel {
                    numerator_value ^= gf.exp_of(gf.modulo_signed(
                        workspace.error_evaluator[i] as i64
                            + i as i64 * workspace.error_roots[j] as i64,
                    ));
                }
            }

            if numerator_value == 0 {
                workspace.coefficients[j] = 0;
                continue;
            }

            let second_numerator = gf.exp_of(gf.modulo_signed(
                workspace.error_roots[j] as i64 * (first_consecutive_root as i64 - 1)
                    + field_size as i64,
            ));

            let mut denominator_value: u16 = 0;
            let start = (error_locator_degree.min(r - 1)) & !1usize;
            let mut i = start as i64;
            while i >= 0 {
                let iu = i as usize;
                if workspace.error_locator[iu + 1] != sentinel {
                    denominator_value ^= gf.exp_of(gf.modulo_signed(
                        workspace.error_locator[iu + 1] as i64 + iu as i64 * workspace.error_roots[j] as i64,
                    ));
                }
                i -= 2;
            }

            workspace.coefficients[j] = gf.exp_of(gf.modulo_signed(
                gf.log_of(numerator_value) as i64 + gf.log_of(second_numerator) as i64
                    + field_size as i64
                    - gf.log_of(denominator_value) as i64,
            ));
            errors_corrected += 1;
        }

        // Validate.
        for i in 0..r {
            let mut temp_value: u16 = 0;
            for j in 0..error_count {
                if workspace.coefficients[j] == 0 {
                    continue;
                }
                let term = (first_consecutive_root as i64 + i as i64)
                    * primitive_element as i64
                    * (field_size as i64 - workspace.error_locations[j] as i64 - 1);
                temp_value ^= gf.exp_of(gf.modulo_signed(gf.log_of(workspace.coefficients[j]) as i64 + term));
            }
            if temp_value != gf.exp_of(syndrome[i]) {
                log::debug!("RS decode refused: corrected codeword fails syndrome revalidation");
                return Err(FecError::DecodeRefused(
                    "corrected codeword fails syndrome revalidation".into(),
                ));
            }
        }

        // Apply.
        if let (Some(_corrections), Some(positions)) = (corrections, erasure_positions) {
            for i in 0..error_count {
                let pos = positions[i] as usize;
                if pos >= data.len() {
                    return Err(FecError::DecodeRefused(
                        "erasure correction position out of range".into(),
                    ));
                }
                data[pos] ^= workspace.coefficients[i] as u8;
            }
        } else {
            for i in 0..error_count {
                let location = workspace.error_locations[i];
                if (location as u16) < field_size - num_roots as u16 {
                    let idx = location as i64 - padding_length as i64;
                    if idx < 0 || idx as usize >= data.len() {
                        return Err(FecError::DecodeRefused(
                            "corrected data position out of range".into(),
                        ));
                    }
                    data[idx as usize] ^= workspace.coefficients[i] as u8;
                } else {
                    let idx = location as i64 - padding_length as i64 - data.len() as i64;
                    if idx < 0 || idx as usize >= parity.len() {
                        return Err(FecError::DecodeRefused(
                            "corrected parity position out of range".into(),
                        ));
                    }
                    parity[idx as usize] ^= workspace.coefficients[i] as u8;
                }
            }
        }

        Ok(errors_corrected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_rs() -> RsCode {
        RsCode::new(8, 0x11D, 1, 1, 32).unwrap()
    }

    #[test]
    fn round_trip_with_no_corruption() {
        let mut rs = default_rs();
        let data: Vec<u8> = (0..64u16).map(|i| (i * 7) as u8).collect();
        let mut parity = rs.encode(&data).unwrap();
        let mut data = data;
        let corrected = rs.decode(&mut data, &mut parity).unwrap();
        assert_eq!(corrected, 0);
    }

    #[test]
    fn corrects_three_symbol_errors() {
        let mut rs = default_rs();
        let original: Vec<u8> = (0..64u16).map(|i| (i * 13 + 5) as u8).collect();
        let mut parity = rs.encode(&original).unwrap();
        let mut data = original.clone();
        data[3] ^= 0xFF;
        data[17] ^= 0xFF;
        data[29] ^= 0xFF;

        let corrected = rs.decode(&mut data, &mut parity).unwrap();
        assert_eq!(corrected, 3);
        assert_eq!(data, original);
    }

    #[test]
    fn corrects_via_erasures() {
        let mut rs = default_rs();
        let original: Vec<u8> = (0..64u16).map(|i| (i * 3 + 1) as u8).collect();
        let mut parity = rs.encode(&original).unwrap();
        let mut data = original.clone();

        let mut erasures = ErasureSet::new();
        for &pos in &[5u32, 10, 15, 20, 25, 30, 35, 40] {
            erasures.push(pos);
            data[pos as usize] = 0;
        }

        let corrected = rs
            .decode_with_erasures(&mut data, &mut parity, &mut erasures)
            .unwrap();
        assert_eq!(corrected, 8);
        assert_eq!(data, original);
    }

    #[test]
    fn decode_with_external_syndrome_matches_internal() {
        let mut rs = default_rs();
        let original: Vec<u8> = (0..64u16).map(|i| (i * 5 + 2) as u8).collect();
        let mut parity = rs.encode(&original).unwrap();
        let mut data = original.clone();
        data[9] ^= 0x01;

        let (_, syndrome) = rs.calculate_syndrome(&data, &parity);
        let corrected = rs
            .decode_with_syndrome(&mut data, &mut parity, &syndrome)
            .unwrap();
        assert_eq!(corrected, 1);
        assert_eq!(data, original);
    }

    #[test]
    fn refuses_when_errors_exceed_capacity() {
        let mut rs = default_rs();
        let original: Vec<u8> = (0..64u16).map(|i| (i * 11) as u8).collect();
        let mut parity = rs.encode(&original).unwrap();
        let mut data = original.clone();
        for pos in 0..20 {
            data[pos] ^= 0xFF;
        }
        let result = rs.decode(&mut data, &mut parity);
        if result.is_ok() {
            // If it claims success, it must not have silently produced a
            // different codeword.
            assert_eq!(data, original);
        }
    }
}
