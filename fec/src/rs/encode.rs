use super::RsCode;
use crate::error::{FecError, Result};

impl RsCode {
    /// Systematically encodes `data` into a parity block of length
    /// `num_roots`, producing the codeword `data ++ parity` when
    /// concatenated by the caller.
    ///
    /// This is polynomial long division by the generator: each information
    /// symbol is folded into the running remainder (`parity`), which is then
    /// shifted and the new feedback term written into the vacated slot.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Err(FecError::InvalidArgument("data must be non-empty".into()));
        }
        if data.len() > self.max_info_len() {
            return Err(FecError::InvalidArgument(format!(
                "data length {} exceeds maximum information length {}",
                data.len(),
                self.max_info_len()
            )));
        }

        let r = self.num_roots as usize;
        let mut parity = vec![0u8; r];
        let field_size = self.gf.field_size();
        let sentinel = self.gf.sentinel();

        for &byte in data {
            let masked = (byte as u16) & field_size;
            let fb = self.gf.log_of(masked ^ parity[0] as u16);

            if fb != sentinel {
                for j in 1..r {
                    let term = self
                        .gf
                        .modulo(fb as u32 + self.generator_polynomial[r - j] as u32);
                    parity[j] ^= self.gf.exp_of(term) as u8;
                }
            }

            parity.copy_within(1..r, 0);

            if fb != sentinel {
                let term = self
                    .gf
                    .modulo(fb as u32 + self.generator_polynomial[0] as u32);
                parity[r - 1] = self.gf.exp_of(term) as u8;
            } else {
                parity[r - 1] = 0;
            }
        }

        Ok(parity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_rs() -> RsCode {
        RsCode::new(8, 0x11D, 1, 1, 32).unwrap()
    }

    #[test]
    fn encode_produces_parity_of_expected_length() {
        let rs = default_rs();
        let data = vec![0x42u8; 64];
        let parity = rs.encode(&data).unwrap();
        assert_eq!(parity.len(), 32);
    }

    #[test]
    fn encode_rejects_oversized_data() {
        let rs = default_rs();
        let data = vec![0u8; rs.max_info_len() + 1];
        assert!(rs.encode(&data).is_err());
    }

    #[test]
    fn encode_rejects_empty_data() {
        let rs = default_rs();
        assert!(rs.encode(&[]).is_err());
    }
}
