//! Normalized min-sum belief-propagation engine: message initialization,
//! check-node and variable-node updates, hard decision, and the standalone
//! parity-check predicate.
//!
//! Free functions over borrowed matrix/message state (rather than methods on
//! [`super::LdpcCode`]) so the caller can destructure `&mut self` into
//! disjoint borrows the way [`crate::rs`]'s decoder workspace does.

use super::matrix::{ColumnView, SparseMatrix};
use super::{get_bit, set_bit};

pub(crate) const LLR_MAX: i16 = 32000;
pub(crate) const LLR_MIN: i16 = -32000;
pub(crate) const LLR_INFINITY: i16 = 30000;
const LLR_SCALE_FACTOR: i32 = 256;
const MINSUM_ALPHA_NUMERATOR: i32 = 15;
const MINSUM_ALPHA_DENOMINATOR: i32 = 16;

pub(crate) fn saturate(value: i32) -> i16 {
    value.clamp(LLR_MIN as i32, LLR_MAX as i32) as i16
}

/// Evaluates every check row against `codeword`; `true` iff all parities are
/// satisfied.
pub(crate) fn check_syndrome(matrix: &SparseMatrix, codeword: &[u8]) -> bool {
    for i in 0..matrix.num_checks as usize {
        let mut bit = 0u8;
        for j in matrix.row_ptr[i]..matrix.row_ptr[i + 1] {
            bit ^= get_bit(codeword, matrix.col_idx[j as usize] as usize);
        }
        if bit != 0 {
            return false;
        }
    }
    true
}

/// Seeds `llr_total`/`var_to_check` from a hard-decision codeword: each bit
/// becomes `+LLR_INFINITY` (bit 0) or `-LLR_INFINITY` (bit 1).
pub(crate) fn initialize_messages_hard(
    matrix: &SparseMatrix,
    cols: &ColumnView,
    codeword: &[u8],
    llr_total: &mut [i16],
    var_to_check: &mut [i16],
    check_to_var: &mut [i16],
) {
    for i in 0..matrix.num_bits as usize {
        llr_total[i] = if get_bit(codeword, i) != 0 {
            -LLR_INFINITY
        } else {
            LLR_INFINITY
        };
    }
    scatter_channel_llr(cols, llr_total, var_to_check);
    check_to_var.fill(0);
}

/// Seeds `llr_total`/`var_to_check` from soft per-bit channel LLRs (`i8`,
/// scaled by 256 and saturated).
pub(crate) fn initialize_messages_soft(
    cols: &ColumnView,
    channel_llr: &[i8],
    llr_total: &mut [i16],
    var_to_check: &mut [i16],
    check_to_var: &mut [i16],
) {
    for (i, &llr) in channel_llr.iter().enumerate() {
        llr_total[i] = saturate(llr as i32 * LLR_SCALE_FACTOR);
    }
    scatter_channel_llr(cols, llr_total, var_to_check);
    check_to_var.fill(0);
}

fn scatter_channel_llr(cols: &ColumnView, llr_total: &[i16], var_to_check: &mut [i16]) {
    for i in 0..llr_total.len() {
        for j in cols.col_ptr[i]..cols.col_ptr[i + 1] {
            var_to_check[cols.edge_idx[j as usize] as usize] = llr_total[i];
        }
    }
}

/// For each check row: track the product of incoming signs and the two
/// smallest magnitudes `min1 < min2` (and which edge holds `min1`). The
/// outgoing message on that edge uses `min2`; every other edge uses `min1`.
/// Both are scaled by the normalized min-sum factor `15/16`.
pub(crate) fn check_node_update(
    matrix: &SparseMatrix,
    var_to_check: &[i16],
    check_to_var: &mut [i16],
) {
    for i in 0..matrix.num_checks as usize {
        let start = matrix.row_ptr[i] as usize;
        let end = matrix.row_ptr[i + 1] as usize;

        let mut sign: i16 = 1;
        let mut min1: i16 = LLR_MAX;
        let mut min2: i16 = LLR_MAX;
        let mut min1_idx = start;

        for j in start..end {
            let msg = var_to_check[j];
            let abs_msg = if msg < 0 {
                sign = -sign;
                -msg
            } else {
                msg
            };

            if abs_msg < min1 {
                min2 = min1;
                min1 = abs_msg;
                min1_idx = j;
            } else if abs_msg < min2 {
                min2 = abs_msg;
            }
        }

        for j in start..end {
            let msg = var_to_check[j];
            let magnitude = if j == min1_idx { min2 } else { min1 };
            let scaled = (magnitude as i32 * MINSUM_ALPHA_NUMERATOR / MINSUM_ALPHA_DENOMINATOR) as i16;
            let edge_sign = if msg < 0 { -sign } else { sign };
            check_to_var[j] = edge_sign * scaled;
        }
    }
}

/// For each bit `v`: sum the channel LLR and every incident `check_to_var`
/// message into `llr_total[v]`; each outgoing `var_to_check` is `llr_total[v]
/// - check_to_var[edge]`. `channel_llr` is `None` for hard decoding (the
/// channel contribution was already folded into `llr_total` at init and is
/// re-read from there), `Some` for soft decoding.
pub(crate) fn variable_node_update(
    cols: &ColumnView,
    channel_llr: Option<&[i8]>,
    llr_total: &mut [i16],
    var_to_check: &mut [i16],
    check_to_var: &[i16],
) {
    for i in 0..llr_total.len() {
        let channel = match channel_llr {
            Some(llr) => saturate(llr[i] as i32 * LLR_SCALE_FACTOR) as i32,
            None => llr_total[i] as i32,
        };

        let mut sum = channel;
        for j in cols.col_ptr[i]..cols.col_ptr[i + 1] {
            sum += check_to_var[cols.edge_idx[j as usize] as usize] as i32;
        }
        llr_total[i] = saturate(sum);

        for j in cols.col_ptr[i]..cols.col_ptr[i + 1] {
            let edge = cols.edge_idx[j as usize] as usize;
            var_to_check[edge] = saturate(sum - check_to_var[edge] as i32);
        }
    }
}

/// Thresholds `llr_total` at zero into a packed-bit codeword: negative LLR
/// (bit more likely 1) sets the bit.
pub(crate) fn make_hard_decision(llr_total: &[i16], codeword: &mut [u8]) {
    codeword.fill(0);
    for (i, &llr) in llr_total.iter().enumerate() {
        if llr < 0 {
            set_bit(codeword, i, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldpc::matrix::build_random;

    #[test]
    fn satisfied_codeword_passes_check_syndrome() {
        let (matrix, _) = build_random(32, 16, 3, 1);
        let codeword_bits = 32 + 16;
        let codeword_bytes = (codeword_bits + 7) / 8;
        let mut codeword = vec![0u8; codeword_bytes];

        for i in 0..32 {
            if i % 5 == 0 {
                set_bit(&mut codeword, i, 1);
            }
        }
        let mut prev_parity = 0u8;
        for i in 0..matrix.num_checks as usize {
            let mut xor_val = 0u8;
            for j in matrix.row_ptr[i]..matrix.row_ptr[i + 1] {
                let col = matrix.col_idx[j as usize] as usize;
                if col < 32 {
                    xor_val ^= get_bit(&codeword, col);
                }
            }
            xor_val ^= prev_parity;
            set_bit(&mut codeword, 32 + i, xor_val);
            prev_parity = xor_val;
        }

        assert!(check_syndrome(&matrix, &codeword));
    }
}
