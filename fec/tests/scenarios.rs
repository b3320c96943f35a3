use fec::{BchCode, LdpcCode, LdpcConfig, LdpcRate, RsCode};

fn rs_default() -> RsCode {
    RsCode::new(8, 0x11D, 1, 1, 32).unwrap()
}

fn pseudo_random_64() -> Vec<u8> {
    // Deterministic stand-in for "random 64 bytes": distinct, non-trivial
    // values rather than an incrementing or constant sequence.
    (0..64u32).map(|i| ((i.wrapping_mul(2654435761) >> 13) & 0xFF) as u8).collect()
}

#[test]
fn s1_rs_no_op() {
    let mut rs = rs_default();
    let data = pseudo_random_64();
    let mut parity = rs.encode(&data).unwrap();
    assert_eq!(parity.len(), 32);

    let mut decoded = data.clone();
    let corrections = rs.decode(&mut decoded, &mut parity).unwrap();
    assert_eq!(corrections, 0);
    assert_eq!(decoded, data);
}

#[test]
fn s2_rs_correct() {
    let mut rs = rs_default();
    let original = pseudo_random_64();
    let mut parity = rs.encode(&original).unwrap();

    let mut data = original.clone();
    for &pos in &[3usize, 17, 29] {
        data[pos] ^= 0xFF;
    }

    let corrections = rs.decode(&mut data, &mut parity).unwrap();
    assert_eq!(corrections, 3);
    assert_eq!(data, original);
}

#[test]
fn s3_rs_erasure() {
    use fec::ErasureSet;

    let mut rs = rs_default();
    let original = pseudo_random_64();
    let mut parity = rs.encode(&original).unwrap();

    let mut data = original.clone();
    let mut erasures = ErasureSet::new();
    for &pos in &[5u32, 10, 15, 20, 25, 30, 35, 40] {
        erasures.push(pos);
        data[pos as usize] = 0;
    }

    rs.decode_with_erasures(&mut data, &mut parity, &mut erasures)
        .unwrap();
    assert_eq!(data, original);
}

#[test]
fn s4_bch_single_bit() {
    let bch = BchCode::new(4, 0x13, 3).unwrap();
    let codeword = bch.encode(21).unwrap();

    for bit in 0..bch.codeword_length() {
        let received = codeword ^ (1u32 << bit);
        let (corrected, errors) = bch.decode(received).unwrap();
        assert_eq!(corrected, codeword);
        assert_eq!(errors, 1);
    }
}

#[test]
fn s5_bch_double_bit() {
    let bch = BchCode::new(4, 0x13, 3).unwrap();
    let codeword = bch.encode(7).unwrap();
    let n = bch.codeword_length();

    for i in 0..n {
        for j in (i + 1)..n {
            let received = codeword ^ (1u32 << i) ^ (1u32 << j);
            let (corrected, errors) = bch.decode(received).unwrap();
            assert_eq!(corrected, codeword);
            assert_eq!(errors, 2);
        }
    }
}

fn ldpc_info_64() -> Vec<u8> {
    (0..64u32).map(|i| ((17 * i + 23) % 256) as u8).collect()
}

#[test]
fn s6_ldpc_round_trip() {
    let mut code = LdpcCode::new(64, LdpcRate::OneHalf, LdpcConfig::default()).unwrap();
    let info = ldpc_info_64();
    let (info_out, parity_out) = code.encode(&info).unwrap();

    let mut codeword = info_out;
    codeword.extend_from_slice(&parity_out);

    let (recovered, iterations) = code.decode_hard(&codeword, 50).unwrap();
    assert_eq!(iterations, 0);
    assert_eq!(recovered, info);
}

#[test]
fn s7_ldpc_correction() {
    let mut code = LdpcCode::new(64, LdpcRate::OneHalf, LdpcConfig::default()).unwrap();
    let info = ldpc_info_64();
    let (info_out, parity_out) = code.encode(&info).unwrap();

    let mut codeword = info_out;
    codeword.extend_from_slice(&parity_out);
    let original_codeword = codeword.clone();

    codeword[0] ^= 0x01;
    codeword[10] ^= 0x80;
    codeword[20] ^= 0x40;

    let (recovered, iterations) = code.decode_hard(&codeword, 50).unwrap();
    assert!(iterations > 0);
    assert_eq!(recovered, info);

    // Re-encoding the recovered info must reproduce the original codeword
    // bit for bit, confirming "original codeword restored" rather than just
    // "info restored".
    let (info_out2, parity_out2) = code.encode(&recovered).unwrap();
    let mut restored_codeword = info_out2;
    restored_codeword.extend_from_slice(&parity_out2);
    assert_eq!(restored_codeword, original_codeword);
}

#[test]
fn s8_ldpc_burst() {
    let mut code = LdpcCode::new(128, LdpcRate::OneHalf, LdpcConfig::burst_resistant()).unwrap();
    let info: Vec<u8> = (0..128u32).map(|i| ((17 * i + 23) % 256) as u8).collect();
    let (info_out, parity_out) = code.encode(&info).unwrap();

    let mut codeword = info_out;
    codeword.extend_from_slice(&parity_out);
    for b in codeword.iter_mut().skip(40).take(4) {
        *b = 0xFF;
    }

    let (recovered, iterations) = code
        .decode_hard(&codeword, fec::BURST_RESISTANT_MAX_ITERATIONS)
        .unwrap();
    assert!(iterations > 0);
    assert_eq!(recovered, info);
}
