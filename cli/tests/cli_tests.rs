use std::fs;

use fec_cli::options::{Cli, Command};
use fec_cli::run;

#[test]
fn end_to_end_rs_encode_then_decode() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("message.bin");
    let original: Vec<u8> = (0..48u16).map(|i| (i * 5 + 1) as u8).collect();
    fs::write(&input, &original).unwrap();

    let encode_cli = Cli::try_parse_from([
        "fec-cli",
        "encode",
        "--family",
        "rs",
        "--input",
        input.to_str().unwrap(),
        "--num-roots",
        "16",
    ])
    .unwrap();
    assert!(matches!(encode_cli.command, Command::Encode(_)));
    run(&encode_cli).unwrap();

    let parity_path = format!("{}.parity", input.to_str().unwrap());
    assert!(std::path::Path::new(&parity_path).exists());

    let mut corrupted = fs::read(&input).unwrap();
    corrupted[10] ^= 0xFF;
    fs::write(&input, &corrupted).unwrap();

    let decode_cli = Cli::try_parse_from([
        "fec-cli",
        "decode",
        "--family",
        "rs",
        "--input",
        input.to_str().unwrap(),
        "--parity",
        &parity_path,
        "--num-roots",
        "16",
    ])
    .unwrap();
    run(&decode_cli).unwrap();

    let mut recovered = fs::read(&input).unwrap();
    recovered.truncate(original.len());
    assert_eq!(recovered, original);
}

#[test]
fn rejects_unreadable_input() {
    let cli = Cli::try_parse_from([
        "fec-cli",
        "encode",
        "--family",
        "rs",
        "--input",
        "/nonexistent/path/does-not-exist.bin",
    ])
    .unwrap();
    assert!(run(&cli).is_err());
}
