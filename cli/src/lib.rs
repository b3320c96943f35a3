pub mod options;

use std::fs;
use std::path::Path;

use fec::{BchConfig, Fec, FecConfig, LdpcConfig, LdpcFecConfig, LdpcMatrixType, RsConfig};
use options::{Cli, Command, DecodeArgs, EncodeArgs, Family, FamilyArgs};

/// Builds the [`FecConfig`] for a run: a `--config` TOML file takes over
/// entirely when given, otherwise the family and its flattened flags in
/// `args` are translated directly.
pub fn resolve_config(
    family: Family,
    args: &FamilyArgs,
    config_path: Option<&Path>,
) -> Result<FecConfig, Box<dyn std::error::Error>> {
    if let Some(path) = config_path {
        let text = fs::read_to_string(path)?;
        return Ok(toml::from_str(&text)?);
    }

    Ok(match family {
        Family::Rs => FecConfig::Rs(RsConfig {
            symbol_size: args.symbol_size,
            generator_polynomial: args.generator_polynomial,
            first_consecutive_root: args.first_consecutive_root,
            primitive_element: args.primitive_element,
            num_roots: args.num_roots,
        }),
        Family::Bch => FecConfig::Bch(BchConfig {
            symbol_size: args.symbol_size,
            generator_polynomial: args.generator_polynomial,
            correction_capability: args.correction_capability,
        }),
        Family::Ldpc => {
            let matrix = if args.burst_resistant {
                LdpcConfig::burst_resistant()
            } else {
                LdpcConfig {
                    matrix_type: LdpcMatrixType::Random,
                    column_weight: args.column_weight,
                    use_inner_interleave: args.inner_interleave,
                    use_outer_interleave: args.outer_interleave,
                    interleave_depth: 0,
                    lifting_factor: 0,
                    seed: args.seed,
                }
            };
            let max_iterations = if args.burst_resistant {
                fec::BURST_RESISTANT_MAX_ITERATIONS
            } else {
                args.max_iterations
            };
            FecConfig::Ldpc(LdpcFecConfig {
                block_size: args.block_size,
                rate: args.rate.into(),
                matrix,
                max_iterations,
            })
        }
    })
}

/// Encodes `args.input` in place and writes its parity bytes to
/// `args.output` (or `<input>.parity`). Short inputs are zero-padded up to
/// the code's capacity; oversized inputs are rejected.
pub fn run_encode(
    args: &EncodeArgs,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(args.family, &args.common, config_path)?;
    let fec = Fec::create(config)?;

    let mut data = fs::read(&args.input)?;
    if data.len() > fec.info_size() {
        return Err(format!(
            "{} is {} bytes, exceeding this code's {}-byte capacity",
            args.input.display(),
            data.len(),
            fec.info_size()
        )
        .into());
    }
    data.resize(fec.info_size(), 0);

    let parity = fec.encode(&mut data)?;

    let output = args.output.clone().unwrap_or_else(|| {
        let mut name = args.input.clone().into_os_string();
        name.push(".parity");
        name.into()
    });
    fs::write(&args.input, &data)?;
    fs::write(&output, &parity)?;

    log::info!(
        "encoded {} ({} info bytes) -> {} ({} parity bytes)",
        args.input.display(),
        data.len(),
        output.display(),
        parity.len()
    );
    Ok(())
}

/// Decodes `args.input`/`args.parity` in place, returning the number of
/// corrections the codec applied.
pub fn run_decode(
    args: &DecodeArgs,
    config_path: Option<&Path>,
) -> Result<usize, Box<dyn std::error::Error>> {
    let config = resolve_config(args.family, &args.common, config_path)?;
    let mut fec = Fec::create(config)?;

    let mut data = fs::read(&args.input)?;
    let mut parity = fs::read(&args.parity)?;
    let corrections = fec.decode(&mut data, &mut parity)?;
    fs::write(&args.input, &data)?;

    log::info!(
        "decoded {} with {corrections} correction(s) applied",
        args.input.display()
    );
    Ok(corrections)
}

pub fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Encode(args) => run_encode(args, cli.config.as_deref()),
        Command::Decode(args) => run_decode(args, cli.config.as_deref()).map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use options::RateArg;
    use std::io::Write;

    #[test]
    fn rs_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.bin");
        let original: Vec<u8> = (0..40u16).map(|i| (i * 7) as u8).collect();
        fs::write(&input, &original).unwrap();

        let encode_args = EncodeArgs {
            family: Family::Rs,
            input: input.clone(),
            output: None,
            common: FamilyArgs {
                symbol_size: 8,
                generator_polynomial: 0x11D,
                first_consecutive_root: 1,
                primitive_element: 1,
                num_roots: 16,
                correction_capability: 3,
                block_size: 64,
                rate: RateArg::OneHalf,
                column_weight: 3,
                inner_interleave: false,
                outer_interleave: false,
                burst_resistant: false,
                max_iterations: 0,
                seed: 0,
            },
        };
        run_encode(&encode_args, None).unwrap();

        let parity_path = {
            let mut name = input.clone().into_os_string();
            name.push(".parity");
            std::path::PathBuf::from(name)
        };
        assert!(parity_path.exists());

        // Corrupt a byte of the encoded (zero-padded) data file.
        let mut corrupted = fs::read(&input).unwrap();
        corrupted[3] ^= 0xFF;
        let mut f = fs::File::create(&input).unwrap();
        f.write_all(&corrupted).unwrap();
        drop(f);

        let decode_args = DecodeArgs {
            family: Family::Rs,
            input: input.clone(),
            parity: parity_path,
            common: encode_args.common.clone(),
        };
        let corrections = run_decode(&decode_args, None).unwrap();
        assert_eq!(corrections, 1);

        let mut recovered = fs::read(&input).unwrap();
        recovered.truncate(original.len());
        assert_eq!(recovered, original);
    }

    #[test]
    fn encode_rejects_oversized_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("too_big.bin");
        fs::write(&input, vec![0u8; 1_000_000]).unwrap();

        let args = EncodeArgs {
            family: Family::Rs,
            input,
            output: None,
            common: FamilyArgs {
                symbol_size: 8,
                generator_polynomial: 0x11D,
                first_consecutive_root: 1,
                primitive_element: 1,
                num_roots: 32,
                correction_capability: 3,
                block_size: 64,
                rate: RateArg::OneHalf,
                column_weight: 3,
                inner_interleave: false,
                outer_interleave: false,
                burst_resistant: false,
                max_iterations: 0,
                seed: 0,
            },
        };
        assert!(run_encode(&args, None).is_err());
    }
}
