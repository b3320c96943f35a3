use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fec::LdpcRate;

/// Which of the three FEC families to construct.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum Family {
    Rs,
    Bch,
    Ldpc,
}

/// Mirrors [`LdpcRate`] as a `clap`-friendly enum.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum RateArg {
    OneThird,
    OneHalf,
    TwoThirds,
    ThreeQuarters,
    FourFifths,
    FiveSixths,
}

impl From<RateArg> for LdpcRate {
    fn from(rate: RateArg) -> Self {
        match rate {
            RateArg::OneThird => LdpcRate::OneThird,
            RateArg::OneHalf => LdpcRate::OneHalf,
            RateArg::TwoThirds => LdpcRate::TwoThirds,
            RateArg::ThreeQuarters => LdpcRate::ThreeQuarters,
            RateArg::FourFifths => LdpcRate::FourFifths,
            RateArg::FiveSixths => LdpcRate::FiveSixths,
        }
    }
}

/// Construction parameters shared by `encode` and `decode`, flattened into
/// both subcommands so a single set of flags round-trips a file. `symbol_size`
/// / `generator_polynomial` build the underlying Galois field and apply to
/// both RS and BCH; the rest are family-specific and ignored by the others.
#[derive(Args, Debug, Clone)]
pub struct FamilyArgs {
    /// GF(2^m) extension degree (RS, BCH).
    #[arg(long, default_value_t = 8)]
    pub symbol_size: u8,

    /// Primitive polynomial for the field (RS, BCH).
    #[arg(long, default_value_t = 0x11D)]
    pub generator_polynomial: u16,

    /// First consecutive root `b` of the generator polynomial (RS).
    #[arg(long, default_value_t = 1)]
    pub first_consecutive_root: u16,

    /// Primitive element step `s` (RS).
    #[arg(long, default_value_t = 1)]
    pub primitive_element: u16,

    /// Number of parity symbols (RS).
    #[arg(long, default_value_t = 32)]
    pub num_roots: u8,

    /// Correction capability `t`, in bits (BCH).
    #[arg(long, default_value_t = 3)]
    pub correction_capability: u8,

    /// Information block size in bytes (LDPC).
    #[arg(long, default_value_t = 64)]
    pub block_size: usize,

    /// Code rate (LDPC).
    #[arg(long, value_enum, default_value_t = RateArg::OneHalf)]
    pub rate: RateArg,

    /// Parity-check matrix column weight, clamped to [3, 8] (LDPC).
    #[arg(long, default_value_t = 3)]
    pub column_weight: u32,

    /// Enable the bit-level inner interleaver (LDPC).
    #[arg(long, default_value_t = false)]
    pub inner_interleave: bool,

    /// Enable the byte-level outer interleaver (LDPC).
    #[arg(long, default_value_t = false)]
    pub outer_interleave: bool,

    /// Shortcut for the burst-resistant preset: column weight 7, both
    /// interleavers on, 100-iteration decode budget (LDPC). Overrides
    /// `--column-weight`, `--inner-interleave`, `--outer-interleave`, and
    /// `--max-iterations`.
    #[arg(long, default_value_t = false)]
    pub burst_resistant: bool,

    /// Belief-propagation iteration budget; 0 selects the default of 50
    /// (LDPC).
    #[arg(long, default_value_t = 0)]
    pub max_iterations: u32,

    /// PRNG seed for parity-check matrix and interleaver construction
    /// (LDPC).
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// FEC family to encode with.
    #[arg(short, long, value_enum, default_value_t = Family::Rs)]
    pub family: Family,

    /// File to encode in place.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the parity bytes. Defaults to `<input>.parity`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: FamilyArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// FEC family to decode with; must match the family used to encode.
    #[arg(short, long, value_enum, default_value_t = Family::Rs)]
    pub family: Family,

    /// Data file to correct in place.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Parity file produced by `encode`, corrected in place alongside
    /// `--input`.
    #[arg(short, long)]
    pub parity: PathBuf,

    #[command(flatten)]
    pub common: FamilyArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a file, writing its parity bytes alongside it.
    Encode(EncodeArgs),
    /// Decode a file and its parity bytes in place, correcting any
    /// recoverable errors.
    Decode(DecodeArgs),
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Encode and decode files through RS, BCH, or LDPC forward error correction.",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML file overriding the family's construction parameters, replacing
    /// every `--symbol-size`/`--num-roots`/... flag above.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug-level logging (equivalent to `RUST_LOG=debug`).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_defaults() {
        let cli = Cli::try_parse_from(["prog", "encode", "--input", "a.bin"]).unwrap();
        match cli.command {
            Command::Encode(args) => {
                assert_eq!(args.family, Family::Rs);
                assert_eq!(args.common.symbol_size, 8);
                assert_eq!(args.common.num_roots, 32);
                assert!(args.output.is_none());
            }
            _ => panic!("expected Encode"),
        }
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn decode_with_custom_family_and_config() {
        let cli = Cli::try_parse_from([
            "prog",
            "--config",
            "fec.toml",
            "--verbose",
            "decode",
            "--family",
            "ldpc",
            "--input",
            "a.bin",
            "--parity",
            "a.bin.parity",
            "--burst-resistant",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("fec.toml")));
        match cli.command {
            Command::Decode(args) => {
                assert_eq!(args.family, Family::Ldpc);
                assert!(args.common.burst_resistant);
                assert_eq!(args.parity, PathBuf::from("a.bin.parity"));
            }
            _ => panic!("expected Decode"),
        }
    }
}
