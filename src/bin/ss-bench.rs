use clap::{crate_version, Parser, Subcommand};

use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use shard_split::command::{self, BenchCommand, Timing};
use shard_split::config::BenchConfig;
use shard_split::random::{CoefficientSource, EntropyStrength, SeededSource, SystemSource};
use shard_split::sss::{produce_share_set, ThresholdPolicy};
use shard_split::ShareSet;

#[derive(Debug, Subcommand)]
enum CliArgument {
    /// Split a secret and print the share set.
    Split {
        /// Number of shares to generate.
        #[clap(long, short)]
        shares: usize,

        /// Threshold policy, standard or half. Defaults to the configured policy.
        #[clap(long, short)]
        policy: Option<ThresholdPolicy>,

        /// Secret to split.
        #[clap(long)]
        secret: String,

        /// Seed for reproducible coefficients.
        #[clap(long)]
        seed: Option<u64>,

        /// Verbose mode also reports the transport buffer size
        #[clap(long, short)]
        verbose: bool,
    },
    /// Time benchmark commands.
    Run {
        /// Secret length selecting the commands to run, ignored when ids are given.
        #[clap(long, short)]
        data_size: Option<usize>,

        /// Repetitions per command.
        #[clap(long, short)]
        iterations: Option<u32>,

        /// Explicit command ids, comma separated.
        #[clap(long, value_delimiter = ',')]
        ids: Vec<u32>,

        /// Seed for reproducible coefficients.
        #[clap(long)]
        seed: Option<u64>,

        /// Print the timings as JSON.
        #[clap(long)]
        json: bool,
    },
    /// List the benchmark commands.
    Commands,
    /// Write a default conf.toml.
    Init {
        /// Directory to write into, the config directory when omitted.
        #[clap(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "ss-bench")]
#[command(version = crate_version!())]
#[command(
    about = "ss-bench - threshold secret splitting benchmark",
    long_about = "ss-bench splits secrets into Shamir shares over GF(257) and measures how long a split takes. Each benchmark command fixes a share count (5 to 50), a secret length (100, 1000 or 10000 bytes) and a threshold policy: standard uses (2n + 2) / 3, half uses (n + 1) / 2. Shares are printed in the IITTAA hex format, one per line. Coefficients come from the operating system unless a seed is given, in which case runs are reproducible and the shares must not protect anything real."
)]
struct Opt {
    /// Directory holding conf.toml.
    #[clap(long, short, default_value = ".ss-bench")]
    config_dir: PathBuf,

    /// Subcommand to run.
    #[clap(subcommand)]
    argument: CliArgument,
}

fn source(seed: Option<u64>) -> Box<dyn CoefficientSource> {
    match seed {
        Some(seed) => Box::new(SeededSource::new(seed)),
        None => Box::new(SystemSource::new()),
    }
}

fn report_entropy(set: &ShareSet) {
    match set.entropy() {
        EntropyStrength::Cryptographic => {}
        EntropyStrength::Deterministic => debug!("shares were produced from a seeded source"),
        EntropyStrength::Fallback => {
            warn!("⚠️ shares were produced by the non-cryptographic fallback generator")
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let opt = Opt::parse();
    let config = BenchConfig::load(Some(opt.config_dir.as_path()))?;
    debug!("Using config: {:?}", config);

    match opt.argument {
        CliArgument::Split {
            shares,
            policy,
            secret,
            seed,
            verbose,
        } => {
            let mut rng = source(seed.or(config.seed));
            let policy = policy.unwrap_or(config.policy);
            let set = produce_share_set(shares, policy, secret.as_bytes(), &mut *rng)?;
            report_entropy(&set);

            print!("{}", set);
            if verbose {
                let wire = set.to_bytes()?;
                println!("✂️  {} shares, threshold {}, {} bytes on the wire", set.len(), set.threshold(), wire.len());
            }
        }
        CliArgument::Run {
            data_size,
            iterations,
            ids,
            seed,
            json,
        } => {
            let iterations = iterations.unwrap_or(config.iterations);
            let commands = if ids.is_empty() {
                let data_size = data_size.unwrap_or(config.data_size);
                println!("For {} B of data", data_size);
                BenchCommand::for_data_size(data_size)
            } else {
                ids.iter()
                    .map(|&id| BenchCommand::from_id(id).ok_or_else(|| format!("Unknown command id {id}.")))
                    .collect::<Result<Vec<_>, _>>()?
            };
            if commands.is_empty() {
                return Err("No benchmark commands match the requested data size.".into());
            }

            let mut rng = source(seed.or(config.seed));
            let mut timings: Vec<Timing> = Vec::with_capacity(commands.len());
            for cmd in &commands {
                if !json {
                    println!("Start for cmd_id {}", cmd.id);
                }
                let timing = command::run(cmd, iterations, &mut *rng)?;
                if !json {
                    println!(
                        "Time taken for cmd_id {}({}): {:.6} ms",
                        cmd.id,
                        iterations,
                        timing.total_ms()
                    );
                }
                timings.push(timing);
            }
            if rng.strength() == EntropyStrength::Fallback {
                warn!("⚠️ timings include the non-cryptographic fallback generator");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&timings)?);
            }
        }
        CliArgument::Commands => {
            for cmd in BenchCommand::all() {
                println!(
                    "{:>2}  n={:<2}  t={:<2}  len={:<5}  {}",
                    cmd.id,
                    cmd.shares,
                    cmd.threshold(),
                    cmd.secret_len,
                    cmd.policy
                );
            }
        }
        CliArgument::Init { path } => {
            let path = BenchConfig::init(path.as_deref().unwrap_or(opt.config_dir.as_path()))?;
            println!("📝 Wrote {}", path.display());
        }
    }

    Ok(())
}
