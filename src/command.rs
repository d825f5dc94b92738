use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::constants::BENCH_FILL_BYTE;
use crate::encoding::ShareSet;
use crate::error::{Result, SplitError};
use crate::field::Field;
use crate::random::CoefficientSource;
use crate::sss::{Dealer, ThresholdPolicy};

const SHARE_COUNTS: [usize; 6] = [5, 10, 20, 30, 40, 50];

/// `--data-size` value that replays the classic client run of ids 1 to 12.
const CLASSIC_DATA_SIZE: usize = 10;
const CLASSIC_LAST_ID: u32 = 12;

/// Blocks of the command table, in id order. Each block covers every entry of
/// [`SHARE_COUNTS`] once.
const BLOCKS: [(usize, ThresholdPolicy); 8] = [
    (1000, ThresholdPolicy::Standard),
    (1000, ThresholdPolicy::Half),
    (100, ThresholdPolicy::Standard),
    (100, ThresholdPolicy::Half),
    (1000, ThresholdPolicy::Standard),
    (1000, ThresholdPolicy::Half),
    (10000, ThresholdPolicy::Standard),
    (10000, ThresholdPolicy::Half),
];

/// One benchmark scenario: split a secret of `secret_len` filler bytes into
/// `shares` shares under `policy`.
///
/// # Examples
///
/// ```rust
/// use shard_split::command::BenchCommand;
/// use shard_split::sss::ThresholdPolicy;
///
/// let cmd = BenchCommand::from_id(8).unwrap();
/// assert_eq!(cmd.shares, 10);
/// assert_eq!(cmd.secret_len, 1000);
/// assert_eq!(cmd.policy, ThresholdPolicy::Half);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BenchCommand {
    pub id: u32,
    pub shares: usize,
    pub secret_len: usize,
    pub policy: ThresholdPolicy,
}

impl BenchCommand {
    pub fn from_id(id: u32) -> Option<Self> {
        let offset = (id as usize).checked_sub(1)?;
        let (secret_len, policy) = *BLOCKS.get(offset / SHARE_COUNTS.len())?;
        Some(BenchCommand {
            id,
            shares: SHARE_COUNTS[offset % SHARE_COUNTS.len()],
            secret_len,
            policy,
        })
    }

    /// Every known command, in id order.
    pub fn all() -> Vec<Self> {
        (1..=(BLOCKS.len() * SHARE_COUNTS.len()) as u32)
            .filter_map(Self::from_id)
            .collect()
    }

    /// The commands run for a `--data-size` selection.
    ///
    /// `10` is the classic client run: the first two blocks, ids 1 to 12. Any
    /// other size picks the commands whose secret has exactly that length.
    pub fn for_data_size(data_size: usize) -> Vec<Self> {
        if data_size == CLASSIC_DATA_SIZE {
            return (1..=CLASSIC_LAST_ID).filter_map(Self::from_id).collect();
        }
        Self::all()
            .into_iter()
            .filter(|c| c.secret_len == data_size)
            .collect()
    }

    pub fn threshold(&self) -> usize {
        self.policy.threshold(self.shares)
    }

    pub fn secret(&self) -> Vec<u8> {
        vec![BENCH_FILL_BYTE; self.secret_len]
    }

    /// Runs the split once and hands back the share set.
    pub fn execute<S: CoefficientSource>(&self, source: S) -> Result<ShareSet> {
        Dealer::new(Field::default(), source).produce_share_set(&self.secret(), self.shares, self.policy)
    }
}

/// Looks up `id` and executes it.
///
/// # Errors
///
/// Returns [`SplitError::UnknownCommand`] for ids outside the table.
pub fn dispatch<S: CoefficientSource>(id: u32, source: S) -> Result<ShareSet> {
    let command = BenchCommand::from_id(id).ok_or(SplitError::UnknownCommand(id))?;
    debug!("Dispatching {:?}", command);
    command.execute(source)
}

/// Wall-clock cost of repeating one command.
#[derive(Debug, Clone, Serialize)]
pub struct Timing {
    pub command: BenchCommand,
    pub iterations: u32,
    #[serde(serialize_with = "as_millis")]
    pub total: Duration,
}

impl Timing {
    pub fn total_ms(&self) -> f64 {
        self.total.as_secs_f64() * 1000.0
    }

    pub fn mean_ms(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.total_ms() / self.iterations as f64
    }
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

/// Executes `command` `iterations` times and measures the total, discarding the
/// share sets the way the trusted application does.
pub fn run<S: CoefficientSource>(command: &BenchCommand, iterations: u32, mut source: S) -> Result<Timing> {
    let secret = command.secret();
    let mut dealer = Dealer::new(Field::default(), &mut source);

    let start = Instant::now();
    for _ in 0..iterations {
        dealer.produce_share_set(&secret, command.shares, command.policy)?;
    }
    let total = start.elapsed();

    debug!("cmd_id {} x{} took {:?}", command.id, iterations, total);
    Ok(Timing {
        command: *command,
        iterations,
        total,
    })
}
