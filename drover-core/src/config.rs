use crate::{
    ConfigError, DEFAULT_MAX_CONCURRENT, DEFAULT_MAX_RPS, DEFAULT_RUN_DURATION, DEFAULT_WARM_UP,
    MAX_CONCURRENT,
};
use clap::Parser;
use std::ffi::OsString;
use std::num::NonZeroU32;
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Validated settings for a single run.
///
/// Every constructor validates its input, so a `RunConfig` in hand is always runnable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    max_concurrent: u32,
    max_rps: u32,
    run_duration: Duration,
    warm_up: Duration,
}

impl RunConfig {
    /// `max_concurrent` and `max_rps` use 0 to mean unlimited.
    pub fn new(
        max_concurrent: u32,
        max_rps: u32,
        run_duration: Duration,
        warm_up: Duration,
    ) -> Result<Self, ConfigError> {
        if run_duration.is_zero() {
            return Err(ConfigError::ZeroRunDuration);
        }
        if max_concurrent > MAX_CONCURRENT {
            return Err(ConfigError::TooManyConcurrent {
                given: max_concurrent,
                max: MAX_CONCURRENT,
            });
        }

        Ok(Self {
            max_concurrent,
            max_rps,
            run_duration,
            warm_up,
        })
    }

    /// Build from the process arguments and `DROVER_*` environment variables.
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = RunArgs::try_parse()?;
        debug!("Parsed arguments {args:?}");
        Self::try_from(args)
    }

    pub fn try_parse_from<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_from(RunArgs::try_parse_from(args)?)
    }

    pub fn max_concurrent(&self) -> u32 {
        self.max_concurrent
    }

    pub fn max_rps(&self) -> u32 {
        self.max_rps
    }

    pub fn run_duration(&self) -> Duration {
        self.run_duration
    }

    pub fn warm_up(&self) -> Duration {
        self.warm_up
    }

    pub fn concurrency(&self) -> Concurrency {
        Concurrency::from(self.max_concurrent)
    }

    pub fn rate(&self) -> Rate {
        Rate::from(self.max_rps)
    }

    /// Warm-up plus measured duration.
    pub fn total_duration(&self) -> Duration {
        self.warm_up + self.run_duration
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            max_rps: DEFAULT_MAX_RPS,
            run_duration: DEFAULT_RUN_DURATION,
            warm_up: DEFAULT_WARM_UP,
        }
    }
}

impl TryFrom<RunArgs> for RunConfig {
    type Error = ConfigError;

    fn try_from(args: RunArgs) -> Result<Self, Self::Error> {
        Self::new(
            args.max_concurrent,
            args.max_rps,
            args.run_duration,
            args.warm_up,
        )
    }
}

/// Ceiling on simultaneously running executions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Concurrency {
    Bounded(NonZeroU32),
    Unbounded,
}

impl From<u32> for Concurrency {
    fn from(n: u32) -> Self {
        NonZeroU32::new(n).map_or(Self::Unbounded, Self::Bounded)
    }
}

/// Ceiling on admissions per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rate {
    Bounded(NonZeroU32),
    Unbounded,
}

impl From<u32> for Rate {
    fn from(n: u32) -> Self {
        NonZeroU32::new(n).map_or(Self::Unbounded, Self::Bounded)
    }
}

/// Command line flags (and their environment fallbacks) for a run.
///
/// Note: `-p` or `-r`, whichever admits fewer executions, is the one that throttles the run.
#[derive(Debug, Parser)]
#[command(about = "Drive a workload under concurrency and rate ceilings")]
pub struct RunArgs {
    /// Number of parallel executions. 0 means unlimited.
    #[arg(short = 'p', long, env = "DROVER_MAX_CONCURRENT", default_value_t = DEFAULT_MAX_CONCURRENT)]
    pub max_concurrent: u32,

    /// Maximum executions started per second. 0 means unlimited.
    #[arg(short = 'r', long, env = "DROVER_MAX_RPS", default_value_t = DEFAULT_MAX_RPS)]
    pub max_rps: u32,

    /// Measured running duration, ex: 300s or 5m.
    #[arg(
        short = 'd',
        long = "duration",
        env = "DROVER_DURATION",
        value_parser = humantime::parse_duration,
        default_value = "5s"
    )]
    pub run_duration: Duration,

    /// Time after startup excluded from the results, ex: 30s or 1m.
    #[arg(
        short = 'w',
        long,
        env = "DROVER_WARM_UP",
        value_parser = humantime::parse_duration,
        default_value = "5s"
    )]
    pub warm_up: Duration,
}
