use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

use crate::error::ConfigError;

/// Inclusive range of time to wait between two sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    pub fn new(min_secs: f64, max_secs: f64) -> Result<Self, ConfigError> {
        let min = seconds(min_secs)?;
        let max = seconds(max_secs)?;
        if min > max {
            return Err(ConfigError::Delay(format!(
                "min ({min_secs}) is greater than max ({max_secs})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn fixed(secs: f64) -> Result<Self, ConfigError> {
        Self::new(secs, secs)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Rejects negative, non-finite and out of range values.
fn seconds(value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        ConfigError::Delay(format!("{value} is not a usable number of seconds"))
    })
}

/// Suspends the dispatcher between sends and between cycles.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Human readable hours for the cycle summary line.
pub fn format_hours(duration: Duration) -> String {
    let hours = duration.as_secs_f64() / 3600.0;
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        format!("{hours:.2}")
    }
}
