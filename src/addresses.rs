use alloy::primitives::Address;
use rand::Rng;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::{AddressSourceError, SendError};

/// Where the recipient pool comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressSource {
    /// Newline-delimited file, read once in file order.
    File(PathBuf),
    /// Newline-delimited HTTP feed, shuffled and optionally capped.
    Remote { url: String, max: Option<usize> },
}

impl AddressSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, AddressSource::Remote { .. })
    }
}

/// Recipients for one pass of the dispatcher.
#[derive(Debug, Clone)]
pub struct AddressPool {
    addresses: Vec<Address>,
    source: AddressSource,
}

impl AddressPool {
    #[cfg(test)]
    pub fn new(addresses: Vec<Address>, source: AddressSource) -> Self {
        Self { addresses, source }
    }

    /// Loads the pool from its source. An empty result is an error.
    pub async fn load(source: AddressSource) -> Result<Self, AddressSourceError> {
        let addresses = match &source {
            AddressSource::File(path) => {
                let addresses = read_file(path)?;
                info!("Loaded {} addresses from {}", addresses.len(), path.display());
                addresses
            }
            AddressSource::Remote { url, max } => {
                let fetched = fetch_remote(url).await?;
                let addresses = shuffle_and_cap(fetched, *max, &mut rand::thread_rng());
                info!("Loaded and shuffled {} addresses from {}", addresses.len(), url);
                addresses
            }
        };

        if addresses.is_empty() {
            return Err(AddressSourceError::Empty);
        }
        Ok(Self { addresses, source })
    }

    /// Re-fetches and reshuffles a remote pool. File pools are left as they are.
    /// On failure the previous addresses stay in place.
    pub async fn refresh(&mut self) -> Result<(), AddressSourceError> {
        if !self.source.is_remote() {
            return Ok(());
        }
        let fresh = Self::load(self.source.clone()).await?;
        self.addresses = fresh.addresses;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn source(&self) -> &AddressSource {
        &self.source
    }

    #[cfg(test)]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Picks a recipient with the OS CSPRNG. The same address may come up
    /// again on later sends.
    pub fn choose(&self) -> Result<Address, SendError> {
        self.choose_with(&mut OsRng)
    }

    pub fn choose_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Address, SendError> {
        self.addresses
            .choose(rng)
            .copied()
            .ok_or(SendError::EmptyPool)
    }
}

/// Parses newline-delimited addresses, keeping their order. Blank lines are
/// ignored and unparsable lines are skipped with a warning.
pub fn parse_lines(text: &str) -> Vec<Address> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match Address::from_str(line) {
            Ok(address) => Some(address),
            Err(e) => {
                warn!(line, error = %e, "Skipping invalid address");
                None
            }
        })
        .collect()
}

/// Shuffles the feed, then keeps at most `max` entries. `Some(0)` means no cap.
pub fn shuffle_and_cap<R: Rng + ?Sized>(
    mut addresses: Vec<Address>,
    max: Option<usize>,
    rng: &mut R,
) -> Vec<Address> {
    addresses.shuffle(rng);
    if let Some(max) = max.filter(|max| *max > 0) {
        addresses.truncate(max);
    }
    addresses
}

fn read_file(path: &Path) -> Result<Vec<Address>, AddressSourceError> {
    let text = fs::read_to_string(path).map_err(|source| AddressSourceError::File {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_lines(&text))
}

async fn fetch_remote(url: &str) -> Result<Vec<Address>, AddressSourceError> {
    let fetch_err = |source| AddressSourceError::Fetch {
        url: url.to_string(),
        source,
    };

    let body = reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .map_err(fetch_err)?
        .text()
        .await
        .map_err(fetch_err)?;

    Ok(parse_lines(&body))
}
