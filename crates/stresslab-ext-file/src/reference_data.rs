//! File-based broker and instrument directory sources.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Deserialize;

use stresslab_traits::error::TraitError;
use stresslab_traits::reference_data::*;
use stresslab_traits::AccountId;

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, TraitError> {
    let file = std::fs::File::open(path).map_err(|e| TraitError::IoError(e.to_string()))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| TraitError::ParseError(format!("{}: {e}", path.display())))
}

// =============================================================================
// JSON BROKER SOURCE
// =============================================================================

/// On-disk layout of a broker snapshot.
///
/// ```json
/// {
///   "accounts": [{ "id": "2000123456", "name": "Main" }],
///   "positions": {
///     "2000123456": {
///       "securities": [{ "figi": "BBG004730N88", "balance": 100 }],
///       "futures": [],
///       "options": [{ "position_uid": "opt-1", "balance": 2 }]
///     }
///   }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
struct BrokerFile {
    #[serde(default)]
    accounts: Vec<BrokerAccount>,
    #[serde(default)]
    positions: HashMap<AccountId, BrokerPositions>,
}

/// JSON-based position source holding a broker snapshot.
///
/// An account that is listed but has no positions entry reports an empty
/// snapshot; an account that is not listed at all is `NotFound`.
pub struct JsonBrokerSource {
    file_path: PathBuf,
    accounts: RwLock<Vec<BrokerAccount>>,
    positions: DashMap<AccountId, BrokerPositions>,
}

impl JsonBrokerSource {
    /// Create a new JSON broker source.
    pub fn new(file_path: impl AsRef<Path>) -> Result<Self, TraitError> {
        let source = Self {
            file_path: file_path.as_ref().to_path_buf(),
            accounts: RwLock::new(Vec::new()),
            positions: DashMap::new(),
        };
        source.reload()?;
        Ok(source)
    }

    /// Reload the snapshot from file.
    pub fn reload(&self) -> Result<(), TraitError> {
        if !self.file_path.exists() {
            return Ok(()); // Empty source
        }

        let file: BrokerFile = read_json(&self.file_path)?;

        self.positions.clear();
        for (account, positions) in file.positions {
            self.positions.insert(account, positions);
        }
        *self.accounts.write() = file.accounts;

        Ok(())
    }
}

#[async_trait]
impl PositionSource for JsonBrokerSource {
    async fn accounts(&self) -> Result<Vec<BrokerAccount>, TraitError> {
        Ok(self.accounts.read().clone())
    }

    async fn positions(&self, account_id: &AccountId) -> Result<BrokerPositions, TraitError> {
        if let Some(positions) = self.positions.get(account_id) {
            return Ok(positions.clone());
        }
        if self.accounts.read().iter().any(|a| &a.id == account_id) {
            return Ok(BrokerPositions::default());
        }
        Err(TraitError::NotFound(format!("account {account_id}")))
    }
}

// =============================================================================
// JSON INSTRUMENT DIRECTORY
// =============================================================================

/// On-disk layout of the instrument directory: one array per listing plus
/// the option contracts.
#[derive(Debug, Default, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    shares: Vec<InstrumentInfo>,
    #[serde(default)]
    etfs: Vec<InstrumentInfo>,
    #[serde(default)]
    bonds: Vec<InstrumentInfo>,
    #[serde(default)]
    futures: Vec<InstrumentInfo>,
    #[serde(default)]
    options: Vec<OptionContract>,
}

/// JSON-based instrument directory.
pub struct JsonInstrumentDirectory {
    file_path: PathBuf,
    listings: DashMap<InstrumentClass, Vec<InstrumentInfo>>,
    options: RwLock<Vec<OptionContract>>,
}

impl JsonInstrumentDirectory {
    /// Create a new JSON instrument directory.
    pub fn new(file_path: impl AsRef<Path>) -> Result<Self, TraitError> {
        let source = Self {
            file_path: file_path.as_ref().to_path_buf(),
            listings: DashMap::new(),
            options: RwLock::new(Vec::new()),
        };
        source.reload()?;
        Ok(source)
    }

    /// Reload listings from file.
    pub fn reload(&self) -> Result<(), TraitError> {
        if !self.file_path.exists() {
            return Ok(()); // Empty source
        }

        let file: DirectoryFile = read_json(&self.file_path)?;

        self.listings.clear();
        self.listings.insert(InstrumentClass::Share, file.shares);
        self.listings.insert(InstrumentClass::Etf, file.etfs);
        self.listings.insert(InstrumentClass::Bond, file.bonds);
        self.listings.insert(InstrumentClass::Future, file.futures);
        *self.options.write() = file.options;

        Ok(())
    }

    /// Total number of listed instruments and option contracts.
    pub fn len(&self) -> usize {
        self.listings.iter().map(|l| l.len()).sum::<usize>() + self.options.read().len()
    }

    /// Returns true if nothing is listed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl InstrumentDirectory for JsonInstrumentDirectory {
    async fn instruments(
        &self,
        class: InstrumentClass,
    ) -> Result<Vec<InstrumentInfo>, TraitError> {
        Ok(self
            .listings
            .get(&class)
            .map(|l| l.clone())
            .unwrap_or_default())
    }

    async fn options(&self) -> Result<Vec<OptionContract>, TraitError> {
        Ok(self.options.read().clone())
    }
}
