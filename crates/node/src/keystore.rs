//! Wallet keystore.
//!
//! Wallets are stored as `<dir>/<hex-address>.wal` files holding the
//! hex-encoded private scalar. Loading re-derives the address and rejects a
//! file whose key does not match the name it was requested under.

use modulax_types::{CryptoError, Wallet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default wallet directory.
pub const DEFAULT_WALLET_DIR: &str = "./wallets";

/// Errors from the wallet keystore.
#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("wallet file error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("wallet file for {requested} holds the key of {derived}")]
    AddressMismatch { requested: String, derived: String },
}

/// Directory of wallet files.
pub struct WalletStore {
    dir: PathBuf,
}

impl WalletStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The store at the default `./wallets` location.
    pub fn open_default() -> Self {
        Self::new(DEFAULT_WALLET_DIR)
    }

    fn path_for(&self, address_hex: &str) -> PathBuf {
        self.dir.join(format!("{address_hex}.wal"))
    }

    /// Whether a wallet file exists for the address.
    pub fn exists(&self, address_hex: &str) -> bool {
        self.path_for(address_hex).exists()
    }

    /// Persist a wallet, returning the file path.
    pub fn save(&self, wallet: &Wallet) -> Result<PathBuf, KeystoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&wallet.address().to_hex());
        fs::write(&path, wallet.private_scalar_hex())?;
        Ok(path)
    }

    /// Load the wallet stored under the given hex address.
    pub fn load(&self, address_hex: &str) -> Result<Wallet, KeystoreError> {
        let scalar_hex = fs::read_to_string(self.path_for(address_hex))?;
        let wallet = Wallet::from_hex(scalar_hex.trim())?;

        let derived = wallet.address().to_hex();
        if derived != address_hex.to_lowercase() {
            return Err(KeystoreError::AddressMismatch {
                requested: address_hex.to_string(),
                derived,
            });
        }
        Ok(wallet)
    }

    /// The directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
