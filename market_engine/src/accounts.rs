//! Mock accounts and watchlists.
//!
//! `AccountStore` keeps registered users and the signed-in user. It is a
//! stand-in for a real backend: any registered email signs in with the
//! password `password`. When opened with a path, every mutation is written back
//! as JSON so consecutive CLI runs share one session.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use market_common::{MarketError, Result};
use serde::{Deserialize, Serialize};

/// Password accepted for every account.
pub const MOCK_PASSWORD: &str = "password";

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique id derived from the signup time.
    pub id: String,
    /// Login email, unique across the store.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Watched symbols in insertion order.
    pub watchlist: Vec<String>,
    /// Signup time.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Accounts {
    #[serde(default)]
    users: Vec<User>,
    /// Id of the signed-in user.
    #[serde(default)]
    current: Option<String>,
}

/// Registered users and the current session.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: Accounts,
    path: Option<PathBuf>,
}

impl AccountStore {
    /// Store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store persisted at `path`; a missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let accounts = if path.is_file() {
            let file = File::open(&path)?;
            serde_json::from_reader(BufReader::new(file))?
        } else {
            debug!("No account file at {}, starting empty", path.display());
            Accounts::default()
        };
        Ok(AccountStore {
            accounts,
            path: Some(path),
        })
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<&User> {
        let id = self.accounts.current.as_deref()?;
        self.accounts.users.iter().find(|u| u.id == id)
    }

    /// Whether someone is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Sign in `email`. Only the mock password is accepted.
    pub fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let user = self
            .accounts
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| MarketError::Auth("User not found".to_string()))?;
        if password != MOCK_PASSWORD {
            return Err(MarketError::Auth("Invalid password".to_string()));
        }
        self.accounts.current = Some(user.id.clone());
        self.save()?;
        info!("{} signed in", user.email);
        Ok(user)
    }

    /// Register a new user and sign them in.
    pub fn signup(&mut self, name: &str, email: &str, _password: &str) -> Result<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(MarketError::Validation("email is required".to_string()));
        }
        if self.accounts.users.iter().any(|u| u.email == email) {
            return Err(MarketError::Auth("Email already exists".to_string()));
        }

        let created_at = Utc::now();
        let user = User {
            id: self.next_id(created_at.timestamp_millis()),
            email: email.to_string(),
            name: name.trim().to_string(),
            watchlist: Vec::new(),
            created_at,
        };
        self.accounts.users.push(user.clone());
        self.accounts.current = Some(user.id.clone());
        self.save()?;
        info!("Registered {}", user.email);
        Ok(user)
    }

    /// End the current session, if any.
    pub fn logout(&mut self) -> Result<()> {
        if self.accounts.current.take().is_some() {
            self.save()?;
        }
        Ok(())
    }

    /// Replace the signed-in user's watchlist.
    pub fn update_watchlist(&mut self, watchlist: Vec<String>) -> Result<User> {
        let user = self.current_user_mut()?;
        user.watchlist = watchlist;
        let user = user.clone();
        self.save()?;
        Ok(user)
    }

    /// Add `symbol` to the signed-in user's watchlist, or remove it if present.
    /// Returns whether the symbol is watched afterwards.
    pub fn toggle_watchlist(&mut self, symbol: &str) -> Result<bool> {
        let user = self.current_user_mut()?;
        let watched = if let Some(pos) = user.watchlist.iter().position(|s| s == symbol) {
            user.watchlist.remove(pos);
            false
        } else {
            user.watchlist.push(symbol.to_string());
            true
        };
        self.save()?;
        Ok(watched)
    }

    /// Whether the signed-in user watches `symbol`.
    pub fn is_watched(&self, symbol: &str) -> bool {
        self.current_user()
            .is_some_and(|u| u.watchlist.iter().any(|s| s == symbol))
    }

    fn current_user_mut(&mut self) -> Result<&mut User> {
        let id = self
            .accounts
            .current
            .clone()
            .ok_or_else(|| MarketError::Auth("Not signed in".to_string()))?;
        self.accounts
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| MarketError::Auth("User not found".to_string()))
    }

    /// Millisecond ids, bumped past any existing one.
    fn next_id(&self, millis: i64) -> String {
        let mut id = millis;
        while self.accounts.users.iter().any(|u| u.id == id.to_string()) {
            id += 1;
        }
        id.to_string()
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.accounts)?;
        debug!("Accounts saved to {}", path.display());
        Ok(())
    }
}
