use std::sync::Arc;

use log::debug;
use storage::repository::AccountRepository;

use crate::error::AccountError;

/// Local login: remembers who is playing on this device.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
}

impl AccountService {
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Log in as `name` (trimmed).
    ///
    /// # Errors
    ///
    /// Returns `AccountError::EmptyName` for a blank name, or a storage error.
    pub async fn login(&self, name: &str) -> Result<String, AccountError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccountError::EmptyName);
        }
        self.accounts.set_current_user(name).await?;
        debug!("logged in as {name}");
        Ok(name.to_owned())
    }

    /// # Errors
    ///
    /// Returns `AccountError` if storage fails.
    pub async fn logout(&self) -> Result<(), AccountError> {
        self.accounts.clear_current_user().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AccountError` if storage fails.
    pub async fn current_user(&self) -> Result<Option<String>, AccountError> {
        Ok(self.accounts.current_user().await?)
    }

    /// The logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotLoggedIn` when nobody is logged in.
    pub async fn require_user(&self) -> Result<String, AccountError> {
        self.current_user().await?.ok_or(AccountError::NotLoggedIn)
    }
}
