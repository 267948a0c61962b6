//! Users and accounts as issued by the ledger service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Checking,
    Saving,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Saving => "SAVING",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bank account reference. Balances live in the ledger, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    account_id: String,
    account_type: AccountType,
}

impl Account {
    pub fn new(account_id: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            account_id: account_id.into(),
            account_type,
        }
    }

    pub fn id(&self) -> &str {
        &self.account_id
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }
}

/// An authenticated customer.
///
/// The secret token lets the ledger re-check identity on every call;
/// the controller only carries it and never inspects it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    name: String,
    user_id: String,
    accounts: Vec<Account>,
    secret_token: String,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        user_id: impl Into<String>,
        accounts: Vec<Account>,
        secret_token: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            user_id: user_id.into(),
            accounts,
            secret_token: secret_token.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.user_id
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn secret_token(&self) -> &str {
        &self.secret_token
    }

    /// Look up one of this user's accounts by id.
    pub fn account(&self, account_id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id() == account_id)
    }

    pub fn owns(&self, account: &Account) -> bool {
        self.accounts.contains(account)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("user_id", &self.user_id)
            .field("accounts", &self.accounts)
            .field("secret_token", &"<redacted>")
            .finish()
    }
}
