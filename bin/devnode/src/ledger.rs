//! Simulated wallet service: named accounts with an address and a balance

use crate::node::provider_wallet;
use std::collections::HashMap;
use tracing::info;

pub type LedgerResult<T> = Result<T, String>;

struct Account {
    address: String,
    balance: f64,
}

#[derive(Default)]
pub struct Ledger {
    accounts: HashMap<String, Account>,
    credits: HashMap<String, f64>, // received by addresses outside our accounts
}

impl Ledger {
    pub fn with_account(name: &str, balance: f64) -> Self {
        let mut ledger = Self::default();
        ledger.accounts.insert(
            name.to_string(),
            Account {
                address: provider_wallet(name),
                balance,
            },
        );
        ledger
    }

    fn account(&self, name: &str) -> LedgerResult<&Account> {
        self.accounts
            .get(name)
            .ok_or_else(|| format!("account {} not found", name))
    }

    pub fn balance(&self, name: &str) -> LedgerResult<f64> {
        Ok(self.account(name)?.balance)
    }

    pub fn address(&self, name: &str) -> LedgerResult<String> {
        Ok(self.account(name)?.address.clone())
    }

    /// Move `amount` from `name` to `address`; returns a transaction id
    pub fn transfer(&mut self, name: &str, address: &str, amount: f64) -> LedgerResult<String> {
        if amount.is_nan() || amount <= 0.0 {
            return Err(format!("invalid amount: {}", amount));
        }
        if address.is_empty() {
            return Err("destination address is required".to_string());
        }
        let account = self
            .accounts
            .get_mut(name)
            .ok_or_else(|| format!("account {} not found", name))?;
        if account.balance < amount {
            return Err(format!(
                "insufficient funds: balance {}, amount {}",
                account.balance, amount
            ));
        }
        account.balance -= amount;
        *self.credits.entry(address.to_string()).or_default() += amount;

        let txid = uuid::Uuid::new_v4().simple().to_string();
        info!(account = name, address, amount, %txid, "Transfer settled");
        Ok(txid)
    }
}
