//! This module could be a separate crate on its own, to bootstrap [`mini_ledger`] within binary
//! but integration tests drive it too, so it lives in the library.

use std::{
    collections::BTreeMap,
    io::{Read, Write},
    str::FromStr,
};

use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use thiserror::Error;

use crate::{
    account::Account,
    dispatcher::{DispatchError, Dispatcher, in_memory_dispatcher::InMemoryDispatcher},
    felt::{ContractAddress, Felt, Selector},
    registry::AddressRegistry,
    signature::Signer,
    token::TokenLedger,
};
use csv_parser::{ContractKind, CsvScenarioParser, ScenarioRow};
use csv_printer::{Holder, write_holders};
pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Malformed row: {0}")]
    Csv(#[from] csv::Error),
    #[error("Cannot parse argument `{0}`")]
    BadArgument(String),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub error_printer: Box<dyn FnMut(u64, ScenarioError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvScenarioParser::new(self.input).context("Failed to read CSV header")?;

        let mut ledger = ScenarioLedger::new();

        for (line, row) in parser {
            if let Err(err) = row
                .map_err(ScenarioError::from)
                .and_then(|row| ledger.execute_row(&row))
            {
                (self.error_printer)(line, err);
            }
        }

        write_holders(self.output, &ledger.holders()?)
    }
}

struct ScenarioAccount {
    address: ContractAddress,
    signer: Signer,
}

/// Token, registry and one account per scenario label, all behind one dispatcher.
struct ScenarioLedger {
    dispatcher: InMemoryDispatcher,
    token: ContractAddress,
    registry: ContractAddress,
    accounts: BTreeMap<u64, ScenarioAccount>,
}

impl ScenarioLedger {
    fn new() -> Self {
        let mut dispatcher = InMemoryDispatcher::default();
        let token = dispatcher.deploy(|_| TokenLedger::default());
        let registry = dispatcher.deploy(|_| AddressRegistry::default());
        Self {
            dispatcher,
            token,
            registry,
            accounts: BTreeMap::new(),
        }
    }

    /// Address of the account labelled `label`, deployed and initialized on first use.
    fn account(&mut self, label: u64) -> Result<ContractAddress, ScenarioError> {
        if let Some(account) = self.accounts.get(&label) {
            return Ok(account.address);
        }
        let signer = Signer::new(U256::from(label));
        let address = self.dispatcher.deploy(Account::new);
        self.dispatcher.invoke(
            ContractAddress::ZERO,
            address,
            Selector::from_name("initialize"),
            &[signer.public_key(), address.to_felt()],
        )?;
        self.accounts
            .insert(label, ScenarioAccount { address, signer });
        Ok(address)
    }

    fn parse_arg(&mut self, arg: &str) -> Result<Felt, ScenarioError> {
        if let Some(label) = arg.strip_prefix('@') {
            let label = label
                .parse()
                .map_err(|_| ScenarioError::BadArgument(arg.to_owned()))?;
            return Ok(self.account(label)?.to_felt());
        }
        U256::from_str(arg).map_err(|_| ScenarioError::BadArgument(arg.to_owned()))
    }

    fn execute_row(&mut self, row: &ScenarioRow) -> Result<(), ScenarioError> {
        let address = self.account(row.account)?;
        let mut calldata = Vec::new();
        for arg in row.args.split_whitespace() {
            calldata.push(self.parse_arg(arg)?);
        }
        let to = match row.contract {
            ContractKind::Token => self.token,
            ContractKind::Registry => self.registry,
        };
        let nonce = self
            .dispatcher
            .contract::<Account>(address)
            .map(Account::nonce)
            .ok_or(DispatchError::ContractNotFound { address })?;
        let Some(account) = self.accounts.get(&row.account) else {
            return Err(DispatchError::ContractNotFound { address }.into());
        };
        let call = account.signer.sign_call(
            address,
            nonce,
            to,
            Selector::from_name(&row.entrypoint),
            calldata,
        );
        self.dispatcher.submit(address, &call)?;
        Ok(())
    }

    /// Every account and every token holder, ordered by address.
    fn holders(&self) -> Result<Vec<Holder>> {
        let token = self
            .dispatcher
            .contract::<TokenLedger>(self.token)
            .context("Token contract is missing")?;
        let registry = self
            .dispatcher
            .contract::<AddressRegistry>(self.registry)
            .context("Registry contract is missing")?;
        let l1_address = |address: ContractAddress| {
            let l1 = registry.l1_address(address);
            (l1 != Address::ZERO).then(|| l1.to_checksum(None))
        };

        let mut holders = BTreeMap::new();
        for (address, balance) in token.holders() {
            holders.insert(
                address,
                Holder {
                    address: address.to_string(),
                    account: None,
                    balance: balance.to_string(),
                    nonce: None,
                    l1_address: l1_address(address),
                },
            );
        }
        for (label, account) in &self.accounts {
            let nonce = self
                .dispatcher
                .contract::<Account>(account.address)
                .map(Account::nonce);
            holders.insert(
                account.address,
                Holder {
                    address: account.address.to_string(),
                    account: Some(*label),
                    balance: token.balance_of(account.address).to_string(),
                    nonce,
                    l1_address: l1_address(account.address),
                },
            );
        }
        Ok(holders.into_values().collect())
    }
}
