use std::{any::Any, collections::HashMap};

use alloy_primitives::U256;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    command::{CalldataError, TokenCommand},
    dispatcher::{CallContext, Contract, DispatchError},
    felt::{ContractAddress, Felt, Selector, felt_from_bool},
};

/// Amount minted to the caller of `initialize`.
pub const INITIAL_SUPPLY: u64 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is already initialized")]
    AlreadyInitialized,
    #[error("Token is not initialized")]
    NotInitialized,
    #[error("Insufficient balance: {holder} holds {balance}, needs {amount}")]
    InsufficientBalance {
        holder: ContractAddress,
        balance: U256,
        amount: U256,
    },
    #[error("Insufficient allowance: {spender} may move {allowance} from {owner}, needs {amount}")]
    InsufficientAllowance {
        owner: ContractAddress,
        spender: ContractAddress,
        allowance: U256,
        amount: U256,
    },
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
    #[error("Arithmetic underflow")]
    ArithmeticUnderflow,
}

/// Validated ledger mutation. Carries the resulting values, so applying it
/// cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    Minted {
        to: ContractAddress,
        amount: U256,
        balance: U256,
        total_supply: U256,
    },
    Transferred {
        from: ContractAddress,
        to: ContractAddress,
        amount: U256,
        from_balance: U256,
        to_balance: U256,
    },
    Approved {
        owner: ContractAddress,
        spender: ContractAddress,
        amount: U256,
    },
    TransferredFrom {
        owner: ContractAddress,
        spender: ContractAddress,
        recipient: ContractAddress,
        amount: U256,
        owner_balance: U256,
        recipient_balance: U256,
        allowance: U256,
    },
}

impl LedgerEvent {
    fn return_data(&self) -> Vec<Felt> {
        match self {
            LedgerEvent::Minted { .. } => Vec::new(),
            _ => vec![felt_from_bool(true)],
        }
    }
}

#[derive(Debug, Default)]
pub struct TokenLedger {
    total_supply: U256,
    balances: HashMap<ContractAddress, U256>,
    allowances: HashMap<(ContractAddress, ContractAddress), U256>,
    initialized: bool,
}

impl TokenLedger {
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn balance_of(&self, holder: ContractAddress) -> U256 {
        self.balances.get(&holder).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: ContractAddress, spender: ContractAddress) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Every holder with a non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (ContractAddress, U256)> + '_ {
        self.balances.iter().map(|(holder, balance)| (*holder, *balance))
    }

    pub fn apply(&mut self, event: &LedgerEvent) {
        debug!(?event, "applying ledger event");
        match *event {
            LedgerEvent::Minted {
                to,
                balance,
                total_supply,
                ..
            } => {
                self.set_balance(to, balance);
                self.total_supply = total_supply;
                self.initialized = true;
            }
            LedgerEvent::Transferred {
                from,
                to,
                from_balance,
                to_balance,
                ..
            } => {
                self.set_balance(from, from_balance);
                self.set_balance(to, to_balance);
            }
            LedgerEvent::Approved {
                owner,
                spender,
                amount,
            } => {
                self.set_allowance(owner, spender, amount);
            }
            LedgerEvent::TransferredFrom {
                owner,
                spender,
                recipient,
                owner_balance,
                recipient_balance,
                allowance,
                ..
            } => {
                self.set_balance(owner, owner_balance);
                self.set_balance(recipient, recipient_balance);
                self.set_allowance(owner, spender, allowance);
            }
        }
    }

    fn set_balance(&mut self, holder: ContractAddress, balance: U256) {
        if balance.is_zero() {
            self.balances.remove(&holder);
        } else {
            self.balances.insert(holder, balance);
        }
    }

    fn set_allowance(&mut self, owner: ContractAddress, spender: ContractAddress, amount: U256) {
        if amount.is_zero() {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }

    pub fn handle_initialize(&self, caller: ContractAddress) -> Result<LedgerEvent, TokenError> {
        if self.initialized {
            return Err(TokenError::AlreadyInitialized);
        }
        let amount = U256::from(INITIAL_SUPPLY);
        Ok(LedgerEvent::Minted {
            to: caller,
            amount,
            balance: self
                .balance_of(caller)
                .checked_add(amount)
                .ok_or(TokenError::ArithmeticOverflow)?,
            total_supply: self
                .total_supply
                .checked_add(amount)
                .ok_or(TokenError::ArithmeticOverflow)?,
        })
    }

    pub fn handle_transfer(
        &self,
        caller: ContractAddress,
        recipient: ContractAddress,
        amount: U256,
    ) -> Result<LedgerEvent, TokenError> {
        self.ensure_initialized()?;
        let (from_balance, to_balance) = self.balances_after_move(caller, recipient, amount)?;
        Ok(LedgerEvent::Transferred {
            from: caller,
            to: recipient,
            amount,
            from_balance,
            to_balance,
        })
    }

    pub fn handle_approve(
        &self,
        caller: ContractAddress,
        spender: ContractAddress,
        amount: U256,
    ) -> Result<LedgerEvent, TokenError> {
        self.ensure_initialized()?;
        Ok(LedgerEvent::Approved {
            owner: caller,
            spender,
            amount,
        })
    }

    pub fn handle_transfer_from(
        &self,
        caller: ContractAddress,
        owner: ContractAddress,
        recipient: ContractAddress,
        amount: U256,
    ) -> Result<LedgerEvent, TokenError> {
        self.ensure_initialized()?;
        let allowance = self.allowance(owner, caller);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                owner,
                spender: caller,
                allowance,
                amount,
            });
        }
        let (owner_balance, recipient_balance) =
            self.balances_after_move(owner, recipient, amount)?;
        Ok(LedgerEvent::TransferredFrom {
            owner,
            spender: caller,
            recipient,
            amount,
            owner_balance,
            recipient_balance,
            allowance: allowance
                .checked_sub(amount)
                .ok_or(TokenError::ArithmeticUnderflow)?,
        })
    }

    fn ensure_initialized(&self) -> Result<(), TokenError> {
        if !self.initialized {
            return Err(TokenError::NotInitialized);
        }
        Ok(())
    }

    /// Balances of `from` and `to` once `amount` has moved between them.
    fn balances_after_move(
        &self,
        from: ContractAddress,
        to: ContractAddress,
        amount: U256,
    ) -> Result<(U256, U256), TokenError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(TokenError::InsufficientBalance {
                holder: from,
                balance,
                amount,
            });
        }
        if from == to {
            return Ok((balance, balance));
        }
        let debited = balance
            .checked_sub(amount)
            .ok_or(TokenError::ArithmeticUnderflow)?;
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::ArithmeticOverflow)?;
        Ok((debited, credited))
    }

    fn query(&self, cmd: TokenCommand) -> Result<Vec<Felt>, CalldataError> {
        match cmd {
            TokenCommand::BalanceOf { account } => Ok(vec![self.balance_of(account)]),
            TokenCommand::Allowance { owner, spender } => Ok(vec![self.allowance(owner, spender)]),
            TokenCommand::GetTotalSupply => Ok(vec![self.total_supply]),
            _ => Err(CalldataError::NotReadOnly {
                entrypoint: cmd.name(),
            }),
        }
    }
}

impl Contract for TokenLedger {
    fn invoke(
        &mut self,
        ctx: CallContext<'_>,
        selector: Selector,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, DispatchError> {
        let cmd = TokenCommand::parse_command(selector, calldata)?;
        let caller = ctx.caller_address;
        let event = match cmd {
            TokenCommand::Initialize => self.handle_initialize(caller)?,
            TokenCommand::Transfer { recipient, amount } => {
                self.handle_transfer(caller, recipient, amount)?
            }
            TokenCommand::Approve { spender, amount } => {
                self.handle_approve(caller, spender, amount)?
            }
            TokenCommand::TransferFrom {
                owner,
                recipient,
                amount,
            } => self.handle_transfer_from(caller, owner, recipient, amount)?,
            _ => return Ok(self.query(cmd)?),
        };
        self.apply(&event);
        if let LedgerEvent::Minted { to, amount, .. } = event {
            info!(token = %ctx.contract_address, %to, %amount, "token initialized");
        }
        Ok(event.return_data())
    }

    fn call(&self, selector: Selector, calldata: &[Felt]) -> Result<Vec<Felt>, DispatchError> {
        let cmd = TokenCommand::parse_command(selector, calldata)?;
        if !cmd.is_read_only() {
            return Err(CalldataError::NotReadOnly {
                entrypoint: cmd.name(),
            }
            .into());
        }
        Ok(self.query(cmd)?)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
