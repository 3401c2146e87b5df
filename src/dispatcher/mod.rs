use std::any::Any;

use thiserror::Error;

use crate::{
    account::AccountError,
    command::CalldataError,
    felt::{ContractAddress, Felt, Selector},
    token::TokenError,
};

pub mod in_memory_dispatcher;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Calldata(#[from] CalldataError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("No contract deployed at {address}")]
    ContractNotFound { address: ContractAddress },
    #[error("Contract {address} is already executing")]
    Reentrant { address: ContractAddress },
}

/// Execution context handed to a contract for one mutating call.
pub struct CallContext<'a> {
    pub caller_address: ContractAddress,
    pub contract_address: ContractAddress,
    pub dispatcher: &'a mut dyn Dispatcher,
}

/// A deployed contract instance. Owns its state exclusively.
pub trait Contract {
    fn invoke(
        &mut self,
        ctx: CallContext<'_>,
        selector: Selector,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, DispatchError>;

    /// Read-only entrypoints only.
    fn call(&self, selector: Selector, calldata: &[Felt]) -> Result<Vec<Felt>, DispatchError>;

    fn as_any(&self) -> &dyn Any;
}

/// Routes calls to deployed contracts and supplies the caller address.
pub trait Dispatcher {
    fn invoke(
        &mut self,
        caller_address: ContractAddress,
        to: ContractAddress,
        selector: Selector,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, DispatchError>;

    fn call(
        &self,
        to: ContractAddress,
        selector: Selector,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, DispatchError>;
}
