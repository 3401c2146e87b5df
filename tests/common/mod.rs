#![allow(dead_code)]

use alloy_primitives::U256;
use mini_ledger::{
    account::{Account, AccountError},
    dispatcher::{DispatchError, Dispatcher, in_memory_dispatcher::InMemoryDispatcher},
    felt::{ContractAddress, Felt, Selector},
    signature::Signer,
};

pub const PRIVATE_KEY: u64 = 123456789987654321;

pub fn signer() -> Signer {
    Signer::new(U256::from(PRIVATE_KEY))
}

pub fn felt(value: u64) -> Felt {
    U256::from(value)
}

/// Deploys an account and initializes it with `signer`'s public key.
pub fn deploy_account(dispatcher: &mut InMemoryDispatcher, signer: &Signer) -> ContractAddress {
    let account = dispatcher.deploy(Account::new);
    dispatcher
        .invoke(
            ContractAddress::ZERO,
            account,
            Selector::from_name("initialize"),
            &[signer.public_key(), account.to_felt()],
        )
        .unwrap();
    account
}

pub fn nonce(dispatcher: &InMemoryDispatcher, account: ContractAddress) -> u64 {
    let data = dispatcher
        .call(account, Selector::from_name("get_nonce"), &[])
        .unwrap();
    u64::try_from(data[0]).unwrap()
}

/// Signs with the account's current nonce and submits through `execute`.
pub fn send_transaction(
    dispatcher: &mut InMemoryDispatcher,
    signer: &Signer,
    account: ContractAddress,
    to: ContractAddress,
    entrypoint: &str,
    calldata: Vec<Felt>,
) -> Result<Vec<Felt>, DispatchError> {
    let call = signer.sign_call(
        account,
        nonce(dispatcher, account),
        to,
        Selector::from_name(entrypoint),
        calldata,
    );
    dispatcher.submit(account, &call)
}

pub fn view(
    dispatcher: &InMemoryDispatcher,
    to: ContractAddress,
    entrypoint: &str,
    calldata: &[Felt],
) -> Vec<Felt> {
    dispatcher
        .call(to, Selector::from_name(entrypoint), calldata)
        .unwrap()
}

/// Unwraps the callee error out of a failed `execute`.
pub fn downstream(err: DispatchError) -> DispatchError {
    match err {
        DispatchError::Account(AccountError::CallFailed { source, .. }) => *source,
        other => panic!("expected a failed forwarded call, got {other}"),
    }
}
