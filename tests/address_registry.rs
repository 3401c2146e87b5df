mod common;

use std::str::FromStr;

use alloy_primitives::Address;
use common::{deploy_account, send_transaction, signer, view};
use mini_ledger::{
    dispatcher::in_memory_dispatcher::InMemoryDispatcher,
    felt::{ContractAddress, felt_from_l1_address},
    registry::AddressRegistry,
};

const L1_ADDRESS: &str = "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984";
const ANOTHER_ADDRESS: &str = "0xd9e1ce17f2641f24ae83637ab66a2cca9c378b9f";

fn account_factory() -> (InMemoryDispatcher, ContractAddress, ContractAddress) {
    let mut dispatcher = InMemoryDispatcher::default();
    let registry = dispatcher.deploy(|_| AddressRegistry::default());
    let account = deploy_account(&mut dispatcher, &signer());
    (dispatcher, account, registry)
}

fn send_set_address(
    dispatcher: &mut InMemoryDispatcher,
    account: ContractAddress,
    registry: ContractAddress,
    l1_address: Address,
) {
    send_transaction(
        dispatcher,
        &signer(),
        account,
        registry,
        "set_L1_address",
        vec![felt_from_l1_address(l1_address)],
    )
    .unwrap();
}

#[test]
fn set_address() {
    let (mut dispatcher, account, registry) = account_factory();
    let l1_address = Address::from_str(L1_ADDRESS).unwrap();

    send_set_address(&mut dispatcher, account, registry, l1_address);
    assert_eq!(
        view(&dispatcher, registry, "get_L1_address", &[account.to_felt()]),
        vec![felt_from_l1_address(l1_address)]
    );
}

#[test]
fn update_address() {
    let (mut dispatcher, account, registry) = account_factory();
    let l1_address = Address::from_str(L1_ADDRESS).unwrap();
    let another = Address::from_str(ANOTHER_ADDRESS).unwrap();

    send_set_address(&mut dispatcher, account, registry, l1_address);
    send_set_address(&mut dispatcher, account, registry, another);
    assert_eq!(
        view(&dispatcher, registry, "get_L1_address", &[account.to_felt()]),
        vec![felt_from_l1_address(another)]
    );
}

#[test]
fn entries_are_keyed_by_caller() {
    let (mut dispatcher, account, registry) = account_factory();
    let other = deploy_account(&mut dispatcher, &signer());
    send_set_address(
        &mut dispatcher,
        account,
        registry,
        Address::from_str(L1_ADDRESS).unwrap(),
    );

    assert_eq!(
        view(&dispatcher, registry, "get_L1_address", &[other.to_felt()]),
        vec![felt_from_l1_address(Address::ZERO)]
    );
    let typed = dispatcher.contract::<AddressRegistry>(registry).unwrap();
    assert_eq!(typed.l1_address(other), Address::ZERO);
}
