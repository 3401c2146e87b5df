use std::{any::Any, collections::HashMap};

use alloy_primitives::Address;
use tracing::debug;

use crate::{
    command::{CalldataError, RegistryCommand},
    dispatcher::{CallContext, Contract, DispatchError},
    felt::{ContractAddress, Felt, L1Address, Selector, felt_from_l1_address},
};

/// Maps each caller to the L1 address it registered last.
#[derive(Debug, Default)]
pub struct AddressRegistry {
    l1_addresses: HashMap<ContractAddress, L1Address>,
}

impl AddressRegistry {
    pub fn set_l1_address(&mut self, caller: ContractAddress, l1_address: L1Address) {
        debug!(%caller, %l1_address, "registering L1 address");
        self.l1_addresses.insert(caller, l1_address);
    }

    pub fn l1_address(&self, account: ContractAddress) -> L1Address {
        self.l1_addresses
            .get(&account)
            .copied()
            .unwrap_or(Address::ZERO)
    }

    fn query(&self, cmd: RegistryCommand) -> Result<Vec<Felt>, CalldataError> {
        match cmd {
            RegistryCommand::GetL1Address { account } => {
                Ok(vec![felt_from_l1_address(self.l1_address(account))])
            }
            _ => Err(CalldataError::NotReadOnly {
                entrypoint: cmd.name(),
            }),
        }
    }
}

impl Contract for AddressRegistry {
    fn invoke(
        &mut self,
        ctx: CallContext<'_>,
        selector: Selector,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, DispatchError> {
        match RegistryCommand::parse_command(selector, calldata)? {
            RegistryCommand::SetL1Address { l1_address } => {
                self.set_l1_address(ctx.caller_address, l1_address);
                Ok(Vec::new())
            }
            cmd => Ok(self.query(cmd)?),
        }
    }

    fn call(&self, selector: Selector, calldata: &[Felt]) -> Result<Vec<Felt>, DispatchError> {
        let cmd = RegistryCommand::parse_command(selector, calldata)?;
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

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn set_overwrites_per_caller() {
        let mut registry = AddressRegistry::default();
        let first = Address::from_str("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984").unwrap();
        let second = Address::from_str("0xd9e1ce17f2641f24ae83637ab66a2cca9c378b9f").unwrap();
        let caller = ContractAddress::from(77);

        assert_eq!(registry.l1_address(caller), Address::ZERO);
        registry.set_l1_address(caller, first);
        assert_eq!(registry.l1_address(caller), first);
        registry.set_l1_address(caller, second);
        assert_eq!(registry.l1_address(caller), second);
        assert_eq!(registry.l1_address(ContractAddress::from(78)), Address::ZERO);
    }

    #[test]
    fn set_is_not_read_only() {
        let registry = AddressRegistry::default();
        let err = registry
            .call(Selector::from_name("set_L1_address"), &[Felt::from(1)])
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Calldata(CalldataError::NotReadOnly { .. })
        ));
    }
}
