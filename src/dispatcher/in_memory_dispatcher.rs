use std::collections::HashMap;

use tracing::{debug, info};

use crate::{
    felt::{ContractAddress, Felt, Selector},
    signature::SignedCall,
};

use super::{CallContext, Contract, DispatchError, Dispatcher};

#[derive(Default)]
pub struct InMemoryDispatcher {
    contracts: HashMap<ContractAddress, Box<dyn Contract>>,
    // contracts currently taken out of `contracts` while they execute
    call_stack: Vec<ContractAddress>,
    deployed: u64,
}

impl InMemoryDispatcher {
    /// Deploys the contract built by `build` at a fresh address.
    pub fn deploy<C, F>(&mut self, build: F) -> ContractAddress
    where
        C: Contract + 'static,
        F: FnOnce(ContractAddress) -> C,
    {
        let mut address = ContractAddress::derive(self.deployed);
        while self.contracts.contains_key(&address) {
            self.deployed += 1;
            address = ContractAddress::derive(self.deployed);
        }
        self.deployed += 1;
        self.contracts.insert(address, Box::new(build(address)));
        info!(%address, "contract deployed");
        address
    }

    /// Submits a signed call to the `execute` entrypoint of `account`.
    pub fn submit(
        &mut self,
        account: ContractAddress,
        call: &SignedCall,
    ) -> Result<Vec<Felt>, DispatchError> {
        self.invoke(
            ContractAddress::ZERO,
            account,
            Selector::from_name("execute"),
            &call.to_calldata(),
        )
    }

    /// Typed read access to a deployed contract.
    pub fn contract<T: 'static>(&self, address: ContractAddress) -> Option<&T> {
        self.contracts
            .get(&address)
            .and_then(|contract| contract.as_any().downcast_ref::<T>())
    }

    pub fn is_deployed(&self, address: ContractAddress) -> bool {
        self.contracts.contains_key(&address) || self.call_stack.contains(&address)
    }
}

impl Dispatcher for InMemoryDispatcher {
    fn invoke(
        &mut self,
        caller_address: ContractAddress,
        to: ContractAddress,
        selector: Selector,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, DispatchError> {
        if self.call_stack.contains(&to) {
            return Err(DispatchError::Reentrant { address: to });
        }
        let mut contract = self
            .contracts
            .remove(&to)
            .ok_or(DispatchError::ContractNotFound { address: to })?;
        debug!(%caller_address, %to, %selector, depth = self.call_stack.len(), "invoke");

        self.call_stack.push(to);
        let result = contract.invoke(
            CallContext {
                caller_address,
                contract_address: to,
                dispatcher: self,
            },
            selector,
            calldata,
        );
        self.call_stack.pop();
        self.contracts.insert(to, contract);
        result
    }

    fn call(
        &self,
        to: ContractAddress,
        selector: Selector,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, DispatchError> {
        if self.call_stack.contains(&to) {
            return Err(DispatchError::Reentrant { address: to });
        }
        self.contracts
            .get(&to)
            .ok_or(DispatchError::ContractNotFound { address: to })?
            .call(selector, calldata)
    }
}
