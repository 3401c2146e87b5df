use std::fmt;

use alloy_primitives::{Address, U256, keccak256};

/// A single calldata / return data word.
pub type Felt = U256;

/// External chain address, stored verbatim by the registry.
pub type L1Address = Address;

/// Selectors and derived contract addresses keep the low 250 bits of a keccak digest.
pub const MASK_BITS: usize = 250;

fn keccak_250(data: &[u8]) -> Felt {
    U256::from_be_bytes(keccak256(data).0) & (U256::MAX >> (256 - MASK_BITS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContractAddress(pub Felt);

impl ContractAddress {
    pub const ZERO: Self = Self(U256::ZERO);

    /// Address of the `counter`-th deployed contract.
    pub fn derive(counter: u64) -> Self {
        Self(keccak_250(&counter.to_be_bytes()))
    }

    pub fn to_felt(self) -> Felt {
        self.0
    }
}

impl From<u64> for ContractAddress {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<Felt> for ContractAddress {
    fn from(value: Felt) -> Self {
        Self(value)
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector(pub Felt);

impl Selector {
    pub fn from_name(name: &str) -> Self {
        Self(keccak_250(name.as_bytes()))
    }

    pub fn to_felt(self) -> Felt {
        self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

pub fn felt_from_bool(value: bool) -> Felt {
    if value { U256::from(1u8) } else { U256::ZERO }
}

pub fn felt_from_l1_address(address: L1Address) -> Felt {
    U256::from_be_slice(address.as_slice())
}

/// `None` when the value does not fit in 160 bits.
pub fn l1_address_from_felt(value: Felt) -> Option<L1Address> {
    if value.bit_len() > 160 {
        return None;
    }
    let bytes = value.to_be_bytes::<32>();
    Some(Address::from_slice(&bytes[12..]))
}
