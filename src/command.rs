use alloy_primitives::U256;
use thiserror::Error;

use crate::{
    felt::{ContractAddress, Felt, L1Address, Selector, l1_address_from_felt},
    signature::{Signature, SignedCall},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalldataError {
    #[error("Unknown entrypoint selector {selector}")]
    UnknownEntrypoint { selector: Selector },
    #[error("Entrypoint `{entrypoint}` expects {expected} calldata words, got {got}")]
    WrongLength {
        entrypoint: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("Value for `{field}` of `{entrypoint}` is out of range")]
    OutOfRange {
        entrypoint: &'static str,
        field: &'static str,
    },
    #[error("Entrypoint `{entrypoint}` mutates state and cannot be called read-only")]
    NotReadOnly { entrypoint: &'static str },
}

/// Sequential reader over entrypoint calldata.
pub struct CalldataReader<'a> {
    entrypoint: &'static str,
    data: &'a [Felt],
    pos: usize,
}

impl<'a> CalldataReader<'a> {
    pub fn new(entrypoint: &'static str, data: &'a [Felt]) -> Self {
        Self {
            entrypoint,
            data,
            pos: 0,
        }
    }

    /// Fails unless the calldata has exactly `expected` words.
    pub fn expect_len(&self, expected: usize) -> Result<(), CalldataError> {
        if self.data.len() != expected {
            return Err(self.wrong_length(expected));
        }
        Ok(())
    }

    fn wrong_length(&self, expected: usize) -> CalldataError {
        CalldataError::WrongLength {
            entrypoint: self.entrypoint,
            expected,
            got: self.data.len(),
        }
    }

    pub fn felt(&mut self) -> Result<Felt, CalldataError> {
        let value = *self
            .data
            .get(self.pos)
            .ok_or_else(|| self.wrong_length(self.pos + 1))?;
        self.pos += 1;
        Ok(value)
    }

    pub fn address(&mut self) -> Result<ContractAddress, CalldataError> {
        self.felt().map(ContractAddress)
    }

    pub fn u64(&mut self, field: &'static str) -> Result<u64, CalldataError> {
        let value = self.felt()?;
        u64::try_from(value).map_err(|_| self.out_of_range(field))
    }

    pub fn l1_address(&mut self, field: &'static str) -> Result<L1Address, CalldataError> {
        let value = self.felt()?;
        l1_address_from_felt(value).ok_or_else(|| self.out_of_range(field))
    }

    /// Length-prefixed array, must be the last item in the calldata.
    pub fn tail_array(&mut self) -> Result<Vec<Felt>, CalldataError> {
        let len = self.felt()?;
        let len = usize::try_from(len).map_err(|_| self.out_of_range("calldata_len"))?;
        let expected = self
            .pos
            .checked_add(len)
            .ok_or_else(|| self.out_of_range("calldata_len"))?;
        let rest = &self.data[self.pos..];
        if rest.len() != len {
            return Err(self.wrong_length(expected));
        }
        self.pos = self.data.len();
        Ok(rest.to_vec())
    }

    fn out_of_range(&self, field: &'static str) -> CalldataError {
        CalldataError::OutOfRange {
            entrypoint: self.entrypoint,
            field,
        }
    }
}

/// Resolves `selector` against a contract's entrypoint names.
fn lookup(selector: Selector, names: &[&'static str]) -> Result<&'static str, CalldataError> {
    names
        .iter()
        .copied()
        .find(|name| Selector::from_name(name) == selector)
        .ok_or(CalldataError::UnknownEntrypoint { selector })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountCommand {
    Initialize {
        public_key: Felt,
        address: ContractAddress,
    },
    Execute(SignedCall),
    GetNonce,
    GetPublicKey,
}

impl AccountCommand {
    const ENTRYPOINTS: [&'static str; 4] = ["initialize", "execute", "get_nonce", "get_public_key"];

    pub fn parse_command(selector: Selector, calldata: &[Felt]) -> Result<Self, CalldataError> {
        let entrypoint = lookup(selector, &Self::ENTRYPOINTS)?;
        let mut reader = CalldataReader::new(entrypoint, calldata);
        match entrypoint {
            "initialize" => {
                reader.expect_len(2)?;
                Ok(Self::Initialize {
                    public_key: reader.felt()?,
                    address: reader.address()?,
                })
            }
            "execute" => {
                let to = reader.address()?;
                let selector = Selector(reader.felt()?);
                let nonce = reader.u64("nonce")?;
                let signature = Signature {
                    r: reader.felt()?,
                    s: reader.felt()?,
                };
                let calldata = reader.tail_array()?;
                Ok(Self::Execute(SignedCall {
                    nonce,
                    to,
                    selector,
                    calldata,
                    signature,
                }))
            }
            "get_nonce" => {
                reader.expect_len(0)?;
                Ok(Self::GetNonce)
            }
            _ => {
                reader.expect_len(0)?;
                Ok(Self::GetPublicKey)
            }
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::GetNonce | Self::GetPublicKey)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize { .. } => "initialize",
            Self::Execute(_) => "execute",
            Self::GetNonce => "get_nonce",
            Self::GetPublicKey => "get_public_key",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCommand {
    Initialize,
    Transfer {
        recipient: ContractAddress,
        amount: U256,
    },
    Approve {
        spender: ContractAddress,
        amount: U256,
    },
    TransferFrom {
        owner: ContractAddress,
        recipient: ContractAddress,
        amount: U256,
    },
    BalanceOf {
        account: ContractAddress,
    },
    Allowance {
        owner: ContractAddress,
        spender: ContractAddress,
    },
    GetTotalSupply,
}

impl TokenCommand {
    const ENTRYPOINTS: [&'static str; 7] = [
        "initialize",
        "transfer",
        "approve",
        "transfer_from",
        "balance_of",
        "allowance",
        "get_total_supply",
    ];

    pub fn parse_command(selector: Selector, calldata: &[Felt]) -> Result<Self, CalldataError> {
        let entrypoint = lookup(selector, &Self::ENTRYPOINTS)?;
        let mut r = CalldataReader::new(entrypoint, calldata);
        let cmd = match entrypoint {
            "initialize" => {
                r.expect_len(0)?;
                Self::Initialize
            }
            "transfer" => {
                r.expect_len(2)?;
                Self::Transfer {
                    recipient: r.address()?,
                    amount: r.felt()?,
                }
            }
            "approve" => {
                r.expect_len(2)?;
                Self::Approve {
                    spender: r.address()?,
                    amount: r.felt()?,
                }
            }
            "transfer_from" => {
                r.expect_len(3)?;
                Self::TransferFrom {
                    owner: r.address()?,
                    recipient: r.address()?,
                    amount: r.felt()?,
                }
            }
            "balance_of" => {
                r.expect_len(1)?;
                Self::BalanceOf {
                    account: r.address()?,
                }
            }
            "allowance" => {
                r.expect_len(2)?;
                Self::Allowance {
                    owner: r.address()?,
                    spender: r.address()?,
                }
            }
            _ => {
                r.expect_len(0)?;
                Self::GetTotalSupply
            }
        };
        Ok(cmd)
    }

    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::BalanceOf { .. } | Self::Allowance { .. } | Self::GetTotalSupply
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Transfer { .. } => "transfer",
            Self::Approve { .. } => "approve",
            Self::TransferFrom { .. } => "transfer_from",
            Self::BalanceOf { .. } => "balance_of",
            Self::Allowance { .. } => "allowance",
            Self::GetTotalSupply => "get_total_supply",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryCommand {
    SetL1Address { l1_address: L1Address },
    GetL1Address { account: ContractAddress },
}

impl RegistryCommand {
    const ENTRYPOINTS: [&'static str; 2] = ["set_L1_address", "get_L1_address"];

    pub fn parse_command(selector: Selector, calldata: &[Felt]) -> Result<Self, CalldataError> {
        let entrypoint = lookup(selector, &Self::ENTRYPOINTS)?;
        let mut r = CalldataReader::new(entrypoint, calldata);
        r.expect_len(1)?;
        if entrypoint == "set_L1_address" {
            Ok(Self::SetL1Address {
                l1_address: r.l1_address("l1_address")?,
            })
        } else {
            Ok(Self::GetL1Address {
                account: r.address()?,
            })
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::GetL1Address { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SetL1Address { .. } => "set_L1_address",
            Self::GetL1Address { .. } => "get_L1_address",
        }
    }
}
