use std::any::Any;

use alloy_primitives::U256;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    command::{AccountCommand, CalldataError},
    dispatcher::{CallContext, Contract, DispatchError},
    felt::{ContractAddress, Felt, Selector},
    signature::{Ed25519Verifier, SignatureVerifier, SignedCall, hash_call},
};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Account is already initialized")]
    AlreadyInitialized,
    #[error("Account is not initialized")]
    NotInitialized,
    #[error("Account lives at {expected}, initialize was given {got}")]
    AddressMismatch {
        expected: ContractAddress,
        got: ContractAddress,
    },
    #[error("Invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Nonce overflow")]
    ArithmeticOverflow,
    #[error("Call to {to} failed: {source}")]
    CallFailed {
        to: ContractAddress,
        selector: Selector,
        source: Box<DispatchError>,
    },
}

/// Signature-authenticated account. Every accepted `execute` consumes one
/// nonce, even when the forwarded call fails.
#[derive(Debug)]
pub struct Account<V = Ed25519Verifier> {
    address: ContractAddress,
    public_key: Option<Felt>,
    nonce: u64,
    verifier: V,
}

impl Account {
    pub fn new(address: ContractAddress) -> Self {
        Self::with_verifier(address, Ed25519Verifier)
    }
}

impl<V: SignatureVerifier> Account<V> {
    pub fn with_verifier(address: ContractAddress, verifier: V) -> Self {
        Self {
            address,
            public_key: None,
            nonce: 0,
            verifier,
        }
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn public_key(&self) -> Option<Felt> {
        self.public_key
    }

    pub fn initialize(
        &mut self,
        public_key: Felt,
        address: ContractAddress,
    ) -> Result<(), AccountError> {
        if self.public_key.is_some() {
            return Err(AccountError::AlreadyInitialized);
        }
        if address != self.address {
            return Err(AccountError::AddressMismatch {
                expected: self.address,
                got: address,
            });
        }
        self.public_key = Some(public_key);
        self.nonce = 0;
        info!(account = %self.address, "account initialized");
        Ok(())
    }

    /// Checks nonce and signature of `call` and consumes the nonce.
    /// State is untouched when this fails.
    pub fn authorize(&mut self, call: &SignedCall) -> Result<(), AccountError> {
        let public_key = self.public_key.ok_or(AccountError::NotInitialized)?;
        if call.nonce != self.nonce {
            warn!(account = %self.address, expected = self.nonce, got = call.nonce, "rejected nonce");
            return Err(AccountError::InvalidNonce {
                expected: self.nonce,
                got: call.nonce,
            });
        }
        let hash = hash_call(
            self.address,
            self.nonce,
            call.to,
            call.selector,
            &call.calldata,
        );
        if !self.verifier.verify(&hash, &call.signature, public_key) {
            warn!(account = %self.address, nonce = self.nonce, "rejected signature");
            return Err(AccountError::InvalidSignature);
        }
        self.nonce = self
            .nonce
            .checked_add(1)
            .ok_or(AccountError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn execute(
        &mut self,
        ctx: CallContext<'_>,
        call: SignedCall,
    ) -> Result<Vec<Felt>, AccountError> {
        self.authorize(&call)?;
        ctx.dispatcher
            .invoke(self.address, call.to, call.selector, &call.calldata)
            .map_err(|source| AccountError::CallFailed {
                to: call.to,
                selector: call.selector,
                source: Box::new(source),
            })
    }

    fn query(&self, cmd: AccountCommand) -> Result<Vec<Felt>, CalldataError> {
        match cmd {
            AccountCommand::GetNonce => Ok(vec![U256::from(self.nonce)]),
            AccountCommand::GetPublicKey => Ok(vec![self.public_key.unwrap_or_default()]),
            _ => Err(CalldataError::NotReadOnly {
                entrypoint: cmd.name(),
            }),
        }
    }
}

impl<V: SignatureVerifier + 'static> Contract for Account<V> {
    fn invoke(
        &mut self,
        ctx: CallContext<'_>,
        selector: Selector,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, DispatchError> {
        match AccountCommand::parse_command(selector, calldata)? {
            AccountCommand::Initialize {
                public_key,
                address,
            } => {
                self.initialize(public_key, address)?;
                Ok(Vec::new())
            }
            AccountCommand::Execute(call) => Ok(self.execute(ctx, call)?),
            cmd => Ok(self.query(cmd)?),
        }
    }

    fn call(&self, selector: Selector, calldata: &[Felt]) -> Result<Vec<Felt>, DispatchError> {
        let cmd = AccountCommand::parse_command(selector, calldata)?;
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
