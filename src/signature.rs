use alloy_primitives::U256;
use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::felt::{ContractAddress, Felt, Selector};

pub type MessageHash = [u8; 32];

/// Ed25519 signature split into its two 32 byte halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signature {
    pub r: Felt,
    pub s: Felt,
}

impl Signature {
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r.to_be_bytes::<32>());
        bytes[32..].copy_from_slice(&self.s.to_be_bytes::<32>());
        bytes
    }
}

/// Checks a signature over a message hash for a given public key.
pub trait SignatureVerifier {
    fn verify(&self, message_hash: &MessageHash, signature: &Signature, public_key: Felt) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, message_hash: &MessageHash, signature: &Signature, public_key: Felt) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&public_key.to_be_bytes::<32>()) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(&signature.to_bytes());
        key.verify(message_hash, &signature).is_ok()
    }
}

/// Call envelope submitted to an account's `execute` entrypoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCall {
    pub nonce: u64,
    pub to: ContractAddress,
    pub selector: Selector,
    pub calldata: Vec<Felt>,
    pub signature: Signature,
}

impl SignedCall {
    /// Layout: `[to, selector, nonce, r, s, calldata_len, calldata...]`.
    pub fn to_calldata(&self) -> Vec<Felt> {
        let mut out = Vec::with_capacity(6 + self.calldata.len());
        out.push(self.to.to_felt());
        out.push(self.selector.to_felt());
        out.push(U256::from(self.nonce));
        out.push(self.signature.r);
        out.push(self.signature.s);
        out.push(U256::from(self.calldata.len()));
        out.extend_from_slice(&self.calldata);
        out
    }
}

/// SHA-256 over 32 byte big-endian words of
/// `account, nonce, to, selector, calldata_len, calldata...`.
pub fn hash_call(
    account: ContractAddress,
    nonce: u64,
    to: ContractAddress,
    selector: Selector,
    calldata: &[Felt],
) -> MessageHash {
    let mut hasher = Sha256::new();
    hasher.update(account.to_felt().to_be_bytes::<32>());
    hasher.update(U256::from(nonce).to_be_bytes::<32>());
    hasher.update(to.to_felt().to_be_bytes::<32>());
    hasher.update(selector.to_felt().to_be_bytes::<32>());
    hasher.update(U256::from(calldata.len()).to_be_bytes::<32>());
    for word in calldata {
        hasher.update(word.to_be_bytes::<32>());
    }
    hasher.finalize().into()
}

/// Client side key holder that produces [`SignedCall`]s for an account.
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    pub fn new(private_key: Felt) -> Self {
        Self {
            key: SigningKey::from_bytes(&private_key.to_be_bytes::<32>()),
        }
    }

    pub fn public_key(&self) -> Felt {
        U256::from_be_bytes(self.key.verifying_key().to_bytes())
    }

    pub fn sign_hash(&self, message_hash: &MessageHash) -> Signature {
        let signature = self.key.sign(message_hash);
        Signature {
            r: U256::from_be_bytes(*signature.r_bytes()),
            s: U256::from_be_bytes(*signature.s_bytes()),
        }
    }

    pub fn sign_call(
        &self,
        account: ContractAddress,
        nonce: u64,
        to: ContractAddress,
        selector: Selector,
        calldata: Vec<Felt>,
    ) -> SignedCall {
        let hash = hash_call(account, nonce, to, selector, &calldata);
        SignedCall {
            nonce,
            to,
            selector,
            calldata,
            signature: self.sign_hash(&hash),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> Signer {
        Signer::new(U256::from(123456789987654321u64))
    }

    #[test]
    fn verify_own_signature() {
        let signer = signer();
        let hash = hash_call(
            ContractAddress::from(1),
            0,
            ContractAddress::from(2),
            Selector::from_name("transfer"),
            &[U256::from(123), U256::from(100)],
        );
        let signature = signer.sign_hash(&hash);
        assert!(Ed25519Verifier.verify(&hash, &signature, signer.public_key()));

        let other = Signer::new(U256::from(42));
        assert!(!Ed25519Verifier.verify(&hash, &signature, other.public_key()));
    }

    #[test]
    fn hash_binds_every_field() {
        let to = ContractAddress::from(2);
        let selector = Selector::from_name("transfer");
        let base = hash_call(ContractAddress::from(1), 0, to, selector, &[U256::from(5)]);
        assert_ne!(
            base,
            hash_call(ContractAddress::from(9), 0, to, selector, &[U256::from(5)])
        );
        assert_ne!(
            base,
            hash_call(ContractAddress::from(1), 1, to, selector, &[U256::from(5)])
        );
        assert_ne!(
            base,
            hash_call(ContractAddress::from(1), 0, to, selector, &[U256::from(6)])
        );
        // length prefix keeps trailing zero words significant
        assert_ne!(
            base,
            hash_call(
                ContractAddress::from(1),
                0,
                to,
                selector,
                &[U256::from(5), U256::ZERO]
            )
        );
    }

    #[test]
    fn garbage_public_key_is_rejected() {
        let signer = signer();
        let hash = [7u8; 32];
        let signature = signer.sign_hash(&hash);
        assert!(!Ed25519Verifier.verify(&hash, &signature, U256::MAX));
    }

    #[test]
    fn signed_call_layout() {
        let call = signer().sign_call(
            ContractAddress::from(1),
            3,
            ContractAddress::from(2),
            Selector::from_name("approve"),
            vec![U256::from(7), U256::from(8)],
        );
        let data = call.to_calldata();
        assert_eq!(data.len(), 8);
        assert_eq!(data[2], U256::from(3));
        assert_eq!(data[5], U256::from(2));
        assert_eq!(&data[6..], &call.calldata[..]);
    }
}
