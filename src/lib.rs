/// Calldata words, contract addresses, selectors and L1 addresses.
pub mod felt;

/// Message hashing, the pluggable signature verifier and the client signer.
pub mod signature;

/// Decodes raw entrypoint calldata into typed commands for each contract.
pub mod command;

/// Signature-authenticated account that forwards calls on behalf of its key holder.
pub mod account;

/// ERC20-style token. Mutations are validated into events first and then
/// applied, so a failed call never leaves a partial update behind.
pub mod token;

/// Caller address to L1 address registry.
pub mod registry;

/// Contract and dispatcher interfaces, plus an "in memory" dispatcher.
/// The dispatcher owns every contract instance and hands each call its caller address.
pub mod dispatcher;

/// Replays a CSV scenario of signed calls and prints the resulting ledger.
/// Kept in the library so integration tests can drive it.
pub mod bin_utils;
