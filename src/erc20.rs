//! Minimal ERC-20 surface: the `Transfer` event for typed log decoding and the
//! `transfer` function for calldata encoding.

use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
    sol_types::SolCall,
};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IErc20 {
        event Transfer(address indexed from, address indexed to, uint256 value);

        function transfer(address to, uint256 value) external returns (bool);
    }
}

/// Encodes the calldata for an ERC-20 `transfer(to, value)` call.
///
/// Pure function; used internally by [`Reconciler::send`](crate::Reconciler::send)
/// and exposed for callers that need raw call data.
#[must_use]
pub fn encode_transfer_input(to: Address, value: U256) -> Bytes {
    IErc20::transferCall { to, value }.abi_encode().into()
}
