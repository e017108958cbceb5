//! Solidity ABI definitions for the contracts used in integration tests

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }
}
