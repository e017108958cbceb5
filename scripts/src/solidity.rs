//! Definitions of Solidity interfaces called during deployment

use alloy::sol;

sol! {
    /// The ERC1822 interface every UUPS implementation exposes
    #[sol(rpc)]
    interface IERC1822Proxiable {
        function proxiableUUID() external view returns (bytes32);
    }
}
