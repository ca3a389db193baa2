//! Bindings for the SimpleDex contract and the ERC20 tokens it trades

use alloy::providers::DynProvider;

alloy::sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface SimpleDex {
        struct Trade {
            address trader;
            address tokenIn;
            address tokenOut;
            uint256 amountIn;
            uint256 amountOut;
            uint256 timestamp;
        }

        function getAmountOut(uint256 amountIn, uint256 reserveIn, uint256 reserveOut) external pure returns (uint256);
        function liquidityPools(address tokenA, address tokenB) external view returns (uint256 tokenAReserve, uint256 tokenBReserve);
        function liquidity(address tokenA, address tokenB) external view returns (uint256);
        function getUserLiquidity(address tokenA, address tokenB, address user) external view returns (uint256);
        function getTradeHistoryCount(address trader) external view returns (uint256);
        function getTradeHistory(
            address trader,
            address tokenIn,
            address tokenOut,
            uint256 fromTimestamp,
            uint256 toTimestamp,
            uint256 limit,
            uint256 offset
        ) external view returns (Trade[] memory);
    }
}

alloy::sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

pub type SimpleDexInstance = SimpleDex::SimpleDexInstance<DynProvider>;
pub type Erc20Instance = IERC20::IERC20Instance<DynProvider>;
