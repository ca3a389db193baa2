//! Error handling for the application

use alloy::transports::RpcError;
use thiserror::Error;

/// Errors raised by the AMM accounting functions.
///
/// Running out of liquidity is not one of them: an empty pool is an
/// expected state and is reported through `QuoteOutcome::NoLiquidity`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountingError {
    #[error("Withdrawal percentage must be between 1 and 100, got {0}")]
    InvalidPercentage(u8),

    #[error("Arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}

/// Token registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Token {symbol} declares {decimals} decimals, at most 18 are supported")]
    InvalidDecimals { symbol: String, decimals: u8 },

    #[error("Token address registered twice: {0}")]
    DuplicateAddress(String),

    #[error("Token symbol registered twice: {0}")]
    DuplicateSymbol(String),

    #[error("Unknown token symbol: {0}")]
    UnknownSymbol(String),

    #[error("Unknown token address: {0}")]
    UnknownAddress(String),
}

/// Decimal string <-> smallest unit conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Invalid decimal number: {0:?}")]
    InvalidNumber(String),

    #[error("{value:?} has more than {decimals} fractional digits")]
    TooManyDecimals { value: String, decimals: u8 },

    #[error("Amount does not fit in 256 bits: {0:?}")]
    Overflow(String),
}

/// DEX read errors
#[derive(Error, Debug)]
pub enum DexError {
    #[error("Invalid RPC URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Error response from the node, reverts included.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Contract call failed: {0}")]
    Contract(String),
}

impl From<alloy::contract::Error> for DexError {
    fn from(err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(RpcError::ErrorResp(payload)) => DexError::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
            },
            err => DexError::Contract(err.to_string()),
        }
    }
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Blockchain error: {0}")]
    BlockchainError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<AccountingError> for AppError {
    fn from(err: AccountingError) -> Self {
        match err {
            AccountingError::InvalidPercentage(_) => AppError::InvalidInput(err.to_string()),
            AccountingError::Overflow(_) => AppError::Unknown(err.to_string()),
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownSymbol(_) | RegistryError::UnknownAddress(_) => {
                AppError::InvalidInput(err.to_string())
            }
            _ => AppError::ConfigError(err.to_string()),
        }
    }
}

impl From<UnitsError> for AppError {
    fn from(err: UnitsError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<DexError> for AppError {
    fn from(err: DexError) -> Self {
        match err {
            DexError::Rpc { message, .. } => AppError::BlockchainError(message),
            _ => AppError::BlockchainError(err.to_string()),
        }
    }
}

/// Turn a failed remove-liquidity transaction into the text shown to the user.
///
/// Only meant for withdrawal reverts and wallet rejections; the "insufficient"
/// rule would misread unrelated node errors. Unrecognised messages are passed
/// through verbatim.
pub fn describe_revert(message: &str) -> String {
    if message.contains("Not enough pool liquidity") {
        "Not enough liquidity in the pool. Try removing a smaller percentage.".to_string()
    } else if message.contains("user rejected transaction") {
        "Transaction was rejected.".to_string()
    } else if message.contains("insufficient") {
        "Insufficient liquidity. Try removing a smaller percentage.".to_string()
    } else {
        message.to_string()
    }
}

/// User-facing text for a remove-liquidity transaction the node rejected.
pub fn describe_withdrawal_failure(err: &DexError) -> String {
    match err {
        DexError::Rpc { message, .. } => describe_revert(message),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_revert_known_messages() {
        assert_eq!(
            describe_revert("execution reverted: Not enough pool liquidity"),
            "Not enough liquidity in the pool. Try removing a smaller percentage."
        );
        assert_eq!(
            describe_revert("MetaMask Tx Signature: user rejected transaction"),
            "Transaction was rejected."
        );
        assert_eq!(
            describe_revert("execution reverted: insufficient liquidity burned"),
            "Insufficient liquidity. Try removing a smaller percentage."
        );
    }

    #[test]
    fn test_describe_revert_passes_unknown_through() {
        assert_eq!(describe_revert("nonce too low"), "nonce too low");
    }

    #[test]
    fn test_app_error_conversion() {
        let err: AppError = AccountingError::InvalidPercentage(0).into();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err: AppError = RegistryError::DuplicateSymbol("USDT".into()).into();
        assert!(matches!(err, AppError::ConfigError(_)));

        let err: AppError = DexError::Rpc {
            code: 3,
            message: "execution reverted: Not enough pool liquidity".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Blockchain error: execution reverted: Not enough pool liquidity");
    }

    #[test]
    fn test_read_errors_keep_node_message() {
        let err: AppError = DexError::Rpc {
            code: -32000,
            message: "insufficient funds for gas * price + value".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Blockchain error: insufficient funds for gas * price + value"
        );
    }

    #[test]
    fn test_withdrawal_failure_is_described() {
        let revert = DexError::Rpc {
            code: 3,
            message: "execution reverted: Not enough pool liquidity".into(),
        };
        assert_eq!(
            describe_withdrawal_failure(&revert),
            "Not enough liquidity in the pool. Try removing a smaller percentage."
        );

        let other = DexError::Contract("buffer overrun while deserializing".into());
        assert_eq!(
            describe_withdrawal_failure(&other),
            "Contract call failed: buffer overrun while deserializing"
        );
    }

    #[test]
    fn test_contract_error_mapping() {
        let node = alloy::contract::Error::TransportError(RpcError::ErrorResp(
            alloy::rpc::json_rpc::ErrorPayload::internal_error(),
        ));
        assert!(matches!(DexError::from(node), DexError::Rpc { code: -32603, .. }));

        let other = alloy::contract::Error::NotADeploymentTransaction;
        assert!(matches!(DexError::from(other), DexError::Contract(_)));
    }
}
