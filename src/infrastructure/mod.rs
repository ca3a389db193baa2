//! Infrastructure layer - reading DEX and token state

pub mod contracts;
pub mod dex_reader;
pub mod rpc_reader;
pub mod snapshot_reader;

pub use dex_reader::DexReader;
pub use rpc_reader::RpcDexReader;
pub use snapshot_reader::StaticDexReader;
