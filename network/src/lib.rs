//! Local devnet node backing the staker's wallet and chain interfaces.
//!
//! Node state and wallets are JSON files; a bond broadcast through a wallet
//! updates the node state and is written back to disk.

pub mod client;
pub mod message;
pub mod network_error;
pub mod node;
pub mod wallet;

pub use client::{LocalNetwork, NodeClient, SharedNode};
pub use network_error::NetworkError;
pub use node::{LocalNode, NodeState, ValidatorRecord};
pub use wallet::{FileWallet, ValidatorEntry, WalletFile};
