use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use log::debug;
use staker::primitives::{BlockchainInfo, ValidatorInfo};
use staker::provider::{ChainConnector, ChainQuery, WalletOpener, WalletOptions, WalletService};
use staker::ServiceError;

use crate::message::{MessageHandler, Request, Response};
use crate::network_error::NetworkError;
use crate::node::LocalNode;
use crate::wallet::{FileWallet, WalletFile};

pub type SharedNode = Rc<RefCell<LocalNode>>;

pub struct NodeClient {
    node: SharedNode,
}

impl NodeClient {
    pub fn new(node: SharedNode) -> Self {
        Self { node }
    }

    fn request(&self, request: Request) -> Result<Response, NetworkError> {
        self.node.borrow_mut().receive(&request)
    }
}

impl ChainQuery for NodeClient {
    fn blockchain_info(&self) -> Result<BlockchainInfo, ServiceError> {
        match self.request(Request::GetBlockchainInfo)? {
            Response::BlockchainInfo {
                last_block_height,
                total_validators,
                total_stake,
            } => Ok(BlockchainInfo {
                last_block_height,
                total_validators,
                total_stake,
            }),
            other => Err(ServiceError::Unavailable(format!("unexpected response: {:?}", other))),
        }
    }

    fn validator(&self, address: &str) -> Result<ValidatorInfo, ServiceError> {
        match self.request(Request::GetValidator(address.to_string()))? {
            Response::Validator {
                address,
                number,
                stake,
                availability_score,
            } => Ok(ValidatorInfo {
                address,
                number,
                stake,
                availability_score,
            }),
            other => Err(ServiceError::Unavailable(format!("unexpected response: {:?}", other))),
        }
    }
}

/// Devnet endpoints, one node per state file. Wallets and chain clients
/// opened against the same endpoint share the node.
pub struct LocalNetwork {
    default_endpoint: String,
    nodes: RefCell<HashMap<String, SharedNode>>,
}

impl LocalNetwork {
    pub fn new(default_endpoint: impl Into<String>) -> Self {
        Self {
            default_endpoint: default_endpoint.into(),
            nodes: RefCell::new(HashMap::new()),
        }
    }

    pub fn node(&self, endpoint: &str) -> Result<SharedNode, NetworkError> {
        if let Some(node) = self.nodes.borrow().get(endpoint) {
            return Ok(node.clone());
        }
        let node = Rc::new(RefCell::new(LocalNode::load(endpoint)?));
        self.nodes
            .borrow_mut()
            .insert(endpoint.to_string(), node.clone());
        Ok(node)
    }
}

impl ChainConnector for LocalNetwork {
    fn connect(
        &self,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Box<dyn ChainQuery>, ServiceError> {
        debug!("dialing {} (timeout {:?})", endpoint, timeout);
        Ok(Box::new(NodeClient::new(self.node(endpoint)?)))
    }
}

impl WalletOpener for LocalNetwork {
    fn open(
        &self,
        path: &Path,
        options: &WalletOptions,
    ) -> Result<Box<dyn WalletService>, ServiceError> {
        let file = WalletFile::load(path)?;
        let endpoint = options
            .custom_servers
            .first()
            .map_or(self.default_endpoint.as_str(), String::as_str);
        let node = self.node(endpoint)?;
        Ok(Box::new(FileWallet::new(file, Some(node))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeState;
    use crate::wallet::ValidatorEntry;
    use staker::Amount;
    use std::fs;

    #[test]
    fn test_wallets_and_client_share_node() {
        let dir = tempfile::tempdir().unwrap();
        let node_path = dir.path().join("node.json");
        let mut state = NodeState::default();
        state
            .accounts
            .insert("acc1".to_string(), Amount::from_whole_coins(7));
        fs::write(&node_path, serde_json::to_vec(&state).unwrap()).unwrap();

        let wallet_path = dir.path().join("wallet.json");
        WalletFile {
            accounts: vec!["acc1".to_string()],
            validators: vec![ValidatorEntry {
                address: "val1".to_string(),
                public_key: "pub1".to_string(),
            }],
            password_hash: WalletFile::hash_password("pw"),
        }
        .save(&wallet_path)
        .unwrap();

        let endpoint = node_path.to_str().unwrap();
        let network = LocalNetwork::new(endpoint);
        let client = network.connect(endpoint, Duration::from_secs(10)).unwrap();
        let wallet = network
            .open(&wallet_path, &WalletOptions::default())
            .unwrap();

        assert_eq!(client.blockchain_info().unwrap().last_block_height, 0);
        assert!(client.validator("val1").unwrap_err().is_not_found());
        assert_eq!(wallet.balance("acc1").unwrap(), Amount::from_whole_coins(7));
        assert!(Rc::ptr_eq(
            &network.node(endpoint).unwrap(),
            &network.node(endpoint).unwrap()
        ));
    }

    #[test]
    fn test_missing_endpoint() {
        let network = LocalNetwork::new("/nonexistent/node.json");
        assert!(matches!(
            network.connect("/nonexistent/node.json", Duration::from_secs(1)),
            Err(ServiceError::Io(_))
        ));
    }
}
