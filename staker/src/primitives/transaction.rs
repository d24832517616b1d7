use serde::{Deserialize, Serialize};

use super::Amount;

/// Payload class a wallet prices a fee estimate for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadType {
    Bond,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum TransactionType {
    Bond {
        validator: String,
        public_key: String,
        stake: Amount,
    },
}

impl TransactionType {
    pub fn payload_type(&self) -> PayloadType {
        match self {
            TransactionType::Bond { .. } => PayloadType::Bond,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub sender: String,
    pub tx_type: TransactionType,
    pub fee: Amount,
    pub memo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Transaction {
    pub fn new(sender: String, tx_type: TransactionType, fee: Amount) -> Self {
        Transaction {
            sender,
            tx_type,
            fee,
            memo: String::new(),
            signature: None,
        }
    }

    /// Bytes covered by the signature.
    pub fn sign_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let unsigned = Transaction {
            signature: None,
            ..self.clone()
        };
        serde_json::to_vec(&unsigned)
    }

    pub fn bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}
