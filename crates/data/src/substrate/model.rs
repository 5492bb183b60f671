use crate::types::{decode_string, deserialize_hex, HexString};
use serde::Deserialize;
use tao_primitives::{BlockNumber, ItemIndex, SpecVersion};


#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub height: BlockNumber,
    pub hash: HexString,
    pub parent_hash: HexString,
    pub spec_name: Option<String>,
    pub spec_version: SpecVersion,
    #[serde(deserialize_with = "decode_string")]
    pub timestamp: u64,
}


#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Globally unique id, e.g. `0000001000-000000-a1b2c`
    pub id: String,
    pub index: ItemIndex,
    pub name: String,
    /// SCALE encoded event payload
    #[serde(deserialize_with = "deserialize_hex")]
    pub args: Vec<u8>,
    pub extrinsic_index: Option<ItemIndex>,
}


#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub id: String,
    pub extrinsic_index: ItemIndex,
    #[serde(default)]
    pub address: Vec<ItemIndex>,
    pub name: String,
    /// SCALE encoded call arguments
    #[serde(deserialize_with = "deserialize_hex")]
    pub args: Vec<u8>,
    #[serde(default = "default_success")]
    pub success: bool,
}


fn default_success() -> bool {
    true
}


#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub header: BlockHeader,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub calls: Vec<Call>,
}


impl Block {
    pub fn from_json_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        serde_json::from_slice(bytes).map_err(|err| err.into())
    }
}


impl tao_primitives::Block for Block {
    fn number(&self) -> BlockNumber {
        self.header.height
    }

    fn hash(&self) -> &str {
        &self.header.hash
    }

    fn parent_hash(&self) -> &str {
        &self.header.parent_hash
    }
}
