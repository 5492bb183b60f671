use std::fmt::{Display, Formatter};


pub type Name = &'static str;
pub type BlockNumber = u64;
pub type ItemIndex = u32;

/// Runtime spec version the block was produced under
pub type SpecVersion = u32;

pub type Netuid = u16;


#[cfg_attr(feature = "borsh", derive(borsh::BorshSerialize, borsh::BorshDeserialize))]
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct BlockRef {
    pub number: BlockNumber,
    pub hash: String
}


impl BlockRef {
    pub fn new(number: BlockNumber, hash: &str) -> Self {
        Self {
            number,
            hash: hash.to_string()
        }
    }
}


impl Display for BlockRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.number, self.hash)
    }
}


pub trait Block {
    fn number(&self) -> BlockNumber;

    fn hash(&self) -> &str;

    fn parent_hash(&self) -> &str;
}
