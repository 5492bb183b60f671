use borsh::{BorshDeserialize, BorshSerialize};
use std::fmt::{Display, Formatter};
use tao_primitives::{BlockNumber, Netuid};


#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum EntityKind {
    Coldkey,
    Hotkey,
    Transfer,
    NeuronRegistered,
    Burn
}


impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Coldkey,
        EntityKind::Hotkey,
        EntityKind::Transfer,
        EntityKind::NeuronRegistered,
        EntityKind::Burn
    ];

    /// Key prefix byte, must never change for a given kind
    pub(crate) fn tag(self) -> u8 {
        match self {
            EntityKind::Coldkey => 1,
            EntityKind::Hotkey => 2,
            EntityKind::Transfer => 3,
            EntityKind::NeuronRegistered => 4,
            EntityKind::Burn => 5
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Coldkey => "coldkey",
            EntityKind::Hotkey => "hotkey",
            EntityKind::Transfer => "transfer",
            EntityKind::NeuronRegistered => "neuron_registered",
            EntityKind::Burn => "burn"
        }
    }
}


impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}


pub trait Entity: BorshSerialize + BorshDeserialize + Clone {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Zero valued instance for a never seen id
    fn create(id: &str) -> Self;

    /// `(netuid, block)` position for "latest per netuid" lookups
    fn series(&self) -> Option<(Netuid, BlockNumber)> {
        None
    }
}


/// Account balance, updated by every transfer it takes part in
#[derive(Debug, Clone, Default, Eq, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct Coldkey {
    pub id: String,
    pub balance: i128,
    pub block_num: BlockNumber
}


#[derive(Debug, Clone, Default, Eq, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct Hotkey {
    pub id: String
}


#[derive(Debug, Clone, Default, Eq, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct Transfer {
    pub id: String,
    pub block_hash: String,
    pub amount: u128,
    pub block_num: BlockNumber,
    pub timestamp: u64,
    pub from: String,
    pub to: String
}


#[derive(Debug, Clone, Default, Eq, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct NeuronRegistered {
    pub id: String,
    pub block_num: BlockNumber,
    pub timestamp: u64,
    pub netuid: Netuid,
    pub uid: u16,
    pub hotkey: String
}


/// Change log row of the subnet registration burn.
///
/// Difficulty changes are recorded into the same series.
#[derive(Debug, Clone, Default, Eq, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct Burn {
    pub id: String,
    pub block_num: BlockNumber,
    pub timestamp: u64,
    pub amount: i128,
    pub netuid: Netuid
}


macro_rules! impl_entity {
    ($t:ident, $kind:expr) => {
        impl Entity for $t {
            const KIND: EntityKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn create(id: &str) -> Self {
                Self {
                    id: id.to_string(),
                    ..Default::default()
                }
            }
        }
    };
}


impl_entity!(Coldkey, EntityKind::Coldkey);
impl_entity!(Hotkey, EntityKind::Hotkey);
impl_entity!(Transfer, EntityKind::Transfer);
impl_entity!(NeuronRegistered, EntityKind::NeuronRegistered);


impl Entity for Burn {
    const KIND: EntityKind = EntityKind::Burn;

    fn id(&self) -> &str {
        &self.id
    }

    fn create(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    fn series(&self) -> Option<(Netuid, BlockNumber)> {
        Some((self.netuid, self.block_num))
    }
}
