use crate::payload::Payload;
use crate::value::FieldType::{self, AccountId, U16, U64};
use tao_primitives::{Name, SpecVersion};


/// Binary shape of a payload under some runtime
#[derive(Debug, Clone, Copy)]
pub enum Layout {
    /// Positional fields, mapped onto the canonical field order
    Tuple(&'static [FieldType]),
    /// Named fields in wire order
    Struct(&'static [(Name, FieldType)])
}


#[derive(Debug, Clone, Copy)]
pub struct DecodeRule {
    pub payload: Payload,
    /// Runtime type hash of the layout
    pub signature: Name,
    pub spec_versions: &'static [SpecVersion],
    pub layout: Layout,
    /// SCALE encoded value returned for an absent storage entry
    pub default: Option<&'static [u8]>
}


const NAKAMOTO_LEGACY: &[SpecVersion] = &[100, 101];

const NAKAMOTO: &[SpecVersion] = &[
    102, 103, 104, 105, 106, 107, 108, 109, 110, 111, 112, 113, 114, 115, 116, 117, 118
];

const FINNEY: &[SpecVersion] = &[
    120, 121, 122, 123, 124, 125, 126, 127, 128, 129, 130, 131, 132, 133
];


const TRANSFER_STRUCT: &[(Name, FieldType)] = &[
    ("from", AccountId),
    ("to", AccountId),
    ("amount", U64)
];


pub static RULES: &[DecodeRule] = &[
    DecodeRule {
        payload: Payload::BalancesTransfer,
        signature: "dad2bcdca357505fa3c7832085d0db53ce6f902bd9f5b52823ee8791d351872c",
        spec_versions: NAKAMOTO_LEGACY,
        layout: Layout::Tuple(&[AccountId, AccountId, U64]),
        default: None
    },
    DecodeRule {
        payload: Payload::BalancesTransfer,
        signature: "0ffdf35c495114c2d42a8bf6c241483fd5334ca0198662e14480ad040f1e3a66",
        spec_versions: NAKAMOTO,
        layout: Layout::Struct(TRANSFER_STRUCT),
        default: None
    },
    DecodeRule {
        payload: Payload::BalancesTransfer,
        signature: "6bf095c280a1e7d2e72f60befe24c50c552cb3a8ee966ed5f8f645d2ea542007",
        spec_versions: FINNEY,
        layout: Layout::Struct(TRANSFER_STRUCT),
        default: None
    },
    DecodeRule {
        payload: Payload::NeuronRegistered,
        signature: "3c8da4069aae1f785fc41d706f3990947422f58b54afec215dd7893174b769ab",
        spec_versions: FINNEY,
        layout: Layout::Tuple(&[U16, U16, AccountId]),
        default: None
    },
    DecodeRule {
        payload: Payload::DifficultySet,
        signature: "63497f5b43ccaec48c63c145483201d1401c337201351f20084f825c2c167674",
        spec_versions: FINNEY,
        layout: Layout::Tuple(&[U16, U64]),
        default: None
    },
    DecodeRule {
        payload: Payload::WeightsSet,
        signature: "dad8cc7e7c9eb6faac84e0abde9fee1c92b9491647a7e864095f4f3d3a60fa82",
        spec_versions: FINNEY,
        layout: Layout::Tuple(&[U16, U16]),
        default: None
    },
    DecodeRule {
        payload: Payload::StakeAdded,
        signature: "fb1b6c83a547837ce9f07d7b623e71a4fec6cea1d51d01009d24c5a20e53d816",
        spec_versions: FINNEY,
        layout: Layout::Tuple(&[AccountId, U64]),
        default: None
    },
    DecodeRule {
        payload: Payload::AddStake,
        signature: "e57b2ac4bf7fde694b19ed828cae94b8dc7efb7fa05d51c0e2bed4a307c2532a",
        spec_versions: FINNEY,
        layout: Layout::Struct(&[("hotkey", AccountId), ("amount_staked", U64)]),
        default: None
    },
    DecodeRule {
        payload: Payload::Burn,
        signature: "d3e59d805c520391cc625ad2bf03c6f9aa8ff3a07b1e6c16d11a34fd9c5392a9",
        spec_versions: FINNEY,
        layout: Layout::Tuple(&[U64]),
        // 1_000_000_000
        default: Some(&[0x00, 0xca, 0x9a, 0x3b, 0, 0, 0, 0])
    }
];
