use std::fmt::{Display, Formatter};
use tao_primitives::Name;


#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum PayloadKind {
    Event,
    Call,
    Storage
}


/// Closed set of chain payloads the indexer understands
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Payload {
    BalancesTransfer,
    NeuronRegistered,
    DifficultySet,
    WeightsSet,
    StakeAdded,
    AddStake,
    Burn
}


impl Payload {
    pub const ALL: [Payload; 7] = [
        Payload::BalancesTransfer,
        Payload::NeuronRegistered,
        Payload::DifficultySet,
        Payload::WeightsSet,
        Payload::StakeAdded,
        Payload::AddStake,
        Payload::Burn
    ];

    pub fn name(self) -> Name {
        match self {
            Payload::BalancesTransfer => "Balances.Transfer",
            Payload::NeuronRegistered => "SubtensorModule.NeuronRegistered",
            Payload::DifficultySet => "SubtensorModule.DifficultySet",
            Payload::WeightsSet => "SubtensorModule.WeightsSet",
            Payload::StakeAdded => "SubtensorModule.StakeAdded",
            Payload::AddStake => "SubtensorModule.add_stake",
            Payload::Burn => "SubtensorModule.Burn"
        }
    }

    pub fn kind(self) -> PayloadKind {
        match self {
            Payload::AddStake => PayloadKind::Call,
            Payload::Burn => PayloadKind::Storage,
            _ => PayloadKind::Event
        }
    }

    pub fn from_name(kind: PayloadKind, name: &str) -> Option<Payload> {
        Self::ALL.into_iter().find(|p| p.kind() == kind && p.name() == name)
    }

    pub fn names(kind: PayloadKind) -> Vec<String> {
        Self::ALL.into_iter()
            .filter(|p| p.kind() == kind)
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Canonical field order of the normalized record
    pub fn fields(self) -> &'static [Name] {
        match self {
            Payload::BalancesTransfer => &["from", "to", "amount"],
            Payload::NeuronRegistered => &["netuid", "uid", "hotkey"],
            Payload::DifficultySet => &["netuid", "difficulty"],
            Payload::WeightsSet => &["netuid", "uid"],
            Payload::StakeAdded => &["hotkey", "amount"],
            Payload::AddStake => &["hotkey", "amount_staked"],
            Payload::Burn => &["value"]
        }
    }
}


impl Display for Payload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
