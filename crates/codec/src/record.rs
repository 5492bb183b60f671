use crate::error::MalformedPayload;
use crate::payload::Payload;
use crate::value::{AccountId, Value};
use tao_primitives::{Name, SpecVersion};


/// Decoded payload with fields in canonical order, independent of the wire layout
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Record {
    pub payload: Payload,
    pub spec_version: SpecVersion,
    pub signature: Name,
    pub values: Vec<Value>
}


impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        let idx = self.payload.fields().iter().position(|f| *f == field)?;
        self.values.get(idx)
    }

    fn error(&self, reason: String) -> MalformedPayload {
        MalformedPayload {
            payload: self.payload,
            spec_version: self.spec_version,
            signature: self.signature,
            reason
        }
    }

    fn field(&self, field: &str) -> Result<&Value, MalformedPayload> {
        self.get(field).ok_or_else(|| self.error(format!("field `{}` is missing", field)))
    }

    pub fn u16(&self, field: &str) -> Result<u16, MalformedPayload> {
        self.field(field)?.as_u16().ok_or_else(|| {
            self.error(format!("field `{}` is not a u16", field))
        })
    }

    pub fn u128(&self, field: &str) -> Result<u128, MalformedPayload> {
        self.field(field)?.as_u128().ok_or_else(|| {
            self.error(format!("field `{}` is not an integer", field))
        })
    }

    pub fn account(&self, field: &str) -> Result<AccountId, MalformedPayload> {
        self.field(field)?.as_account().copied().ok_or_else(|| {
            self.error(format!("field `{}` is not an account id", field))
        })
    }
}


/// Typed view of a normalized [Record]
pub trait FromRecord: Sized {
    const PAYLOAD: Payload;

    fn from_record(record: &Record) -> Result<Self, MalformedPayload>;
}


#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Transfer {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: u128
}


impl FromRecord for Transfer {
    const PAYLOAD: Payload = Payload::BalancesTransfer;

    fn from_record(record: &Record) -> Result<Self, MalformedPayload> {
        Ok(Self {
            from: record.account("from")?,
            to: record.account("to")?,
            amount: record.u128("amount")?
        })
    }
}


#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct NeuronRegistered {
    pub netuid: u16,
    pub uid: u16,
    pub hotkey: AccountId
}


impl FromRecord for NeuronRegistered {
    const PAYLOAD: Payload = Payload::NeuronRegistered;

    fn from_record(record: &Record) -> Result<Self, MalformedPayload> {
        Ok(Self {
            netuid: record.u16("netuid")?,
            uid: record.u16("uid")?,
            hotkey: record.account("hotkey")?
        })
    }
}


#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DifficultySet {
    pub netuid: u16,
    pub difficulty: u128
}


impl FromRecord for DifficultySet {
    const PAYLOAD: Payload = Payload::DifficultySet;

    fn from_record(record: &Record) -> Result<Self, MalformedPayload> {
        Ok(Self {
            netuid: record.u16("netuid")?,
            difficulty: record.u128("difficulty")?
        })
    }
}


#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct WeightsSet {
    pub netuid: u16,
    pub uid: u16
}


impl FromRecord for WeightsSet {
    const PAYLOAD: Payload = Payload::WeightsSet;

    fn from_record(record: &Record) -> Result<Self, MalformedPayload> {
        Ok(Self {
            netuid: record.u16("netuid")?,
            uid: record.u16("uid")?
        })
    }
}


#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct StakeAdded {
    pub hotkey: AccountId,
    pub amount: u128
}


impl FromRecord for StakeAdded {
    const PAYLOAD: Payload = Payload::StakeAdded;

    fn from_record(record: &Record) -> Result<Self, MalformedPayload> {
        Ok(Self {
            hotkey: record.account("hotkey")?,
            amount: record.u128("amount")?
        })
    }
}


#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AddStake {
    pub hotkey: AccountId,
    pub amount_staked: u128
}


impl FromRecord for AddStake {
    const PAYLOAD: Payload = Payload::AddStake;

    fn from_record(record: &Record) -> Result<Self, MalformedPayload> {
        Ok(Self {
            hotkey: record.account("hotkey")?,
            amount_staked: record.u128("amount_staked")?
        })
    }
}


/// `SubtensorModule.Burn` storage value
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Burn(pub u128);


impl FromRecord for Burn {
    const PAYLOAD: Payload = Payload::Burn;

    fn from_record(record: &Record) -> Result<Self, MalformedPayload> {
        record.u128("value").map(Burn)
    }
}
