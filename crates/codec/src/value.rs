use codec::Decode;


pub type AccountId = [u8; 32];


#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FieldType {
    U16,
    U64,
    U128,
    AccountId
}


#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Value {
    U16(u16),
    U64(u64),
    U128(u128),
    AccountId(AccountId)
}


impl FieldType {
    pub(crate) fn decode(self, input: &mut &[u8]) -> Result<Value, codec::Error> {
        Ok(match self {
            FieldType::U16 => Value::U16(u16::decode(input)?),
            FieldType::U64 => Value::U64(u64::decode(input)?),
            FieldType::U128 => Value::U128(u128::decode(input)?),
            FieldType::AccountId => Value::AccountId(AccountId::decode(input)?)
        })
    }
}


impl Value {
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Value::U16(v) => Some(*v),
            _ => None
        }
    }

    /// Any integer widened to `u128`
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Value::U16(v) => Some(*v as u128),
            Value::U64(v) => Some(*v as u128),
            Value::U128(v) => Some(*v),
            Value::AccountId(_) => None
        }
    }

    pub fn as_account(&self) -> Option<&AccountId> {
        match self {
            Value::AccountId(id) => Some(id),
            _ => None
        }
    }
}
