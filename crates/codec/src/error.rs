use crate::payload::Payload;
use std::fmt::{Display, Formatter};
use tao_primitives::{Name, SpecVersion};


/// No decoding rule exists for the payload under the given runtime version
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct UnsupportedVersion {
    pub payload: Payload,
    pub spec_version: SpecVersion
}


impl Display for UnsupportedVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} has no decoding rule for spec version {}",
            self.payload,
            self.spec_version
        )
    }
}


impl std::error::Error for UnsupportedVersion {}


/// Raw bytes do not match the layout the version table promised.
///
/// Indicates a wrong version table entry, not bad chain data.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MalformedPayload {
    pub payload: Payload,
    pub spec_version: SpecVersion,
    pub signature: Name,
    pub reason: String
}


impl Display for MalformedPayload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to decode {} at spec version {} with layout {}: {}",
            self.payload,
            self.spec_version,
            self.signature,
            self.reason
        )
    }
}


impl std::error::Error for MalformedPayload {}
