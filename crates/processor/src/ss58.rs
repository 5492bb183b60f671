use blake2::{Blake2b512, Digest};


/// Human readable form of raw account ids
pub trait AddressEncoder: Send + Sync {
    fn encode(&self, account: &[u8]) -> String;
}


/// SS58 address format
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Ss58 {
    prefix: u16
}


impl Default for Ss58 {
    fn default() -> Self {
        Self::new(42)
    }
}


impl Ss58 {
    /// Prefixes above 16383 can't be represented
    pub fn new(prefix: u16) -> Self {
        Self {
            prefix: prefix & 0b0011_1111_1111_1111
        }
    }

    pub fn prefix(&self) -> u16 {
        self.prefix
    }

    fn prefix_bytes(&self) -> Vec<u8> {
        let ident = self.prefix;
        if ident < 64 {
            vec![ident as u8]
        } else {
            let first = ((ident & 0b0000_0000_1111_1100) as u8) >> 2;
            let second = ((ident >> 8) as u8) | (((ident & 0b0000_0000_0000_0011) as u8) << 6);
            vec![first | 0b0100_0000, second]
        }
    }
}


impl AddressEncoder for Ss58 {
    fn encode(&self, account: &[u8]) -> String {
        let mut data = self.prefix_bytes();
        data.extend_from_slice(account);

        let checksum = Blake2b512::new()
            .chain_update(b"SS58PRE")
            .chain_update(&data)
            .finalize();

        data.extend_from_slice(&checksum[..2]);
        bs58::encode(data).into_string()
    }
}
