use std::marker::PhantomData;
use std::str::FromStr;


/// Lowercase `0x` prefixed hex string
pub type HexString = String;


struct HexParser;


impl<'de> serde::de::Visitor<'de> for HexParser {
    type Value = Vec<u8>;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "a 0x prefixed hex string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        decode_hex(v).map_err(|err| serde::de::Error::custom(err))
    }
}


struct StringParser<T> {
    phantom_data: PhantomData<T>
}


impl<T> StringParser<T> {
    pub fn new() -> Self {
        Self {
            phantom_data: PhantomData::default()
        }
    }
}


impl<'de, T: FromStr> serde::de::Visitor<'de> for StringParser<T> {
    type Value = T;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "a number or a string literal representing {}", std::any::type_name::<T>())
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        T::from_str(v).map_err(|_| {
            serde::de::Error::custom(
                format!("failed to deserialize `{}` as {}", v, std::any::type_name::<T>())
            )
        })
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        self.visit_str(&v.to_string())
    }
}


/// Accepts both `"123"` and `123`, the archive emits large integers as strings
pub fn decode_string<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where D: serde::Deserializer<'de>,
          T: FromStr
{
    deserializer.deserialize_any(StringParser::<T>::new())
}


pub fn deserialize_hex<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where D: serde::Deserializer<'de>
{
    deserializer.deserialize_str(HexParser)
}


pub fn decode_hex(s: &str) -> anyhow::Result<Vec<u8>> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return Ok(Vec::new())
    }
    anyhow::ensure!(digits.len() % 2 == 0, "odd number of hex digits in {}", s);
    let mut out = vec![0; digits.len() / 2];
    faster_hex::hex_decode(digits.as_bytes(), &mut out)?;
    Ok(out)
}


pub fn encode_hex(bytes: &[u8]) -> HexString {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    out.push_str(&faster_hex::hex_string(bytes));
    out
}


#[cfg(test)]
mod test {
    use super::{decode_hex, encode_hex};


    #[test]
    fn hex_conversions() {
        assert_eq!(decode_hex("0x00ff10").unwrap(), vec![0, 255, 16]);
        assert_eq!(decode_hex("0a").unwrap(), vec![10]);
        assert_eq!(encode_hex(&[0xde, 0xad]), "0xdead");
        assert!(decode_hex("0x123").is_err());
        assert!(decode_hex("0xzz").is_err());
    }
}
