use crate::error::{MalformedPayload, UnsupportedVersion};
use crate::payload::{Payload, PayloadKind};
use crate::record::{FromRecord, Record};
use crate::rules::{DecodeRule, Layout, RULES};
use crate::value::Value;
use anyhow::{anyhow, ensure};
use std::collections::HashMap;
use tao_primitives::SpecVersion;


/// Decodes raw payloads into version independent records.
///
/// Every `(payload, spec_version)` pair maps to exactly one [DecodeRule].
/// Pairs outside the table are rejected, never guessed.
#[derive(Debug, Clone)]
pub struct VersionedCodec {
    table: HashMap<(Payload, SpecVersion), &'static DecodeRule>
}


impl Default for VersionedCodec {
    fn default() -> Self {
        Self::new()
    }
}


impl VersionedCodec {
    pub fn new() -> Self {
        let mut table = HashMap::new();
        for rule in RULES.iter() {
            for v in rule.spec_versions.iter() {
                table.insert((rule.payload, *v), rule);
            }
        }
        Self { table }
    }

    /// Maps additional runtime versions onto an already known layout
    pub fn extend(&mut self, signature: &str, spec_versions: &[SpecVersion]) -> anyhow::Result<()> {
        let rule = RULES.iter()
            .find(|rule| rule.signature == signature)
            .ok_or_else(|| anyhow!("unknown payload layout {}", signature))?;

        for v in spec_versions.iter().copied() {
            if let Some(existing) = self.table.get(&(rule.payload, v)) {
                ensure!(
                    existing.signature == rule.signature,
                    "{} at spec version {} is already decoded with layout {}",
                    rule.payload,
                    v,
                    existing.signature
                );
            }
            self.table.insert((rule.payload, v), rule);
        }
        Ok(())
    }

    pub fn supports(&self, spec_version: SpecVersion, payload: Payload) -> bool {
        self.table.contains_key(&(payload, spec_version))
    }

    pub fn rule(&self, spec_version: SpecVersion, payload: Payload) -> Result<&'static DecodeRule, UnsupportedVersion> {
        self.table.get(&(payload, spec_version)).copied().ok_or(UnsupportedVersion {
            payload,
            spec_version
        })
    }

    pub fn decode(&self, spec_version: SpecVersion, payload: Payload, raw: &[u8]) -> anyhow::Result<Record> {
        let rule = self.rule(spec_version, payload)?;
        let values = decode_layout(rule, raw).map_err(|reason| MalformedPayload {
            payload,
            spec_version,
            signature: rule.signature,
            reason
        })?;
        Ok(Record {
            payload,
            spec_version,
            signature: rule.signature,
            values
        })
    }

    pub fn decode_as<T: FromRecord>(&self, spec_version: SpecVersion, raw: &[u8]) -> anyhow::Result<T> {
        let record = self.decode(spec_version, T::PAYLOAD, raw)?;
        Ok(T::from_record(&record)?)
    }

    /// Decodes a storage value, substituting the entry default when the chain has none
    pub fn decode_storage_as<T: FromRecord>(
        &self,
        spec_version: SpecVersion,
        raw: Option<&[u8]>
    ) -> anyhow::Result<T> {
        ensure!(
            T::PAYLOAD.kind() == PayloadKind::Storage,
            "{} is not a storage item",
            T::PAYLOAD
        );
        let raw = match raw {
            Some(raw) => raw,
            None => self.rule(spec_version, T::PAYLOAD)?.default.ok_or_else(|| {
                anyhow!("{} has no value and no default at spec version {}", T::PAYLOAD, spec_version)
            })?
        };
        self.decode_as(spec_version, raw)
    }
}


fn decode_layout(rule: &DecodeRule, raw: &[u8]) -> Result<Vec<Value>, String> {
    let fields = rule.payload.fields();
    let mut input = raw;

    let values = match rule.layout {
        Layout::Tuple(types) => {
            if types.len() != fields.len() {
                return Err(format!(
                    "tuple of {} elements can't represent {} fields",
                    types.len(),
                    fields.len()
                ))
            }
            types.iter()
                .map(|ty| ty.decode(&mut input))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| err.to_string())?
        },
        Layout::Struct(named) => {
            let mut decoded = Vec::with_capacity(named.len());
            for (name, ty) in named.iter() {
                let value = ty.decode(&mut input).map_err(|err| {
                    format!("field `{}`: {}", name, err)
                })?;
                decoded.push((*name, value));
            }
            fields.iter().map(|field| {
                decoded.iter()
                    .find(|(name, _)| name == field)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| format!("layout has no field `{}`", field))
            }).collect::<Result<Vec<_>, _>>()?
        }
    };

    if !input.is_empty() {
        return Err(format!("{} trailing bytes", input.len()))
    }

    Ok(values)
}
