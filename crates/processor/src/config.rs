use anyhow::{anyhow, ensure, Context};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tao_codec::{Payload, VersionedCodec, RULES};
use tao_primitives::{Netuid, SpecVersion};


#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Tracked metrics are re-read from chain state every N blocks
    #[serde(default = "default_resync_interval")]
    pub resync_interval: u64,
    #[serde(default = "default_tracked_netuids")]
    pub tracked_netuids: Vec<Netuid>,
    #[serde(default = "default_ss58_prefix")]
    pub ss58_prefix: u16,
    /// Payload name -> layout signature -> additional spec versions
    #[serde(default)]
    pub runtime_versions: BTreeMap<String, BTreeMap<String, Vec<SpecVersion>>>
}


fn default_resync_interval() -> u64 {
    50
}


fn default_tracked_netuids() -> Vec<Netuid> {
    vec![1, 3, 11, 21]
}


fn default_ss58_prefix() -> u16 {
    42
}


impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            resync_interval: default_resync_interval(),
            tracked_netuids: default_tracked_netuids(),
            ss58_prefix: default_ss58_prefix(),
            runtime_versions: BTreeMap::new()
        }
    }
}


impl ProcessorConfig {
    pub fn read_config_file(file: &str) -> anyhow::Result<Self> {
        let reader = std::io::BufReader::new(
            std::fs::File::open(file).with_context(|| format!("failed to open {}", file))?
        );
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.resync_interval > 0, "resync_interval must be positive");
        ensure!(self.ss58_prefix < 16384, "ss58_prefix {} is out of range", self.ss58_prefix);

        let mut seen = BTreeSet::new();
        for netuid in self.tracked_netuids.iter() {
            ensure!(seen.insert(*netuid), "netuid {} is tracked twice", netuid);
        }

        for (name, layouts) in self.runtime_versions.iter() {
            let payload = Payload::ALL.into_iter()
                .find(|p| p.name() == name.as_str())
                .ok_or_else(|| anyhow!("unknown payload {}", name))?;

            for signature in layouts.keys() {
                let rule = RULES.iter()
                    .find(|rule| rule.signature == signature.as_str())
                    .ok_or_else(|| anyhow!("unknown layout {} of {}", signature, name))?;
                ensure!(
                    rule.payload == payload,
                    "layout {} belongs to {}, not {}",
                    signature,
                    rule.payload,
                    name
                );
            }
        }
        Ok(())
    }

    /// Built-in version table extended with `runtime_versions`
    pub fn build_codec(&self) -> anyhow::Result<VersionedCodec> {
        self.validate()?;
        let mut codec = VersionedCodec::new();
        for (name, layouts) in self.runtime_versions.iter() {
            for (signature, versions) in layouts.iter() {
                codec.extend(signature, versions).with_context(|| {
                    format!("invalid runtime_versions entry for {}", name)
                })?;
            }
        }
        Ok(codec)
    }
}
