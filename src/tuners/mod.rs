//! Which networks the receiver can currently tune to.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{debug, info};

pub mod orbital;

/// Network identifier of terrestrial services.
pub const TERRESTRIAL_NETWORK: u32 = 0xEEEE;
/// Network identifier of cable services.
pub const CABLE_NETWORK: u32 = 0xFFFF;

/// Satellite tuner modes that do not bring satellites of their own.
const DEPENDENT_SAT_MODES: [&str; 3] = ["loopthrough", "satposdepends", "nothing"];
const DISABLED_MODE: &str = "nothing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TunerKind {
    #[serde(rename = "dvb-s", alias = "DVB-S")]
    Satellite,
    #[serde(rename = "dvb-t", alias = "DVB-T")]
    Terrestrial,
    #[serde(rename = "dvb-c", alias = "DVB-C")]
    Cable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TunerConfig {
    pub kind: TunerKind,
    #[serde(default = "default_tuner_mode")]
    pub mode: String,
    /// Orbital positions a satellite tuner is set up for.
    #[serde(default, deserialize_with = "orbital::deserialize_orbitals")]
    pub satellites: Vec<u32>,
}

fn default_tuner_mode() -> String {
    "simple".to_string()
}

impl TunerConfig {
    /// Networks this tuner makes reachable.
    pub fn networks(&self) -> Vec<u32> {
        let mode = self.mode.as_str();
        match self.kind {
            TunerKind::Satellite if !DEPENDENT_SAT_MODES.contains(&mode) => self.satellites.clone(),
            TunerKind::Terrestrial if mode != DISABLED_MODE => vec![TERRESTRIAL_NETWORK],
            TunerKind::Cable if mode != DISABLED_MODE => vec![CABLE_NETWORK],
            _ => Vec::new(),
        }
    }
}

/// Collects the reachable network identifiers of all tuners.
pub fn reachable_networks(tuners: &[TunerConfig]) -> BTreeSet<u32> {
    let mut reachable = BTreeSet::new();
    for (slot, tuner) in tuners.iter().enumerate() {
        let networks = tuner.networks();
        debug!("Tuner {} ({:?}, mode {}): {:?}", slot, tuner.kind, tuner.mode, networks);
        reachable.extend(networks);
    }
    info!("Reachable networks: {:?}", reachable);
    reachable
}
