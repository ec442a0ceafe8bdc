//! Orbital positions, stored the way the receiver stores them: tenths of a
//! degree east, with west positions folded to `3600 - tenths`.

use anyhow::{anyhow, bail, Result};
use serde::de::{self, Deserializer};
use serde::Deserialize;

pub const FULL_CIRCLE: u32 = 3600;

/// Parses `192`, `19.2E`, `19.2e` or `30.0W`.
pub fn parse_orbital(value: &str) -> Result<u32> {
    let value = value.trim();
    let (number, west) = match value.char_indices().last() {
        Some((i, 'E' | 'e')) => (&value[..i], false),
        Some((i, 'W' | 'w')) => (&value[..i], true),
        Some(_) => {
            return value
                .parse::<u32>()
                .map_err(|e| anyhow!("invalid orbital position {:?}: {}", value, e));
        }
        None => bail!("empty orbital position"),
    };

    let degrees: f64 = number
        .trim()
        .parse()
        .map_err(|e| anyhow!("invalid orbital position {:?}: {}", value, e))?;
    if !(0.0..=180.0).contains(&degrees) {
        bail!("orbital position {:?} out of range", value);
    }
    let tenths = (degrees * 10.0).round() as u32;
    Ok(if west && tenths > 0 { FULL_CIRCLE - tenths } else { tenths })
}

/// Accepts orbital positions in config either as numbers or as strings.
pub fn deserialize_orbitals<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Orbital {
        Raw(u32),
        Text(String),
    }

    Vec::<Orbital>::deserialize(deserializer)?
        .into_iter()
        .map(|o| match o {
            Orbital::Raw(v) => Ok(v),
            Orbital::Text(s) => parse_orbital(&s).map_err(de::Error::custom),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_east_and_west() {
        assert_eq!(parse_orbital("19.2E").unwrap(), 192);
        assert_eq!(parse_orbital("13.0e").unwrap(), 130);
        assert_eq!(parse_orbital(" 28.2E ").unwrap(), 282);
        assert_eq!(parse_orbital("30.0W").unwrap(), 3300);
        assert_eq!(parse_orbital("0.8W").unwrap(), 3592);
        assert_eq!(parse_orbital("0.0W").unwrap(), 0);
    }

    #[test]
    fn test_parse_raw() {
        assert_eq!(parse_orbital("192").unwrap(), 192);
        assert_eq!(parse_orbital("3592").unwrap(), 3592);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_orbital("").is_err());
        assert!(parse_orbital("E").is_err());
        assert!(parse_orbital("Astra").is_err());
        assert!(parse_orbital("190.0E").is_err());
    }
}
