use std::{fs::read_to_string, path::Path};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracker_common::{
    tiny_aprs::{AprsFlags, AprsIcon, AprsIdentity, MAX_PATH},
    tracker::scheduler::SchedulerConfig,
};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TrackerConfigSerde {
    pub identity: IdentitySerde,
    #[serde(default)]
    pub scheduler: SchedulerConfigSerde,
}

impl Default for TrackerConfigSerde {
    fn default() -> Self {
        Self {
            identity: IdentitySerde {
                source: "N0CALL".into(),
                dest: "APLT00".into(),
                path: vec!["WIDE1-1".into()],
                symbol: SymbolSerde::Preset {
                    icon: AprsIconSerde::Car,
                },
                comment: String::new(),
                add_dao: true,
                add_frame_counter: true,
                compress_location: false,
            },
            scheduler: SchedulerConfigSerde::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IdentitySerde {
    pub source: String,
    pub dest: String,
    #[serde(default)]
    pub path: Vec<String>,
    pub symbol: SymbolSerde,
    #[serde(default)]
    pub comment: String,
    pub add_dao: bool,
    pub add_frame_counter: bool,
    #[serde(default)]
    pub compress_location: bool,
}

impl IdentitySerde {
    fn into_identity(self) -> Result<AprsIdentity> {
        if self.path.len() > MAX_PATH {
            return Err(anyhow!(
                "path has {} entries, at most {} are allowed",
                self.path.len(),
                MAX_PATH
            ));
        }

        let mut identity = AprsIdentity::new(&self.source, &self.dest);
        for call in &self.path {
            identity.add_path(call);
        }
        match self.symbol {
            SymbolSerde::Preset { icon } => identity.set_icon_default(icon.into()),
            SymbolSerde::Custom { table, symbol } => identity.set_icon(table, symbol),
        }
        identity.set_comment(&self.comment);
        identity.flags = AprsFlags {
            add_dao: self.add_dao,
            add_frame_counter: self.add_frame_counter,
            compress_location: self.compress_location,
        };
        Ok(identity)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "kind")]
pub enum SymbolSerde {
    Preset { icon: AprsIconSerde },
    Custom { table: char, symbol: char },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub enum AprsIconSerde {
    X,
    Jogger,
    Bike,
    Car,
    Jeep,
    Van,
    Truck,
    Bus,
    Balloon,
    RecreationalVehicle,
    Helicopter,
    Yacht,
    Ambulance,
    FireTruck,
    Ship,
}

impl From<AprsIconSerde> for AprsIcon {
    fn from(icon: AprsIconSerde) -> Self {
        match icon {
            AprsIconSerde::X => AprsIcon::X,
            AprsIconSerde::Jogger => AprsIcon::Jogger,
            AprsIconSerde::Bike => AprsIcon::Bike,
            AprsIconSerde::Car => AprsIcon::Car,
            AprsIconSerde::Jeep => AprsIcon::Jeep,
            AprsIconSerde::Van => AprsIcon::Van,
            AprsIconSerde::Truck => AprsIcon::Truck,
            AprsIconSerde::Bus => AprsIcon::Bus,
            AprsIconSerde::Balloon => AprsIcon::Balloon,
            AprsIconSerde::RecreationalVehicle => AprsIcon::RecreationalVehicle,
            AprsIconSerde::Helicopter => AprsIcon::Helicopter,
            AprsIconSerde::Yacht => AprsIcon::Yacht,
            AprsIconSerde::Ambulance => AprsIcon::Ambulance,
            AprsIconSerde::FireTruck => AprsIcon::FireTruck,
            AprsIconSerde::Ship => AprsIcon::Ship,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SchedulerConfigSerde {
    pub min_tx_interval_ms: u64,
    pub max_tx_interval_ms: u64,
    pub max_distance_m: f32,
    pub max_heading_delta_deg: f32,
    pub heading_check_min_speed: f32,
    pub wx_interval_ms: Option<u64>,
}

impl Default for SchedulerConfigSerde {
    fn default() -> Self {
        let config = SchedulerConfig::default();
        Self {
            min_tx_interval_ms: config.min_tx_interval_ms,
            max_tx_interval_ms: config.max_tx_interval_ms,
            max_distance_m: config.max_distance_m,
            max_heading_delta_deg: config.max_heading_delta_deg,
            heading_check_min_speed: config.heading_check_min_speed,
            wx_interval_ms: config.wx_interval_ms,
        }
    }
}

impl From<SchedulerConfigSerde> for SchedulerConfig {
    fn from(config: SchedulerConfigSerde) -> Self {
        SchedulerConfig {
            min_tx_interval_ms: config.min_tx_interval_ms,
            max_tx_interval_ms: config.max_tx_interval_ms,
            max_distance_m: config.max_distance_m,
            max_heading_delta_deg: config.max_heading_delta_deg,
            heading_check_min_speed: config.heading_check_min_speed,
            wx_interval_ms: config.wx_interval_ms,
        }
    }
}

pub struct TrackerConfig {
    pub identity: AprsIdentity,
    pub scheduler: SchedulerConfig,
}

impl TryFrom<TrackerConfigSerde> for TrackerConfig {
    type Error = anyhow::Error;

    fn try_from(config: TrackerConfigSerde) -> Result<Self> {
        Ok(TrackerConfig {
            identity: config.identity.into_identity()?,
            scheduler: config.scheduler.into(),
        })
    }
}

pub fn read_tracker_config<P: AsRef<Path>>(path: P) -> Result<TrackerConfig> {
    let config = read_to_string(path)?;
    let config: TrackerConfigSerde = serde_json::from_str(&config)?;
    config.try_into()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_config() {
        let config = read_tracker_config("./test-configs/tracker.json").unwrap();

        let identity = &config.identity;
        assert_eq!(identity.source.as_str(), "N0CALL-7");
        assert_eq!(identity.dest.as_str(), "APLT00");
        assert_eq!(identity.path.len(), 1);
        assert_eq!(identity.path[0].as_str(), "WIDE1-1");
        assert_eq!((identity.table, identity.symbol), ('/', '>'));
        assert_eq!(identity.comment.as_str(), "tracker-cli");
        assert!(identity.flags.add_dao);

        assert_eq!(config.scheduler.min_tx_interval_ms, 15_000);
        assert_eq!(config.scheduler.wx_interval_ms, None);
    }

    #[test]
    fn missing_scheduler_uses_defaults() {
        let json = r#"{
            "identity": {
                "source": "N0CALL",
                "dest": "APRS",
                "symbol": { "kind": "Custom", "table": "\\", "symbol": "k" },
                "add_dao": false,
                "add_frame_counter": false
            }
        }"#;
        let config: TrackerConfig = serde_json::from_str::<TrackerConfigSerde>(json)
            .unwrap()
            .try_into()
            .unwrap();

        assert_eq!((config.identity.table, config.identity.symbol), ('\\', 'k'));
        assert!(config.identity.path.is_empty());
        assert_eq!(config.scheduler, SchedulerConfig::default());
    }

    #[test]
    fn too_many_path_entries() {
        let mut config = TrackerConfigSerde::default();
        config.identity.path = vec!["WIDE1-1".to_string(); MAX_PATH + 1];
        assert!(TrackerConfig::try_from(config).is_err());
    }
}
