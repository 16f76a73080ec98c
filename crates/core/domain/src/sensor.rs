//! 传感器类型与各类型固定的指标 schema。

use crate::error::ReadingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 传感器类型（同时是存储表的分区键）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Building,
    Hvac,
    Dhw,
    Lighting,
    Occupancy,
    Environment,
    GatewayHealth,
    Network,
    UnitPanel,
    UnitAppliance,
    SpaceTemperature,
}

impl SensorType {
    pub const ALL: [SensorType; 11] = [
        SensorType::Building,
        SensorType::Hvac,
        SensorType::Dhw,
        SensorType::Lighting,
        SensorType::Occupancy,
        SensorType::Environment,
        SensorType::GatewayHealth,
        SensorType::Network,
        SensorType::UnitPanel,
        SensorType::UnitAppliance,
        SensorType::SpaceTemperature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Building => "building",
            SensorType::Hvac => "hvac",
            SensorType::Dhw => "dhw",
            SensorType::Lighting => "lighting",
            SensorType::Occupancy => "occupancy",
            SensorType::Environment => "environment",
            SensorType::GatewayHealth => "gateway_health",
            SensorType::Network => "network",
            SensorType::UnitPanel => "unit_panel",
            SensorType::UnitAppliance => "unit_appliance",
            SensorType::SpaceTemperature => "space_temperature",
        }
    }

    /// 该类型读数必须携带的全部指标键（顺序即线格式中的字段顺序）。
    pub fn metric_keys(&self) -> &'static [&'static str] {
        match self {
            SensorType::Building => &["total_energy_kwh", "demand_kw"],
            SensorType::Hvac => &["hvac_runtime_minutes", "hvac_power_kw"],
            SensorType::Dhw => &["energy_consumption_kwh", "cycle_duration_minutes"],
            SensorType::Lighting => &["lighting_energy_kwh"],
            SensorType::Occupancy => &["activation_events", "battery_level"],
            SensorType::Environment => &["ambient_temp", "humidity"],
            SensorType::GatewayHealth => &["status_code"],
            SensorType::Network => &["latency_ms", "packet_loss_percent"],
            SensorType::UnitPanel => &["sub_meter_energy_kwh", "demand_kw"],
            SensorType::UnitAppliance => &["appliance_energy_kwh"],
            SensorType::SpaceTemperature => &["temperature_f"],
        }
    }

    pub fn is_metric_key(&self, key: &str) -> bool {
        self.metric_keys().contains(&key)
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorType {
    type Err = ReadingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase();
        SensorType::ALL
            .into_iter()
            .find(|sensor_type| sensor_type.as_str() == value)
            .ok_or(ReadingError::UnknownSensorType(value))
    }
}
