//! 监测点与模拟读数生成。

use chrono::{DateTime, Utc};
use domain::{Reading, ReadingError, SensorType, Topic};
use rand::Rng;
use std::fmt;

/// 住户单元内的测温房间。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    Bedroom,
    LivingRoom,
    Kitchen,
}

impl Room {
    pub const ALL: [Room; 3] = [Room::Bedroom, Room::LivingRoom, Room::Kitchen];

    pub fn as_str(&self) -> &'static str {
        match self {
            Room::Bedroom => "bedroom",
            Room::LivingRoom => "living_room",
            Room::Kitchen => "kitchen",
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 楼宇内的一个监测点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitoringPoint {
    MainPanel,
    GatewayHealth,
    Network,
    UnitPanel { unit_id: u32 },
    UnitHvac { unit_id: u32 },
    UnitDhw { unit_id: u32 },
    UnitAppliance { unit_id: u32 },
    SpaceTemperature { unit_id: u32, room: Room },
    CommonLighting,
    OccupancyEvent,
    OccupancyHealth,
    Environment,
}

impl MonitoringPoint {
    pub fn sensor_type(&self) -> SensorType {
        match self {
            MonitoringPoint::MainPanel => SensorType::Building,
            MonitoringPoint::GatewayHealth => SensorType::GatewayHealth,
            MonitoringPoint::Network => SensorType::Network,
            MonitoringPoint::UnitPanel { .. } => SensorType::UnitPanel,
            MonitoringPoint::UnitHvac { .. } => SensorType::Hvac,
            MonitoringPoint::UnitDhw { .. } => SensorType::Dhw,
            MonitoringPoint::UnitAppliance { .. } => SensorType::UnitAppliance,
            MonitoringPoint::SpaceTemperature { .. } => SensorType::SpaceTemperature,
            MonitoringPoint::CommonLighting => SensorType::Lighting,
            MonitoringPoint::OccupancyEvent | MonitoringPoint::OccupancyHealth => {
                SensorType::Occupancy
            }
            MonitoringPoint::Environment => SensorType::Environment,
        }
    }

    pub fn device_id(&self) -> String {
        match self {
            MonitoringPoint::MainPanel => "building_main_panel".to_string(),
            MonitoringPoint::GatewayHealth => "local_gateway".to_string(),
            MonitoringPoint::Network => "network_monitor".to_string(),
            MonitoringPoint::UnitPanel { unit_id } => format!("unit_{unit_id}_panel"),
            MonitoringPoint::UnitHvac { unit_id } => format!("unit_{unit_id}_hvac"),
            MonitoringPoint::UnitDhw { unit_id } => format!("unit_{unit_id}_dhw"),
            MonitoringPoint::UnitAppliance { unit_id } => format!("unit_{unit_id}_appliance"),
            MonitoringPoint::SpaceTemperature { unit_id, room } => {
                format!("unit_{unit_id}_space_temp_{room}")
            }
            MonitoringPoint::CommonLighting => "common_lighting".to_string(),
            MonitoringPoint::OccupancyEvent | MonitoringPoint::OccupancyHealth => {
                "occupancy_sensor".to_string()
            }
            MonitoringPoint::Environment => "environment_sensor".to_string(),
        }
    }

    pub fn topic(&self) -> Topic {
        match self {
            MonitoringPoint::MainPanel => Topic::building("main_panel"),
            MonitoringPoint::GatewayHealth => Topic::building("gateway_health"),
            MonitoringPoint::Network => Topic::building("network"),
            MonitoringPoint::UnitPanel { unit_id } => Topic::unit(*unit_id, "panel"),
            MonitoringPoint::UnitHvac { unit_id } => Topic::unit(*unit_id, "hvac"),
            MonitoringPoint::UnitDhw { unit_id } => Topic::unit(*unit_id, "dhw"),
            MonitoringPoint::UnitAppliance { unit_id } => Topic::unit(*unit_id, "appliance"),
            MonitoringPoint::SpaceTemperature { unit_id, room } => {
                Topic::unit(*unit_id, "space_temperature").with_subtopic(room.as_str())
            }
            MonitoringPoint::CommonLighting => Topic::common("lighting"),
            MonitoringPoint::OccupancyEvent => Topic::common("occupancy").with_subtopic("event"),
            MonitoringPoint::OccupancyHealth => Topic::common("occupancy").with_subtopic("health"),
            MonitoringPoint::Environment => Topic::common("environment"),
        }
    }

    fn unit_id(&self) -> Option<u32> {
        match self {
            MonitoringPoint::UnitPanel { unit_id }
            | MonitoringPoint::UnitHvac { unit_id }
            | MonitoringPoint::UnitDhw { unit_id }
            | MonitoringPoint::UnitAppliance { unit_id }
            | MonitoringPoint::SpaceTemperature { unit_id, .. } => Some(*unit_id),
            _ => None,
        }
    }

    /// 生成一条时间戳为 `now` 的读数。
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Reading, ReadingError> {
        let metrics: Vec<(&'static str, f64)> = match self {
            MonitoringPoint::MainPanel => vec![
                ("total_energy_kwh", round_to(rng.gen_range(1000.0..=2000.0), 2)),
                ("demand_kw", round_to(rng.gen_range(50.0..=150.0), 2)),
            ],
            MonitoringPoint::GatewayHealth => {
                vec![("status_code", f64::from(rng.gen_range(0u8..=2)))]
            }
            MonitoringPoint::Network => vec![
                ("latency_ms", f64::from(rng.gen_range(10u32..=100))),
                ("packet_loss_percent", round_to(rng.gen_range(0.0..=5.0), 2)),
            ],
            MonitoringPoint::UnitPanel { .. } => vec![
                ("sub_meter_energy_kwh", round_to(rng.gen_range(100.0..=200.0), 2)),
                ("demand_kw", round_to(rng.gen_range(10.0..=50.0), 2)),
            ],
            MonitoringPoint::UnitHvac { .. } => vec![
                ("hvac_runtime_minutes", f64::from(rng.gen_range(0u32..=60))),
                ("hvac_power_kw", round_to(rng.gen_range(0.5..=3.0), 2)),
            ],
            MonitoringPoint::UnitDhw { .. } => vec![
                ("energy_consumption_kwh", round_to(rng.gen_range(10.0..=50.0), 2)),
                ("cycle_duration_minutes", f64::from(rng.gen_range(5u32..=30))),
            ],
            MonitoringPoint::UnitAppliance { .. } => vec![(
                "appliance_energy_kwh",
                round_to(rng.gen_range(1.0..=5.0), 2),
            )],
            MonitoringPoint::SpaceTemperature { .. } => {
                vec![("temperature_f", round_to(rng.gen_range(65.0..=75.0), 2))]
            }
            MonitoringPoint::CommonLighting => vec![(
                "lighting_energy_kwh",
                round_to(rng.gen_range(1.0..=5.0), 2),
            )],
            MonitoringPoint::OccupancyEvent => vec![
                ("activation_events", 1.0),
                ("battery_level", f64::from(rng.gen_range(20u32..=100))),
            ],
            MonitoringPoint::OccupancyHealth => vec![
                ("activation_events", f64::from(rng.gen_range(0u32..=10))),
                ("battery_level", f64::from(rng.gen_range(20u32..=100))),
            ],
            MonitoringPoint::Environment => vec![
                ("ambient_temp", round_to(rng.gen_range(65.0..=80.0), 1)),
                ("humidity", round_to(rng.gen_range(30.0..=60.0), 1)),
            ],
        };
        let mut reading = Reading::new(self.device_id(), self.sensor_type(), now, metrics)?;
        if let Some(unit_id) = self.unit_id() {
            reading = reading.with_unit(unit_id);
        }
        if let MonitoringPoint::SpaceTemperature { room, .. } = self {
            reading = reading.with_room(room.as_str());
        }
        Ok(reading)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
