//! 楼宇监测点清单。

use crate::emitter::{EmitterSpec, Interval};
use crate::generator::{MonitoringPoint, Room};
use std::time::Duration;

/// 楼宇级、`unit_count` 个住户单元、公共区域的全部发射器，按启动顺序排列。
pub fn building_fleet(unit_count: u32) -> Vec<EmitterSpec> {
    let mut specs = vec![
        EmitterSpec::new(MonitoringPoint::MainPanel, Interval::fixed_secs(60)),
        EmitterSpec::new(MonitoringPoint::GatewayHealth, Interval::fixed_secs(30)),
        EmitterSpec::new(MonitoringPoint::Network, Interval::fixed_secs(60)),
    ];
    for unit_id in 1..=unit_count {
        specs.push(EmitterSpec::new(
            MonitoringPoint::UnitPanel { unit_id },
            Interval::fixed_secs(60),
        ));
        specs.push(EmitterSpec::new(
            MonitoringPoint::UnitHvac { unit_id },
            Interval::fixed_secs(60),
        ));
        specs.push(EmitterSpec::new(
            MonitoringPoint::UnitDhw { unit_id },
            Interval::fixed_secs(300),
        ));
        specs.push(EmitterSpec::new(
            MonitoringPoint::UnitAppliance { unit_id },
            Interval::fixed_secs(60),
        ));
        for room in Room::ALL {
            specs.push(EmitterSpec::new(
                MonitoringPoint::SpaceTemperature { unit_id, room },
                Interval::fixed_secs(300),
            ));
        }
    }
    specs.extend([
        EmitterSpec::new(MonitoringPoint::CommonLighting, Interval::fixed_secs(60)),
        EmitterSpec::new(
            MonitoringPoint::OccupancyEvent,
            Interval::Random {
                min: Duration::from_secs(10),
                max: Duration::from_secs(30),
            },
        ),
        EmitterSpec::new(MonitoringPoint::OccupancyHealth, Interval::fixed_secs(60)),
        EmitterSpec::new(MonitoringPoint::Environment, Interval::fixed_secs(300)),
    ]);
    specs
}
