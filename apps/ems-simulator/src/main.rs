//! 楼宇传感器集群发布器：为每个监测点启动一个发射器，经共享 MQTT 连接发布读数。

use ems_config::SimulatorConfig;
use ems_fleet::{FleetOrchestrator, building_fleet, cancel_on_shutdown_signal};
use ems_publish::{
    ChainCredentialProvider, FileCredentialProvider, MqttTransport, MqttTransportConfig,
    PublishChannel, Qos, StaticCredentialProvider, TlsMaterial, resolve_root_ca,
};
use ems_telemetry::init_tracing;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 初始化结构化日志
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: "ems.fleet", error = %err, "simulator_failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // 配置错误在任何连接尝试之前返回
    let config = SimulatorConfig::from_env()?;
    let transport = MqttTransport::new(transport_config(&config).await?);
    let channel = Arc::new(
        PublishChannel::new(Arc::new(transport)).with_qos(Qos::from_u8(config.publish_qos)),
    );

    let specs = building_fleet(config.unit_count);
    info!(
        target: "ems.fleet",
        endpoint = %config.iot_endpoint,
        port = config.iot_port,
        units = config.unit_count,
        emitters = specs.len(),
        "simulator_starting"
    );

    let cancel = CancellationToken::new();
    let signal_task = cancel_on_shutdown_signal(cancel.clone());
    let result = FleetOrchestrator::new(channel, specs)
        .with_stagger(Duration::from_millis(config.stagger_ms))
        .run(cancel.clone())
        .await;
    cancel.cancel();
    let _ = signal_task.await;

    let report = result?;
    info!(
        target: "ems.fleet",
        published = report.published,
        failed = report.failed,
        "simulator_stopped"
    );
    Ok(())
}

async fn transport_config(
    config: &SimulatorConfig,
) -> Result<MqttTransportConfig, Box<dyn std::error::Error>> {
    let mut transport =
        MqttTransportConfig::new(&config.iot_endpoint, config.iot_port, &config.client_id);
    transport.username = config.mqtt_username.clone();
    transport.password = config.mqtt_password.clone();
    if config.tls_enabled {
        let identity = ChainCredentialProvider::new()
            .with(StaticCredentialProvider::new(
                config.certificate_pem.clone(),
                config.private_key_pem.clone(),
            ))
            .with(FileCredentialProvider::new(&config.cert_dir))
            .resolve()
            .await?;
        let root_ca = resolve_root_ca(&config.root_ca_paths).await?;
        transport.tls = Some(TlsMaterial { root_ca, identity });
    }
    Ok(transport)
}
