//! 基于 rumqttc 的 broker 传输实现。
//!
//! 建连时等待 ConnAck 确认会话可用，然后把事件循环交给后台任务轮询；
//! 后台任务遇到错误只记录日志并休眠 1s，rumqttc 会在下一次轮询时自动重连。

use crate::credentials::TlsMaterial;
use crate::error::TransportError;
use crate::transport::{BrokerTransport, Qos};
use async_trait::async_trait;
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions, Outgoing,
    Packet, QoS, TlsConfiguration, Transport,
};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 请求队列容量；队列满时 publish 会阻塞直到超时。
const REQUEST_CAPACITY: usize = 64;

/// MQTT 传输配置。
#[derive(Debug, Clone)]
pub struct MqttTransportConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 为 `None` 时使用明文 TCP。
    pub tls: Option<TlsMaterial>,
    pub keep_alive: Duration,
    pub connect_timeout: Duration,
    pub operation_timeout: Duration,
}

impl MqttTransportConfig {
    pub fn new(host: impl Into<String>, port: u16, client_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            client_id: client_id.into(),
            username: None,
            password: None,
            tls: None,
            keep_alive: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            operation_timeout: Duration::from_secs(5),
        }
    }

    fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(self.client_id.clone(), self.host.clone(), self.port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            options.set_credentials(username.clone(), password.clone());
        }
        if let Some(tls) = &self.tls {
            options.set_transport(Transport::tls_with_config(TlsConfiguration::Simple {
                ca: tls.root_ca.clone(),
                alpn: None,
                client_auth: Some((
                    tls.identity.certificate.clone(),
                    tls.identity.private_key.clone(),
                )),
            }));
        }
        options
    }
}

struct MqttSession {
    client: AsyncClient,
    poller: JoinHandle<()>,
}

/// rumqttc 传输。
pub struct MqttTransport {
    config: MqttTransportConfig,
    session: Mutex<Option<MqttSession>>,
}

impl MqttTransport {
    pub fn new(config: MqttTransportConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    async fn client(&self) -> Result<AsyncClient, TransportError> {
        let session = self.session.lock().await;
        session
            .as_ref()
            .map(|session| session.client.clone())
            .ok_or(TransportError::NotConnected)
    }
}

#[async_trait]
impl BrokerTransport for MqttTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            return Ok(());
        }
        let (client, mut eventloop) =
            AsyncClient::new(self.config.mqtt_options(), REQUEST_CAPACITY);
        tokio::time::timeout(self.config.connect_timeout, wait_for_connack(&mut eventloop))
            .await
            .map_err(|_| TransportError::Timeout("waiting for connack".to_string()))??;
        info!(
            target: "ems.publish",
            host = %self.config.host,
            port = self.config.port,
            client_id = %self.config.client_id,
            tls = self.config.tls.is_some(),
            "mqtt_connected"
        );
        let poller = tokio::spawn(poll_events(eventloop));
        *session = Some(MqttSession { client, poller });
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>, qos: Qos) -> Result<(), TransportError> {
        let client = self.client().await?;
        tokio::time::timeout(
            self.config.operation_timeout,
            client.publish(topic, qos_to_mqtt(qos), false, payload),
        )
        .await
        .map_err(|_| TransportError::Timeout(format!("publish to {topic}")))?
        .map_err(|err| TransportError::Publish(err.to_string()))
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        let Some(MqttSession { client, mut poller }) = self.session.lock().await.take() else {
            return Ok(());
        };
        let result = tokio::time::timeout(self.config.operation_timeout, client.disconnect())
            .await
            .map_err(|_| TransportError::Timeout("disconnect".to_string()))
            .and_then(|sent| sent.map_err(|err| TransportError::Publish(err.to_string())));
        if tokio::time::timeout(self.config.operation_timeout, &mut poller)
            .await
            .is_err()
        {
            poller.abort();
        }
        info!(target: "ems.publish", client_id = %self.config.client_id, "mqtt_disconnected");
        result
    }
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<(), TransportError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return match ack.code {
                    ConnectReturnCode::Success => Ok(()),
                    code => Err(TransportError::Refused(format!("{code:?}"))),
                };
            }
            Ok(_) => {}
            Err(err) => return Err(classify_connection_error(err)),
        }
    }
}

async fn poll_events(mut eventloop: EventLoop) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!(target: "ems.publish", "mqtt_eventloop_stopped");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(target: "ems.publish", error = %err, "mqtt_eventloop_error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

fn classify_connection_error(err: ConnectionError) -> TransportError {
    match err {
        ConnectionError::ConnectionRefused(code) => TransportError::Refused(format!("{code:?}")),
        ConnectionError::Tls(err) => TransportError::Tls(err.to_string()),
        other => TransportError::Connect(other.to_string()),
    }
}

fn qos_to_mqtt(qos: Qos) -> QoS {
    match qos {
        Qos::AtMostOnce => QoS::AtMostOnce,
        Qos::AtLeastOnce => QoS::AtLeastOnce,
    }
}
