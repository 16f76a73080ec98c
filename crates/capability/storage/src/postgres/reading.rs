//! Postgres 读数存储实现

use crate::error::StorageError;
use crate::traits::{ContinuationToken, ReadingStore, ResultPage, ScanFilter, SortKeyRange};
use domain::{Reading, SensorType, WireRecord};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::collections::BTreeMap;

const SELECT_COLUMNS: &str = "select sensor_type, edge_time_stamp, device_id, unit_id, room, ttl, \
     payload::text as payload from sensor_readings";

/// 上一页最后一行的排序列，序列化后作为续读令牌。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Cursor {
    sensor_type: String,
    edge_time_stamp: String,
    device_id: String,
}

impl Cursor {
    fn encode(&self) -> Result<ContinuationToken, StorageError> {
        serde_json::to_string(self)
            .map(ContinuationToken::new)
            .map_err(|err| StorageError::new(err.to_string()))
    }

    fn decode(token: &ContinuationToken) -> Result<Self, StorageError> {
        serde_json::from_str(token.as_str())
            .map_err(|_| StorageError::invalid_token(token.as_str()))
    }
}

pub struct PgReadingStore {
    pub pool: PgPool,
    page_size: u32,
}

impl PgReadingStore {
    /// `page_size` 为 0 时按 1 处理
    pub fn new(pool: PgPool, page_size: u32) -> Self {
        Self {
            pool,
            page_size: page_size.max(1),
        }
    }

    pub async fn connect(database_url: &str, page_size: u32) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self::new(pool, page_size))
    }

    /// 多取一行用于判断是否还有下一页。
    async fn fetch_page(
        &self,
        mut builder: QueryBuilder<'_, Postgres>,
    ) -> Result<ResultPage, StorageError> {
        builder.push(" limit ").push_bind(i64::from(self.page_size) + 1);
        let rows = builder.build().fetch_all(&self.pool).await?;
        let has_more = rows.len() > self.page_size as usize;
        let mut items = Vec::with_capacity(rows.len().min(self.page_size as usize));
        let mut last = None;
        for row in rows.iter().take(self.page_size as usize) {
            let (reading, cursor) = row_to_reading(row)?;
            items.push(reading);
            last = Some(cursor);
        }
        let next = match (has_more, last) {
            (true, Some(cursor)) => Some(cursor.encode()?),
            _ => None,
        };
        Ok(ResultPage { items, next })
    }
}

fn push_range(builder: &mut QueryBuilder<'_, Postgres>, range: Option<&SortKeyRange>) {
    let Some(range) = range else { return };
    if let Some(start) = &range.start {
        builder.push(" and edge_time_stamp >= ").push_bind(start.clone());
    }
    if let Some(end) = &range.end {
        builder.push(" and edge_time_stamp <= ").push_bind(end.clone());
    }
}

fn row_to_reading(row: &PgRow) -> Result<(Reading, Cursor), StorageError> {
    let sensor_type: String = row.try_get("sensor_type")?;
    let edge_time_stamp: String = row.try_get("edge_time_stamp")?;
    let device_id: String = row.try_get("device_id")?;
    let unit_id: Option<i32> = row.try_get("unit_id")?;
    let room: Option<String> = row.try_get("room")?;
    let ttl: i64 = row.try_get("ttl")?;
    let payload: String = row.try_get("payload")?;

    let metrics: BTreeMap<String, f64> = serde_json::from_str(&payload)
        .map_err(|err| StorageError::new(format!("invalid payload for {device_id}: {err}")))?;
    let unit_id = unit_id
        .map(u32::try_from)
        .transpose()
        .map_err(|_| StorageError::new(format!("negative unit_id for {device_id}")))?;
    let record = WireRecord {
        device_id: device_id.clone(),
        sensor_type: sensor_type.parse::<SensorType>()?,
        unit_id,
        room,
        edge_time_stamp: edge_time_stamp.clone(),
        ttl,
        metrics,
    };
    let reading = Reading::try_from(record)?;
    Ok((
        reading,
        Cursor {
            sensor_type,
            edge_time_stamp,
            device_id,
        },
    ))
}

#[async_trait::async_trait]
impl ReadingStore for PgReadingStore {
    async fn query_partition(
        &self,
        sensor_type: SensorType,
        range: Option<&SortKeyRange>,
        token: Option<ContinuationToken>,
    ) -> Result<ResultPage, StorageError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        builder
            .push(" where sensor_type = ")
            .push_bind(sensor_type.as_str());
        push_range(&mut builder, range);
        if let Some(token) = &token {
            let cursor = Cursor::decode(token)?;
            builder
                .push(" and (edge_time_stamp, device_id) > (")
                .push_bind(cursor.edge_time_stamp)
                .push(", ")
                .push_bind(cursor.device_id)
                .push(")");
        }
        builder.push(" order by edge_time_stamp asc, device_id asc");
        self.fetch_page(builder).await
    }

    async fn query_device_index(
        &self,
        device_id: &str,
        range: Option<&SortKeyRange>,
        token: Option<ContinuationToken>,
    ) -> Result<ResultPage, StorageError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        builder
            .push(" where device_id = ")
            .push_bind(device_id.to_string());
        push_range(&mut builder, range);
        if let Some(token) = &token {
            let cursor = Cursor::decode(token)?;
            builder
                .push(" and (edge_time_stamp, sensor_type) > (")
                .push_bind(cursor.edge_time_stamp)
                .push(", ")
                .push_bind(cursor.sensor_type)
                .push(")");
        }
        builder.push(" order by edge_time_stamp asc, sensor_type asc");
        self.fetch_page(builder).await
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        token: Option<ContinuationToken>,
    ) -> Result<ResultPage, StorageError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        builder.push(" where true");
        if let Some(device_id) = &filter.device_id {
            builder.push(" and device_id = ").push_bind(device_id.clone());
        }
        if let Some(sensor_type) = filter.sensor_type {
            builder
                .push(" and sensor_type = ")
                .push_bind(sensor_type.as_str());
        }
        push_range(&mut builder, filter.range.as_ref());
        if let Some(token) = &token {
            let cursor = Cursor::decode(token)?;
            builder
                .push(" and (sensor_type, edge_time_stamp, device_id) > (")
                .push_bind(cursor.sensor_type)
                .push(", ")
                .push_bind(cursor.edge_time_stamp)
                .push(", ")
                .push_bind(cursor.device_id)
                .push(")");
        }
        builder.push(" order by sensor_type asc, edge_time_stamp asc, device_id asc");
        self.fetch_page(builder).await
    }
}
