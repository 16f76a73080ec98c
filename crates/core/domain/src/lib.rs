//! 读数领域模型：传感器类型、读数、主题寻址、线格式与查询过滤条件。

pub mod error;
pub mod query;
pub mod reading;
pub mod sensor;
pub mod time;
pub mod topic;
pub mod wire;

pub use error::ReadingError;
pub use query::QueryFilter;
pub use reading::{Payload, READING_TTL_DAYS, Reading};
pub use sensor::SensorType;
pub use time::{day_end_key, day_start_key, format_sort_key, parse_sort_key};
pub use topic::{TOPIC_ROOT, Topic, TopicScope};
pub use wire::{WireRecord, decode_reading, encode_reading};
