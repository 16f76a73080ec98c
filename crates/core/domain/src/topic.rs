//! MQTT 主题层级：`ems/<scope>/<point>[/<subtopic>]`。

use crate::error::ReadingError;
use std::fmt;

/// 主题根。
pub const TOPIC_ROOT: &str = "ems";

/// 主题作用域。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicScope {
    Building,
    Unit(u32),
    Common,
}

/// 发布主题地址。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic {
    pub scope: TopicScope,
    pub point: String,
    pub subtopic: Option<String>,
}

impl Topic {
    pub fn building(point: impl Into<String>) -> Self {
        Self {
            scope: TopicScope::Building,
            point: point.into(),
            subtopic: None,
        }
    }

    pub fn unit(unit_id: u32, point: impl Into<String>) -> Self {
        Self {
            scope: TopicScope::Unit(unit_id),
            point: point.into(),
            subtopic: None,
        }
    }

    pub fn common(point: impl Into<String>) -> Self {
        Self {
            scope: TopicScope::Common,
            point: point.into(),
            subtopic: None,
        }
    }

    pub fn with_subtopic(mut self, subtopic: impl Into<String>) -> Self {
        self.subtopic = Some(subtopic.into());
        self
    }

    /// 解析主题字符串。
    pub fn parse(topic: &str) -> Result<Self, ReadingError> {
        let invalid = || ReadingError::InvalidTopic(topic.to_string());
        let parts: Vec<&str> = topic.trim_matches('/').split('/').collect();
        if parts.first() != Some(&TOPIC_ROOT) || parts.iter().any(|part| part.is_empty()) {
            return Err(invalid());
        }
        let (scope, rest) = match parts.get(1) {
            Some(&"building") => (TopicScope::Building, &parts[2..]),
            Some(&"common") => (TopicScope::Common, &parts[2..]),
            Some(&"unit") => {
                let unit_id = parts
                    .get(2)
                    .and_then(|value| value.parse::<u32>().ok())
                    .ok_or_else(invalid)?;
                (TopicScope::Unit(unit_id), &parts[3..])
            }
            _ => return Err(invalid()),
        };
        let point = rest.first().ok_or_else(invalid)?.to_string();
        let subtopic = if rest.len() > 1 {
            Some(rest[1..].join("/"))
        } else {
            None
        };
        Ok(Self {
            scope,
            point,
            subtopic,
        })
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            TopicScope::Building => write!(f, "{}/building/{}", TOPIC_ROOT, self.point)?,
            TopicScope::Unit(unit_id) => {
                write!(f, "{}/unit/{}/{}", TOPIC_ROOT, unit_id, self.point)?
            }
            TopicScope::Common => write!(f, "{}/common/{}", TOPIC_ROOT, self.point)?,
        }
        if let Some(subtopic) = &self.subtopic {
            write!(f, "/{}", subtopic)?;
        }
        Ok(())
    }
}
