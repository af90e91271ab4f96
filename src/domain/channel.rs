use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(Uuid);

impl ChannelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recognition back-end family a channel talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineType {
    Whisper,
    AliCloud,
    Tencent,
    Baidu,
    Xunfei,
    Azure,
    Aws,
    Google,
    Local,
}

impl EngineType {
    pub fn code(&self) -> i32 {
        match self {
            EngineType::Whisper => 1,
            EngineType::AliCloud => 2,
            EngineType::Tencent => 3,
            EngineType::Baidu => 4,
            EngineType::Xunfei => 5,
            EngineType::Azure => 6,
            EngineType::Aws => 7,
            EngineType::Google => 8,
            EngineType::Local => 9,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(EngineType::Whisper),
            2 => Some(EngineType::AliCloud),
            3 => Some(EngineType::Tencent),
            4 => Some(EngineType::Baidu),
            5 => Some(EngineType::Xunfei),
            6 => Some(EngineType::Azure),
            7 => Some(EngineType::Aws),
            8 => Some(EngineType::Google),
            9 => Some(EngineType::Local),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineType::Whisper => "whisper",
            EngineType::AliCloud => "ali_cloud",
            EngineType::Tencent => "tencent",
            EngineType::Baidu => "baidu",
            EngineType::Xunfei => "xunfei",
            EngineType::Azure => "azure",
            EngineType::Aws => "aws",
            EngineType::Google => "google",
            EngineType::Local => "local",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EngineType::Whisper => "OpenAI Whisper",
            EngineType::AliCloud => "Alibaba Cloud Speech",
            EngineType::Tencent => "Tencent Cloud ASR",
            EngineType::Baidu => "Baidu Speech",
            EngineType::Xunfei => "iFlytek Speech",
            EngineType::Azure => "Azure Speech Services",
            EngineType::Aws => "AWS Transcribe",
            EngineType::Google => "Google Speech-to-Text",
            EngineType::Local => "Self-hosted engine",
        }
    }
}

impl FromStr for EngineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whisper" => Ok(EngineType::Whisper),
            "ali_cloud" => Ok(EngineType::AliCloud),
            "tencent" => Ok(EngineType::Tencent),
            "baidu" => Ok(EngineType::Baidu),
            "xunfei" => Ok(EngineType::Xunfei),
            "azure" => Ok(EngineType::Azure),
            "aws" => Ok(EngineType::Aws),
            "google" => Ok(EngineType::Google),
            "local" => Ok(EngineType::Local),
            other => other
                .parse::<i32>()
                .ok()
                .and_then(EngineType::from_code)
                .ok_or_else(|| format!("Unknown engine type: {}", s)),
        }
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelStatus {
    Enabled,
    Disabled,
    AutoDisabled,
}

impl ChannelStatus {
    pub fn code(&self) -> i32 {
        match self {
            ChannelStatus::Enabled => 1,
            ChannelStatus::Disabled => 2,
            ChannelStatus::AutoDisabled => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ChannelStatus::Enabled),
            2 => Some(ChannelStatus::Disabled),
            3 => Some(ChannelStatus::AutoDisabled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelStatus::Enabled => "enabled",
            ChannelStatus::Disabled => "disabled",
            ChannelStatus::AutoDisabled => "auto_disabled",
        }
    }
}

impl FromStr for ChannelStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enabled" => Ok(ChannelStatus::Enabled),
            "disabled" => Ok(ChannelStatus::Disabled),
            "auto_disabled" => Ok(ChannelStatus::AutoDisabled),
            _ => Err(format!("Invalid channel status: {}", s)),
        }
    }
}

/// An administratively configured back-end instance. Read-only to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub engine_type: EngineType,
    pub credential: String,
    pub base_url: Option<String>,
    pub region: Option<String>,
    pub max_file_size: Option<u64>,
    pub max_duration: Option<u32>,
    pub supported_formats: Vec<String>,
    pub supported_languages: Vec<String>,
    pub weight: i32,
    pub status: ChannelStatus,
    pub group: String,
    pub tested_at: Option<DateTime<Utc>>,
}

impl Channel {
    pub fn new(name: impl Into<String>, engine_type: EngineType, credential: impl Into<String>) -> Self {
        Self {
            id: ChannelId::new(),
            name: name.into(),
            engine_type,
            credential: credential.into(),
            base_url: None,
            region: None,
            max_file_size: None,
            max_duration: None,
            supported_formats: Vec::new(),
            supported_languages: Vec::new(),
            weight: 0,
            status: ChannelStatus::Enabled,
            group: "default".to_string(),
            tested_at: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.status == ChannelStatus::Enabled
    }

    pub fn supports_language(&self, language: &str) -> bool {
        self.supported_languages
            .iter()
            .any(|l| l == language || l == super::AUTO_LANGUAGE)
    }

    pub fn supports_format(&self, format: &str) -> bool {
        self.supported_formats.iter().any(|f| f == format)
    }

    /// Splits a comma-joined admin field, trimming blanks.
    pub fn parse_list(joined: &str) -> Vec<String> {
        joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn join_list(items: &[String]) -> String {
        items.join(",")
    }
}
