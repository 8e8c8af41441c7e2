// 数据模型模块 - 配置结构和后端响应结构

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 应用配置（部分更新）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 后端地址
    pub base_url: Option<String>,
    /// 天气查询坐标
    pub location: Option<GeoLocation>,
    /// 天气轮询间隔（秒）
    pub weather_poll_secs: Option<u64>,
    /// 行情轮询间隔（秒）
    pub market_poll_secs: Option<u64>,
    /// 请求超时（秒）
    pub request_timeout_secs: Option<u64>,
    /// 聊天回复延迟（毫秒）
    pub chat_reply_delay_ms: Option<u64>,
    /// 语音输入提示持续时间（秒）
    pub listening_indicator_secs: Option<u64>,
    /// 语音识别语言
    pub recognition_locale: Option<String>,
    /// 语音设置
    pub voice: Option<VoiceSettings>,
}

/// 持久化的应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedAppConfig {
    pub base_url: String,
    pub location: GeoLocation,
    pub weather_poll_secs: u64,
    pub market_poll_secs: u64,
    pub request_timeout_secs: u64,
    pub chat_reply_delay_ms: u64,
    pub listening_indicator_secs: u64,
    pub recognition_locale: String,
    pub voice: VoiceSettings,
}

impl Default for PersistedAppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            location: GeoLocation::default(),
            weather_poll_secs: 300,
            market_poll_secs: 600,
            request_timeout_secs: 30,
            chat_reply_delay_ms: 1000,
            listening_indicator_secs: 3,
            recognition_locale: "en-IN".to_string(),
            voice: VoiceSettings::default(),
        }
    }
}

/// 经纬度（默认德里）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

impl Default for GeoLocation {
    fn default() -> Self {
        Self {
            lat: 28.7041,
            lon: 77.1025,
        }
    }
}

/// 语音设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// 是否开启朗读
    pub enabled: bool,
    /// 朗读语言
    pub language: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            language: "en-US".to_string(),
        }
    }
}

impl VoiceSettings {
    /// 语言的显示名称
    pub fn language_name(code: &str) -> Option<&'static str> {
        match code {
            "en-US" => Some("English"),
            "hi-IN" => Some("Hindi"),
            "te-IN" => Some("Telugu"),
            _ => None,
        }
    }
}

// ==================== 天气 ====================

/// 当前天气
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp: f64,
    pub condition: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub rainfall: f64,
    pub uv_index: f64,
    #[serde(default)]
    pub location: Option<String>,
}

/// 单日预报
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub day: String,
    pub icon: String,
    pub high: f64,
    pub low: f64,
    pub rain: f64,
}

/// 天气快照，每次轮询整体替换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    #[serde(default)]
    pub forecast: Vec<DailyForecast>,
}

// ==================== 行情 ====================

/// 单个品种价格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub unit: Option<String>,
    /// 涨跌幅（百分比）
    pub change: f64,
}

impl PriceEntry {
    /// 计价单位，缺省为每担
    pub fn unit_label(&self) -> &str {
        self.unit.as_deref().unwrap_or("quintal")
    }

    pub fn is_rising(&self) -> bool {
        self.change > 0.0
    }
}

/// 三类行情
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketBasket {
    #[serde(default)]
    pub cereals: Vec<PriceEntry>,
    #[serde(default)]
    pub vegetables: Vec<PriceEntry>,
    #[serde(default)]
    pub pulses: Vec<PriceEntry>,
}

impl MarketBasket {
    /// 涨幅榜：按谷物、蔬菜、豆类顺序拼接后按涨跌幅降序稳定排序，取前 limit 个
    pub fn top_movers(&self, limit: usize) -> Vec<PriceEntry> {
        let mut all: Vec<PriceEntry> = self
            .cereals
            .iter()
            .chain(&self.vegetables)
            .chain(&self.pulses)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.change.total_cmp(&a.change));
        all.truncate(limit);
        all
    }
}

// ==================== 作物详情 ====================

/// 详情记录：字段名到文本的平铺映射
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl DetailRecord {
    /// 字段文本，null 或缺失时为 None
    pub fn field(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

// ==================== 病害识别 ====================

/// 推荐药剂
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PesticideRecommendation {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

/// 识别结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub disease_type: String,
    pub description: String,
    #[serde(deserialize_with = "text_or_number")]
    pub confidence: String,
    #[serde(default)]
    pub treatments: Vec<String>,
    #[serde(default)]
    pub pesticide_recommendations: Vec<PesticideRecommendation>,
    #[serde(default)]
    pub prevention_tips: Vec<String>,
}

/// 表单接口的统一响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// 接受字符串或数字
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}
