// 后端接口模块
// 负责与农业助手后端的 JSON 接口交互

pub mod client;

pub use client::FarmApi;

/// 接口路径
pub mod endpoints {
    pub const WEATHER: &str = "/api/weather/";
    pub const MARKET_PRICES: &str = "/api/market-prices/";
    pub const CROP_DETAILS: &str = "/api/crop-details/";
    pub const PEST_DETAILS: &str = "/api/get-pest-details/";
    pub const SCAN_IMAGE: &str = "/api/scan-image/";
    pub const REGISTER_FARMER: &str = "/api/register-farmer/";
    pub const CHECK_DBT: &str = "/api/check-dbt/";
    pub const CONNECT_COMPANY: &str = "/api/connect-company/";
}
