// 后端 API 客户端
// 所有接口都返回 JSON，错误统一映射为 ApiError

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::endpoints;
use crate::dom::FileUpload;
use crate::error::ApiError;
use crate::models::{DetailRecord, FormReply, GeoLocation, MarketBasket, ScanResult, WeatherSnapshot};

/// CSRF 请求头
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// 农业助手后端客户端
#[derive(Clone)]
pub struct FarmApi {
    base_url: String,
    client: Client,
}

impl FarmApi {
    /// 创建新的客户端
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// 复用已有的 HTTP 客户端
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 天气：GET /api/weather/?lat&lon
    pub async fn weather(&self, location: GeoLocation) -> Result<WeatherSnapshot, ApiError> {
        let response = self
            .client
            .get(self.url(endpoints::WEATHER))
            .query(&[("lat", location.lat), ("lon", location.lon)])
            .send()
            .await?;
        decode(read_json(response).await?)
    }

    /// 市场行情：GET /api/market-prices/
    pub async fn market_prices(&self) -> Result<MarketBasket, ApiError> {
        let response = self
            .client
            .get(self.url(endpoints::MARKET_PRICES))
            .send()
            .await?;
        decode(read_json(response).await?)
    }

    /// 16 项种植详情
    pub async fn crop_details(&self, crop: &str) -> Result<DetailRecord, ApiError> {
        self.detail_record(endpoints::CROP_DETAILS, crop).await
    }

    /// 5 项病虫害管理详情
    pub async fn pest_details(&self, crop: &str) -> Result<DetailRecord, ApiError> {
        self.detail_record(endpoints::PEST_DETAILS, crop).await
    }

    /// 详情记录：GET {prefix}{crop}/
    pub async fn detail_record(&self, prefix: &str, crop: &str) -> Result<DetailRecord, ApiError> {
        let path = format!("{}{}/", prefix, crop);
        let response = self.client.get(self.url(&path)).send().await?;
        decode(read_json(response).await?)
    }

    /// 病害识别：POST multipart image
    pub async fn scan_image(&self, image: &FileUpload) -> Result<ScanResult, ApiError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)?;
        let form = Form::new().part("image", part);

        debug!("上传图片进行识别: {} ({} 字节)", image.file_name, image.bytes.len());

        let response = self
            .client
            .post(self.url(endpoints::SCAN_IMAGE))
            .multipart(form)
            .send()
            .await?;
        let value = read_json(response).await?;

        if !value.get("success").and_then(Value::as_bool).unwrap_or(false) {
            let message = value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Scan failed")
                .to_string();
            return Err(ApiError::Application(message));
        }
        decode(value)
    }

    /// 表单提交：POST application/x-www-form-urlencoded
    ///
    /// 只要响应体是 {success, message} 形状就返回，不论状态码
    pub async fn post_form(
        &self,
        endpoint: &str,
        fields: &[(String, String)],
        csrf_token: Option<&str>,
    ) -> Result<FormReply, ApiError> {
        let mut request = self.client.post(self.url(endpoint)).form(fields);
        if let Some(token) = csrf_token {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<Value>(&body) {
            Ok(value) if value.get("message").is_some() || value.get("success").is_some() => {
                if !status.is_success() {
                    warn!("表单接口 {} 返回状态 {}", endpoint, status);
                }
                decode(value)
            }
            Ok(value) if !status.is_success() => Err(ApiError::Status {
                status: status.as_u16(),
                message: error_field(&value),
            }),
            Ok(_) => Err(ApiError::Decode(format!("{} 响应缺少 message 字段", endpoint))),
            Err(e) if status.is_success() => Err(ApiError::Decode(e.to_string())),
            Err(_) => Err(ApiError::Status {
                status: status.as_u16(),
                message: None,
            }),
        }
    }
}

fn error_field(value: &Value) -> Option<String> {
    value.get("error").and_then(Value::as_str).map(str::to_string)
}

/// 读取 JSON 响应
///
/// 非 2xx 映射为 Status，2xx 但带 error 字段映射为 Application
async fn read_json(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    let parsed = serde_json::from_str::<Value>(&body);

    if !status.is_success() {
        let message = parsed.ok().as_ref().and_then(error_field);
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let value = parsed.map_err(|e| ApiError::Decode(e.to_string()))?;
    if let Some(message) = error_field(&value) {
        return Err(ApiError::Application(message));
    }
    Ok(value)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
