// 作物详情绑定
//
// 种植指南页和病虫害页共用作物卡片，字段结构不同：
// 种植指南 16 项，病虫害管理 5 项。使用哪一种在控制器构建时由页面路径决定一次

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tracing::debug;

use super::{BindOutcome, Binding, BinderContext, DataBinder};
use crate::api::{endpoints, FarmApi};
use crate::dom::Document;
use crate::error::ApiError;
use crate::models::DetailRecord;
use crate::navigation::PageContext;

/// 列表区域（两个页面同名）
pub const LIST_SECTION: &str = "cropListSection";

/// 播报摘要截取的字符数
const SUMMARY_CHARS: usize = 50;

/// 详情字段结构
pub trait RecordSchema: Send + Sync + 'static {
    /// 绑定名称（日志与事件）
    const NAME: &'static str;
    /// 接口前缀，后接 `{crop}/`
    const ENDPOINT: &'static str;
    /// 字段名，同时是页面节点 id
    const FIELDS: &'static [&'static str];
    /// 标题节点
    const TITLE_ID: &'static str;
    /// 详情区域
    const DETAILS_SECTION: &'static str;
    /// 播报时截取摘要的字段
    const SUMMARY_FIELD: &'static str;
}

/// 16 项种植指南
pub struct CultivationSchema;

impl RecordSchema for CultivationSchema {
    const NAME: &'static str = "crop_details";
    const ENDPOINT: &'static str = endpoints::CROP_DETAILS;
    const FIELDS: &'static [&'static str] = &[
        "identity_context",
        "soil_requirements",
        "climate_requirements",
        "water_irrigation_needs",
        "varieties",
        "seed_selection_sowing",
        "nutrient_management",
        "season_of_cultivation",
        "land_preparation",
        "process_of_cultivation",
        "organic_farming_practices",
        "harvesting_storage",
        "estimated_cost",
        "locations_of_cultivation",
        "pests_affecting",
        "pest_control_measures",
    ];
    const TITLE_ID: &'static str = "cropTitle";
    const DETAILS_SECTION: &'static str = "cropDetails";
    const SUMMARY_FIELD: &'static str = "identity_context";
}

/// 5 项病虫害管理
pub struct PestSchema;

impl RecordSchema for PestSchema {
    const NAME: &'static str = "pest_details";
    const ENDPOINT: &'static str = endpoints::PEST_DETAILS;
    const FIELDS: &'static [&'static str] = &[
        "identification",
        "mixtures",
        "application_process",
        "safety_precautions",
        "recommendations",
    ];
    const TITLE_ID: &'static str = "pestTitle";
    const DETAILS_SECTION: &'static str = "pestDetailsDisplay";
    const SUMMARY_FIELD: &'static str = "identification";
}

/// 详情绑定，请求参数为作物名
pub struct DetailBinding<S: RecordSchema> {
    _schema: PhantomData<S>,
}

impl<S: RecordSchema> DetailBinding<S> {
    pub fn new() -> Self {
        Self {
            _schema: PhantomData,
        }
    }
}

impl<S: RecordSchema> Default for DetailBinding<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S: RecordSchema> Binding for DetailBinding<S> {
    type Request = String;
    type Payload = DetailRecord;

    fn name(&self) -> &'static str {
        S::NAME
    }

    async fn fetch(&self, api: &FarmApi, crop: &String) -> Result<DetailRecord, ApiError> {
        api.detail_record(S::ENDPOINT, crop).await
    }

    fn render(
        &self,
        document: &Document,
        crop: &String,
        record: &DetailRecord,
        _now: DateTime<Local>,
    ) -> Result<(), ApiError> {
        if !document.contains_id(LIST_SECTION) || !document.contains_id(S::DETAILS_SECTION) {
            return Err(ApiError::Unavailable(crop.clone()));
        }

        if let Some(title) = &record.title {
            document.set_text(S::TITLE_ID, title.clone());
        }

        for field in S::FIELDS {
            // 响应里没有的字段保留节点原内容
            match record.field(field) {
                Some(text) => {
                    document.set_text(field, text);
                }
                None => debug!("{}: {} 缺少字段 {}", S::NAME, crop, field),
            }
        }

        document.hide(LIST_SECTION);
        document.show(S::DETAILS_SECTION);
        Ok(())
    }

    fn failure_message(&self, crop: &String, error: &ApiError) -> String {
        match error {
            ApiError::Unavailable(_) => format!(
                "Detailed information for {} is unavailable. Please check the server log for errors.",
                crop
            ),
            ApiError::Status { message, .. } => format!(
                "Error fetching details: {}",
                message.as_deref().unwrap_or("Check server logs.")
            ),
            ApiError::Application(message) => format!("Error fetching details: {}", message),
            _ => format!("An error occurred while loading details for {}.", crop),
        }
    }

    fn announcement(&self, record: &DetailRecord) -> Option<String> {
        let title = record.title.clone().unwrap_or_default();
        let summary: String = record
            .field(S::SUMMARY_FIELD)
            .unwrap_or_default()
            .chars()
            .take(SUMMARY_CHARS)
            .collect();
        Some(format!("Showing information for {}. {}...", title, summary))
    }
}

/// 按页面上下文选定字段结构的详情绑定器
pub enum CropDetailsBinder {
    Cultivation(DataBinder<DetailBinding<CultivationSchema>>),
    Pest(DataBinder<DetailBinding<PestSchema>>),
}

impl CropDetailsBinder {
    /// 病虫害页用 5 项结构，其余页面用 16 项结构
    pub fn for_context(context: PageContext, ctx: BinderContext) -> Self {
        match context {
            PageContext::Pest => Self::Pest(DataBinder::new(DetailBinding::new(), ctx)),
            PageContext::Crops | PageContext::Other => {
                Self::Cultivation(DataBinder::new(DetailBinding::new(), ctx))
            }
        }
    }

    /// 加载作物详情
    pub async fn show(&self, crop: &str) -> Result<BindOutcome, ApiError> {
        let crop = crop.to_string();
        match self {
            Self::Cultivation(binder) => binder.bind(&crop).await,
            Self::Pest(binder) => binder.bind(&crop).await,
        }
    }

    /// 当前使用的详情区域
    pub fn details_section(&self) -> &'static str {
        match self {
            Self::Cultivation(_) => CultivationSchema::DETAILS_SECTION,
            Self::Pest(_) => PestSchema::DETAILS_SECTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::context;
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_missing_field_leaves_node_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/crop-details/wheat/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Wheat Cultivation (Rabi Crop)",
                "identity_context": "Wheat is a staple rabi cereal grown across the Indo-Gangetic plains.",
                "soil_requirements": "Loamy to clay-loam, pH 6.0-7.5"
            })))
            .mount(&server)
            .await;

        let (ctx, browser) = context(&server.uri(), "/crops/", false);
        let doc = ctx.document.clone();
        doc.set_text("water_irrigation_needs", "previous text");
        let details = CropDetailsBinder::for_context(PageContext::Crops, ctx);

        assert_eq!(details.show("wheat").await.unwrap(), BindOutcome::Rendered);
        assert_eq!(doc.text("cropTitle").as_deref(), Some("Wheat Cultivation (Rabi Crop)"));
        assert_eq!(
            doc.text("soil_requirements").as_deref(),
            Some("Loamy to clay-loam, pH 6.0-7.5")
        );
        assert_eq!(doc.text("water_irrigation_needs").as_deref(), Some("previous text"));
        assert!(doc.is_hidden(LIST_SECTION));
        assert!(!doc.is_hidden("cropDetails"));
        assert!(browser.alerts.messages().is_empty());
    }

    #[tokio::test]
    async fn test_pest_page_uses_pest_endpoint_and_announces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/get-pest-details/rice/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Rice Pest Management",
                "identification": "Brown plant hopper colonies at the base of the tillers cause hopper burn.",
                "mixtures": "Neem oil 5 ml per litre"
            })))
            .mount(&server)
            .await;

        let (ctx, browser) = context(&server.uri(), "/pest/", true);
        let doc = ctx.document.clone();
        let details = CropDetailsBinder::for_context(PageContext::Pest, ctx);
        assert_eq!(details.details_section(), "pestDetailsDisplay");

        details.show("rice").await.unwrap();
        assert_eq!(doc.text("pestTitle").as_deref(), Some("Rice Pest Management"));
        assert_eq!(doc.text("mixtures").as_deref(), Some("Neem oil 5 ml per litre"));
        assert!(!doc.is_hidden("pestDetailsDisplay"));

        let spoken = browser.synth.audible().unwrap();
        assert_eq!(
            spoken.text,
            "Showing information for Rice Pest Management. Brown plant hopper colonies at the base of the til..."
        );
    }

    #[tokio::test]
    async fn test_error_status_uses_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/crop-details/mango/"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "Crop not found"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/crop-details/gram/"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
            .mount(&server)
            .await;

        let (ctx, browser) = context(&server.uri(), "/crops/", false);
        let doc = ctx.document.clone();
        let details = CropDetailsBinder::for_context(PageContext::Crops, ctx);

        assert!(details.show("mango").await.is_err());
        assert_eq!(
            browser.alerts.last().as_deref(),
            Some("Error fetching details: Crop not found")
        );
        assert!(details.show("gram").await.is_err());
        assert_eq!(
            browser.alerts.last().as_deref(),
            Some("Error fetching details: Check server logs.")
        );
        assert!(!doc.is_hidden(LIST_SECTION));
    }

    #[tokio::test]
    async fn test_missing_sections_alert_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/crop-details/wheat/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Wheat"})))
            .mount(&server)
            .await;

        // 首页没有详情区域
        let (ctx, browser) = context(&server.uri(), "/home/", false);
        let details = CropDetailsBinder::for_context(PageContext::Other, ctx);

        let err = details.show("wheat").await.unwrap_err();
        assert!(matches!(err, ApiError::Unavailable(_)));
        assert!(browser
            .alerts
            .last()
            .unwrap()
            .starts_with("Detailed information for wheat is unavailable."));
    }

    #[tokio::test]
    async fn test_transport_failure_message() {
        let (ctx, browser) = context("http://127.0.0.1:9", "/crops/", false);
        let details = CropDetailsBinder::for_context(PageContext::Crops, ctx);

        assert!(details.show("barley").await.is_err());
        assert_eq!(
            browser.alerts.last().as_deref(),
            Some("An error occurred while loading details for barley.")
        );
    }
}
