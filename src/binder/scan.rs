// 病害识别绑定 - 上传图片并展示识别结果

use async_trait::async_trait;
use chrono::{DateTime, Local};

use super::Binding;
use crate::api::FarmApi;
use crate::browser::ShareData;
use crate::dom::{escape_html, Document, FileUpload};
use crate::error::ApiError;
use crate::models::{PesticideRecommendation, ScanResult};

/// 文件选择框
pub const IMAGE_INPUT: &str = "imageUpload";
/// 扫描动画
const SCAN_LINE: &str = "scanLine";
/// 结果区域
const SCAN_RESULT: &str = "scanResult";

pub const NO_IMAGE_MESSAGE: &str = "Please upload an image first.";
pub const CAPTURE_MESSAGE: &str =
    "Camera functionality would be implemented here. For demo, please use the upload button.";
pub const SAVED_MESSAGE: &str =
    "Disease detection report saved to your device. You can access it from the reports section.";
pub const SHARE_FALLBACK_MESSAGE: &str =
    "Report sharing functionality - would integrate with WhatsApp, email, etc.";

const SCAN_FAILED_MESSAGE: &str = "An error occurred during scanning. Please try again.";

/// 病害识别绑定
#[derive(Default)]
pub struct ScanBinding;

impl ScanBinding {
    pub fn new() -> Self {
        Self
    }

    /// 文件选择框中的第一个文件
    pub fn selected_image(document: &Document) -> Option<FileUpload> {
        document
            .get(IMAGE_INPUT)
            .and_then(|input| input.files.into_iter().next())
    }
}

fn pesticide_card(pesticide: &PesticideRecommendation) -> String {
    format!(
        r#"<div class="bg-purple-50 p-3 rounded-lg"><h5 class="font-semibold text-purple-800">{}</h5><p class="text-sm text-gray-700">Dosage: {}</p><p class="text-sm text-gray-700">Frequency: {}</p></div>"#,
        escape_html(&pesticide.name),
        escape_html(&pesticide.dosage),
        escape_html(&pesticide.frequency)
    )
}

#[async_trait]
impl Binding for ScanBinding {
    type Request = FileUpload;
    type Payload = ScanResult;

    fn name(&self) -> &'static str {
        "scan"
    }

    fn before_fetch(&self, document: &Document) {
        document.show(SCAN_LINE);
    }

    fn after_fetch(&self, document: &Document) {
        document.hide(SCAN_LINE);
    }

    async fn fetch(&self, api: &FarmApi, image: &FileUpload) -> Result<ScanResult, ApiError> {
        api.scan_image(image).await
    }

    fn render(
        &self,
        document: &Document,
        _image: &FileUpload,
        result: &ScanResult,
        _now: DateTime<Local>,
    ) -> Result<(), ApiError> {
        document.set_text("diseaseType", result.disease_type.clone());
        document.set_text("diseaseDescription", result.description.clone());
        document.set_text("confidence", result.confidence.clone());

        let treatments: String = result
            .treatments
            .iter()
            .map(|t| format!(r#"<div class="bg-blue-50 p-2 rounded text-sm">• {}</div>"#, escape_html(t)))
            .collect();
        document.set_inner_html("treatmentList", treatments);

        let pesticides: String = result
            .pesticide_recommendations
            .iter()
            .map(pesticide_card)
            .collect();
        document.set_inner_html("pesticideRecommendations", pesticides);

        let tips: String = result
            .prevention_tips
            .iter()
            .map(|tip| format!("<li>• {}</li>", escape_html(tip)))
            .collect();
        document.set_inner_html("preventionTips", tips);

        document.show(SCAN_RESULT);
        Ok(())
    }

    fn failure_message(&self, _image: &FileUpload, error: &ApiError) -> String {
        match error {
            ApiError::Application(message) => message.clone(),
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => SCAN_FAILED_MESSAGE.to_string(),
        }
    }

    fn announcement(&self, result: &ScanResult) -> Option<String> {
        Some(format!(
            "Disease detected: {} with {} confidence. Check the detailed treatment recommendations.",
            result.disease_type, result.confidence
        ))
    }
}

/// 朗读已渲染的识别结果
pub fn scan_summary(document: &Document) -> String {
    let disease = document.text("diseaseType").unwrap_or_default();
    let description = document.text("diseaseDescription").unwrap_or_default();
    let confidence = document.text("confidence").unwrap_or_default();
    format!(
        "Detected disease: {}. {}. Detection confidence: {}. Please check the detailed treatment recommendations for detailed guidance.",
        disease, description, confidence
    )
}

/// 分享报告的内容
pub fn share_data(document: &Document, href: String) -> ShareData {
    ShareData {
        title: "Crop Disease Detection Report".to_string(),
        text: format!(
            "Disease detected: {}",
            document.text("diseaseType").unwrap_or_default()
        ),
        url: href,
    }
}
