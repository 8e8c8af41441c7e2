// 表单提交 - 注册、补贴查询、企业对接和评价校验
//
// 表单字段按 URL 编码提交，CSRF 令牌取自隐藏字段并放在请求头中

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::{endpoints, FarmApi};
use crate::binder::BinderContext;
use crate::browser::Dialogs;
use crate::dom::Document;
use crate::error::ApiError;
use crate::event_bus::{AppEvent, EventBus};
use crate::models::FormReply;
use crate::navigation::Router;
use crate::speech::SpeechAdapter;

/// CSRF 隐藏字段名
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

pub const REGISTRATION_FORM: &str = "registrationForm";
pub const DBT_FORM: &str = "dbtForm";
pub const COMPANY_FORM: &str = "companyConnectForm";
pub const REVIEW_FORM: &str = "reviewForm";

const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
const DBT_UNREACHABLE: &str = "Could not connect to DBT service. Please try again.";
const COMPANY_UNREACHABLE: &str = "Failed to connect. Please check your internet and try again.";
const RATING_REQUIRED: &str = "Please select a rating before submitting.";

const DBT_SUCCESS_CLASS: &str = "mt-6 p-4 rounded-lg bg-green-50";
const DBT_FAILURE_CLASS: &str = "mt-6 p-4 rounded-lg bg-red-50";

/// 注册成功后返回的页面
const HOME_PATH: &str = "/home/";

/// 提交事件的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDecision {
    /// 阻止浏览器默认提交
    Prevent,
    /// 交给浏览器原生提交
    Proceed,
}

/// 提交时刻的表单内容（不含 CSRF 字段）
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub form_id: String,
    pub fields: Vec<(String, String)>,
    pub csrf_token: Option<String>,
}

/// 表单提交器
#[derive(Clone)]
pub struct FormSubmitter {
    api: FarmApi,
    document: Document,
    dialogs: Arc<dyn Dialogs>,
    speech: SpeechAdapter,
    router: Router,
    event_bus: Arc<EventBus>,
}

impl FormSubmitter {
    pub fn new(ctx: BinderContext, router: Router) -> Self {
        Self {
            api: ctx.api,
            document: ctx.document,
            dialogs: ctx.dialogs,
            speech: ctx.speech,
            router,
            event_bus: ctx.event_bus,
        }
    }

    /// 页面隐藏字段中的 CSRF 令牌
    pub fn csrf_token(&self) -> Option<String> {
        self.document
            .find_by_name(CSRF_FIELD)
            .map(|e| e.value)
            .filter(|v| !v.is_empty())
    }

    /// 按下提交时的表单内容
    pub fn snapshot(&self, form_id: &str) -> FormSubmission {
        let fields = self
            .document
            .form_fields(form_id)
            .into_iter()
            .filter(|(name, _)| name != CSRF_FIELD)
            .collect();

        let csrf_token = self.csrf_token();
        if csrf_token.is_none() {
            warn!("页面缺少 CSRF 令牌，{} 将不带令牌提交", form_id);
        }

        FormSubmission {
            form_id: form_id.to_string(),
            fields,
            csrf_token,
        }
    }

    /// 提交表单快照
    pub async fn submit(
        &self,
        submission: &FormSubmission,
        endpoint: &str,
    ) -> Result<FormReply, ApiError> {
        info!(
            "提交表单 {} -> {} ({} 个字段)",
            submission.form_id,
            endpoint,
            submission.fields.len()
        );
        let reply = self
            .api
            .post_form(endpoint, &submission.fields, submission.csrf_token.as_deref())
            .await?;

        self.event_bus.publish(AppEvent::FormReplied {
            form_id: submission.form_id.clone(),
            success: reply.success,
            message: reply.message.clone(),
        });
        Ok(reply)
    }

    /// 农户注册：成功后回到首页
    pub async fn register(&self, submission: &FormSubmission) -> Option<FormReply> {
        match self.submit(submission, endpoints::REGISTER_FARMER).await {
            Ok(reply) => {
                self.alert(&reply.message);
                if reply.success {
                    self.router.assign(HOME_PATH);
                }
                Some(reply)
            }
            Err(e) => {
                error!("注册请求失败: {}", e);
                self.alert(REGISTRATION_FAILED);
                None
            }
        }
    }

    /// 补贴到账查询：结果写入结果面板并朗读
    pub async fn check_dbt(&self, submission: &FormSubmission) -> Option<FormReply> {
        match self.submit(submission, endpoints::CHECK_DBT).await {
            Ok(reply) => {
                let class_name = if reply.success {
                    DBT_SUCCESS_CLASS
                } else {
                    DBT_FAILURE_CLASS
                };
                self.document.set_class_name("dbtResult", class_name);
                self.document.set_text("dbtResultText", reply.message.clone());
                self.document.show("dbtResult");
                self.speech.announce(&reply.message).await;
                Some(reply)
            }
            Err(e) => {
                error!("DBT 查询失败: {}", e);
                self.alert(DBT_UNREACHABLE);
                None
            }
        }
    }

    /// 企业对接：提交全部字段
    pub async fn connect_company(&self, submission: &FormSubmission) -> Option<FormReply> {
        match self.submit(submission, endpoints::CONNECT_COMPANY).await {
            Ok(reply) => {
                self.alert(&reply.message);
                Some(reply)
            }
            Err(e) => {
                error!("企业对接请求失败: {}", e);
                self.alert(COMPANY_UNREACHABLE);
                None
            }
        }
    }

    /// 评价表单只检查是否选了评分，提交本身交给浏览器
    pub fn validate_review(&self) -> SubmitDecision {
        if self.document.checked_in_group("rating").is_some() {
            SubmitDecision::Proceed
        } else {
            self.alert(RATING_REQUIRED);
            SubmitDecision::Prevent
        }
    }

    fn alert(&self, message: &str) {
        self.dialogs.alert(message);
        self.event_bus.publish(AppEvent::Alerted {
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::test_support::context;
    use crate::browser::headless::HeadlessBrowser;
    use serde_json::json;
    use wiremock::matchers::{body_string, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn submitter(base_url: &str, page: &str, voice: bool) -> (FormSubmitter, Document, HeadlessBrowser) {
        let (ctx, browser) = context(base_url, page, voice);
        let doc = ctx.document.clone();
        let router = Router::new(browser.location.clone(), ctx.event_bus.clone());
        (FormSubmitter::new(ctx, router), doc, browser)
    }

    #[tokio::test]
    async fn test_registration_success_goes_home() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/register-farmer/"))
            .and(header("X-CSRFToken", "test-token"))
            .and(body_string("phoneNumber=9876543210&emailId=ravi%40example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "message": "Registration successful!"
            })))
            .mount(&server)
            .await;

        let (forms, doc, browser) = submitter(&server.uri(), "/signup/", false);
        doc.set_value("phoneNumber", "9876543210");
        doc.set_value("emailId", "ravi@example.com");

        let reply = forms.register(&forms.snapshot(REGISTRATION_FORM)).await.unwrap();
        assert!(reply.success);
        assert_eq!(browser.alerts.last().as_deref(), Some("Registration successful!"));
        assert_eq!(browser.location.history(), vec!["/home/".to_string()]);
    }

    #[tokio::test]
    async fn test_registration_rejected_stays_on_page() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/register-farmer/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false, "message": "Phone number already registered"
            })))
            .mount(&server)
            .await;

        let (forms, _doc, browser) = submitter(&server.uri(), "/signup/", false);
        forms.register(&forms.snapshot(REGISTRATION_FORM)).await.unwrap();
        assert_eq!(
            browser.alerts.last().as_deref(),
            Some("Phone number already registered")
        );
        assert!(browser.location.history().is_empty());
    }

    #[tokio::test]
    async fn test_registration_transport_failure() {
        let (forms, _doc, browser) = submitter("http://127.0.0.1:9", "/signup/", false);
        assert!(forms.register(&forms.snapshot(REGISTRATION_FORM)).await.is_none());
        assert_eq!(browser.alerts.last().as_deref(), Some(REGISTRATION_FAILED));
    }

    #[tokio::test]
    async fn test_dbt_result_panel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/check-dbt/"))
            .and(body_string_contains("dbtAadhaar=123412341234"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false, "message": "Bank account not linked with Aadhaar"
            })))
            .mount(&server)
            .await;

        let (forms, doc, browser) = submitter(&server.uri(), "/dbt/", true);
        doc.set_value("dbtAadhaar", "123412341234");
        doc.set_value("bankAccount", "001122");

        forms.check_dbt(&forms.snapshot(DBT_FORM)).await.unwrap();
        assert_eq!(doc.get("dbtResult").unwrap().class_name(), DBT_FAILURE_CLASS);
        assert_eq!(
            doc.text("dbtResultText").as_deref(),
            Some("Bank account not linked with Aadhaar")
        );
        assert!(!doc.is_hidden("dbtResult"));
        assert_eq!(
            browser.synth.audible().unwrap().text,
            "Bank account not linked with Aadhaar"
        );
        assert!(browser.alerts.messages().is_empty());
    }

    #[tokio::test]
    async fn test_dbt_unreachable() {
        let (forms, doc, browser) = submitter("http://127.0.0.1:9", "/dbt/", false);
        assert!(forms.check_dbt(&forms.snapshot(DBT_FORM)).await.is_none());
        assert!(doc.is_hidden("dbtResult"));
        assert_eq!(browser.alerts.last().as_deref(), Some(DBT_UNREACHABLE));
    }

    #[tokio::test]
    async fn test_company_connect_sends_every_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/connect-company/"))
            .and(body_string(
                "farmer_name=Ravi&contact_number=98765&crop_type=Wheat&quantity=20",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "message": "A company representative will contact you."
            })))
            .mount(&server)
            .await;

        let (forms, doc, browser) = submitter(&server.uri(), "/connect-companies/", false);
        doc.set_value("farmerName", "Ravi");
        doc.set_value("contactNumber", "98765");
        doc.set_value("cropType", "Wheat");
        doc.set_value("quantity", "20");

        forms.connect_company(&forms.snapshot(COMPANY_FORM)).await.unwrap();
        assert_eq!(
            browser.alerts.last().as_deref(),
            Some("A company representative will contact you.")
        );
    }

    #[tokio::test]
    async fn test_company_connect_unreachable() {
        let (forms, doc, browser) = submitter("http://127.0.0.1:9", "/connect-companies/", false);
        doc.set_value("farmerName", "Ravi");

        assert!(forms.connect_company(&forms.snapshot(COMPANY_FORM)).await.is_none());
        assert_eq!(browser.alerts.last().as_deref(), Some(COMPANY_UNREACHABLE));
        assert_eq!(browser.alerts.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_freezes_fields_and_drops_csrf() {
        let (ctx, browser) = context("http://127.0.0.1:9", "/signup/", false);
        let doc = ctx.document.clone();
        let router = Router::new(browser.location.clone(), ctx.event_bus.clone());
        let forms = FormSubmitter::new(ctx, router);
        doc.set_value("phoneNumber", "9876543210");

        let submission = forms.snapshot(REGISTRATION_FORM);
        doc.set_value("phoneNumber", "");

        assert_eq!(
            submission.fields,
            vec![
                ("phoneNumber".to_string(), "9876543210".to_string()),
                ("emailId".to_string(), String::new()),
            ]
        );
        assert_eq!(submission.csrf_token.as_deref(), Some("test-token"));
    }

    #[tokio::test]
    async fn test_review_requires_rating() {
        let (forms, doc, browser) = submitter("http://127.0.0.1:9", "/review/", false);

        assert_eq!(forms.validate_review(), SubmitDecision::Prevent);
        assert_eq!(browser.alerts.last().as_deref(), Some(RATING_REQUIRED));

        doc.update("rating4", |e| e.checked = true);
        assert_eq!(forms.validate_review(), SubmitDecision::Proceed);
        assert_eq!(browser.alerts.messages().len(), 1);
    }
}
