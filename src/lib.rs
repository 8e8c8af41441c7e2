// 农业助手页面控制器 - 主库

// 声明模块
pub mod actors;
pub mod api;
pub mod app;
pub mod background;
pub mod binder;
pub mod browser;
pub mod chat;
pub mod commands;
pub mod dom;
pub mod domains;
pub mod error;
pub mod event_bus;
pub mod forms;
pub mod logger;
pub mod models;
pub mod navigation;
pub mod panels;
pub mod settings;
pub mod speech;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use actors::VoiceSettingsActor;
use api::FarmApi;
use background::BackgroundTasks;
use binder::{
    BinderContext, CropDetailsBinder, DataBinder, MarketBinding, ScanBinding, WeatherBinding,
};
use browser::Browser;
use chat::ChatResponder;
use domains::{DataDomain, InteractionDomain, PageDomain, SystemDomain};
use event_bus::EventBus;
use forms::FormSubmitter;
use models::PersistedAppConfig;
use navigation::{PageContext, Router};
use panels::PanelToggler;
use speech::{SpeechAdapter, VoiceControls};

pub use app::run;

/// 应用状态（按领域分组）
///
/// - 页面领域：文档、导航、面板、语音开关
/// - 数据领域：四个绑定器和轮询任务
/// - 交互领域：表单与聊天
/// - 系统领域：配置与日志
/// - 事件总线：控制器行为的观察入口
/// - 后台任务：事件触发的请求和聊天回复
#[derive(Clone)]
pub struct AppState {
    pub page_domain: Arc<PageDomain>,
    pub data_domain: Arc<DataDomain>,
    pub interaction_domain: Arc<InteractionDomain>,
    pub system_domain: Arc<SystemDomain>,
    pub event_bus: Arc<EventBus>,
    pub background: Arc<BackgroundTasks>,
}

impl AppState {
    /// 为当前地址栏路径构建页面控制器
    ///
    /// 页面上下文（种植指南 / 病虫害）在这里确定一次，之后不再读取地址栏
    pub fn build(
        config: &PersistedAppConfig,
        browser: Browser,
        csrf_token: &str,
        system_domain: SystemDomain,
    ) -> anyhow::Result<Self> {
        let path = browser.location.pathname();
        let context = PageContext::from_path(&path);
        info!("构建页面控制器: {} ({:?})", path, context);

        let document = dom::templates::document_for(&path, csrf_token);
        let event_bus = Arc::new(EventBus::new(1000));

        let api = FarmApi::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;

        let voice_settings = VoiceSettingsActor::spawn(config.voice.clone());
        document.set_value(speech::LANGUAGE_SELECT, config.voice.language.clone());
        let speech = SpeechAdapter::new(
            browser.synthesis.clone(),
            browser.recognition.clone(),
            voice_settings,
            config.recognition_locale.clone(),
        );
        let voice = VoiceControls::new(speech.clone(), document.clone(), event_bus.clone());

        let router = Router::new(browser.location.clone(), event_bus.clone());
        let panels = PanelToggler::new(document.clone(), event_bus.clone());

        let binder_ctx = BinderContext {
            api,
            document: document.clone(),
            dialogs: browser.dialogs.clone(),
            speech: speech.clone(),
            event_bus: event_bus.clone(),
        };

        let data_domain = Arc::new(DataDomain::new(
            DataBinder::new(WeatherBinding::new(config.location), binder_ctx.clone()),
            DataBinder::new(MarketBinding::new(), binder_ctx.clone()),
            CropDetailsBinder::for_context(context, binder_ctx.clone()),
            DataBinder::new(ScanBinding::new(), binder_ctx.clone()),
        ));

        let forms = FormSubmitter::new(binder_ctx, router.clone());
        let chat = ChatResponder::new(
            document.clone(),
            speech.clone(),
            browser.dialogs.clone(),
            event_bus.clone(),
            Duration::from_millis(config.chat_reply_delay_ms),
            Duration::from_secs(config.listening_indicator_secs),
        );

        let page_domain = Arc::new(PageDomain::new(
            document,
            browser,
            router,
            panels,
            speech,
            voice,
            path.clone(),
        ));

        info!("领域管理器已初始化完成");

        Ok(Self {
            page_domain,
            data_domain,
            interaction_domain: Arc::new(InteractionDomain::new(forms, chat)),
            system_domain: Arc::new(system_domain),
            event_bus,
            background: Arc::new(BackgroundTasks::new()),
        })
    }

    /// 等待事件触发的后台工作全部完成
    pub async fn settle(&self) {
        self.background.settle().await;
    }

    /// 按配置的间隔启动天气和行情轮询
    pub async fn start_polling(&self) {
        let config = self.system_domain.get_settings().get().await;
        self.data_domain.start_polling(
            Duration::from_secs(config.weather_poll_secs),
            Duration::from_secs(config.market_poll_secs),
        );
    }
}
