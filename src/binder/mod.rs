//! 数据绑定器
//!
//! 从后端拉取 JSON，把固定的一组字段写入 id 相同的页面节点。
//! 天气、行情、作物详情、病害识别都是同一个 [`DataBinder`]，
//! 差异全部放在各自的 [`Binding`] 实现里：
//! - weather: 当前天气和逐日预报
//! - market: 三类行情与涨幅榜
//! - details: 种植指南 / 病虫害管理两种字段结构
//! - scan: 图片病害识别
//!
//! 每个绑定器同一时间只认最新一次请求，更早发出的响应晚到时直接丢弃。

pub mod details;
pub mod market;
pub mod poller;
pub mod scan;
pub mod weather;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::api::FarmApi;
use crate::browser::Dialogs;
use crate::dom::Document;
use crate::error::ApiError;
use crate::event_bus::{AppEvent, EventBus};
use crate::speech::SpeechAdapter;

pub use details::{CropDetailsBinder, CultivationSchema, DetailBinding, PestSchema, RecordSchema};
pub use market::MarketBinding;
pub use poller::{Poller, PollerHandle};
pub use scan::ScanBinding;
pub use weather::WeatherBinding;

/// 一种绑定：请求什么、写到哪里、失败时提示什么
#[async_trait]
pub trait Binding: Send + Sync + 'static {
    /// 每次请求的参数
    type Request: Clone + Send + Sync + 'static;
    /// 解析后的响应
    type Payload: Send + 'static;

    fn name(&self) -> &'static str;

    /// 页面上必须存在的元素，缺失时不发请求
    fn anchor(&self) -> Option<&'static str> {
        None
    }

    /// 请求发出前（显示加载状态等）
    fn before_fetch(&self, _document: &Document) {}

    /// 请求结束后，无论成功失败
    fn after_fetch(&self, _document: &Document) {}

    async fn fetch(&self, api: &FarmApi, request: &Self::Request)
        -> Result<Self::Payload, ApiError>;

    /// 写入页面；缺失的目标节点直接跳过
    fn render(
        &self,
        document: &Document,
        request: &Self::Request,
        payload: &Self::Payload,
        now: DateTime<Local>,
    ) -> Result<(), ApiError>;

    /// 失败时的弹窗内容
    fn failure_message(&self, request: &Self::Request, error: &ApiError) -> String;

    /// 渲染后在朗读开启时播报的内容
    fn announcement(&self, _payload: &Self::Payload) -> Option<String> {
        None
    }
}

/// 一次绑定的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// 已写入页面
    Rendered,
    /// 页面没有该区域，未发请求
    Skipped,
    /// 响应到达时已有更新的请求，结果被丢弃
    Superseded,
}

/// 绑定器共享的依赖
#[derive(Clone)]
pub struct BinderContext {
    pub api: FarmApi,
    pub document: Document,
    pub dialogs: Arc<dyn Dialogs>,
    pub speech: SpeechAdapter,
    pub event_bus: Arc<EventBus>,
}

/// 通用数据绑定器
pub struct DataBinder<B: Binding> {
    binding: B,
    ctx: BinderContext,
    /// 最新请求的票号
    latest: AtomicU64,
}

impl<B: Binding> DataBinder<B> {
    pub fn new(binding: B, ctx: BinderContext) -> Self {
        Self {
            binding,
            ctx,
            latest: AtomicU64::new(0),
        }
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// 拉取并渲染
    ///
    /// 失败时已经弹窗并记录日志，返回的错误只供调用方判断；
    /// 之前渲染的内容保持不动
    pub async fn bind(&self, request: &B::Request) -> Result<BindOutcome, ApiError> {
        let name = self.binding.name();

        if let Some(anchor) = self.binding.anchor() {
            if !self.ctx.document.contains_id(anchor) {
                debug!("{}: 页面没有 {}，跳过", name, anchor);
                return Ok(BindOutcome::Skipped);
            }
        }

        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let request_id = Uuid::new_v4();
        debug!("{}: 发起请求 {} (票号 {})", name, request_id, ticket);

        self.binding.before_fetch(&self.ctx.document);
        let result = self.binding.fetch(&self.ctx.api, request).await;

        if self.latest.load(Ordering::SeqCst) != ticket {
            info!("{}: 请求 {} 已被更新的请求取代，丢弃响应", name, request_id);
            self.ctx
                .event_bus
                .publish(AppEvent::BindingSuperseded { binding: name });
            return Ok(BindOutcome::Superseded);
        }

        self.binding.after_fetch(&self.ctx.document);

        let payload = match result {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(request, e)),
        };

        let now = Local::now();
        if let Err(e) = self
            .binding
            .render(&self.ctx.document, request, &payload, now)
        {
            return Err(self.fail(request, e));
        }

        debug!("{}: 请求 {} 渲染完成", name, request_id);
        self.ctx.event_bus.publish(AppEvent::BindingRendered {
            binding: name,
            at: now,
        });

        if let Some(text) = self.binding.announcement(&payload) {
            self.ctx.speech.announce(&text).await;
        }

        Ok(BindOutcome::Rendered)
    }

    fn fail(&self, request: &B::Request, error: ApiError) -> ApiError {
        let name = self.binding.name();
        error!("{} 请求失败: {}", name, error);

        let message = self.binding.failure_message(request, &error);
        self.ctx.dialogs.alert(&message);
        self.ctx.event_bus.publish(AppEvent::BindingFailed {
            binding: name,
            error: error.to_string(),
        });
        self.ctx.event_bus.publish(AppEvent::Alerted { message });
        error
    }
}

/// 数字按原样显示，整数不带小数点
pub(crate) fn num(value: f64) -> String {
    format!("{}", value)
}
