// 定时轮询 - 按固定间隔重新绑定
//
// 新一轮开始时中止上一轮仍未返回的请求

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::{Binding, DataBinder};

/// 进行中的一次绑定，丢弃时中止
struct InFlight(JoinHandle<()>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// 轮询任务句柄
pub struct PollerHandle {
    name: &'static str,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 停止轮询，进行中的请求一并中止
    pub fn stop(self) {
        info!("{} 轮询已停止", self.name);
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// 轮询器
pub struct Poller;

impl Poller {
    /// 每隔 period 调用一次 bind；页面加载时不立即触发
    pub fn start<B: Binding>(
        binder: Arc<DataBinder<B>>,
        request: B::Request,
        period: Duration,
    ) -> PollerHandle {
        let name = binder.binding().name();
        info!("{} 轮询已启动，间隔 {} 秒", name, period.as_secs());

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut in_flight: Option<InFlight> = None;

            loop {
                ticker.tick().await;

                if let Some(previous) = in_flight.take() {
                    if !previous.0.is_finished() {
                        debug!("{}: 上一轮请求仍未返回，中止", name);
                    }
                }

                let binder = binder.clone();
                let request = request.clone();
                in_flight = Some(InFlight(tokio::spawn(async move {
                    // 失败已在绑定器内弹窗并记录
                    let _ = binder.bind(&request).await;
                })));
            }
        });

        PollerHandle { name, task }
    }
}
