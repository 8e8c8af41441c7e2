// 后台任务 - 数据请求、表单提交和聊天回复在事件处理之外完成
//
// 事件按到达顺序处理，慢操作放到这里；命令行驱动在输入结束时等待它们

use std::future::Future;
use std::sync::Mutex;

use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

#[derive(Default)]
pub struct BackgroundTasks {
    tasks: Mutex<JoinSet<()>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 启动后台任务，顺便回收已结束的
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self.tasks.lock() {
            Ok(mut tasks) => {
                while tasks.try_join_next().is_some() {}
                tasks.spawn(task);
            }
            Err(_) => {
                warn!("后台任务表不可用，任务不再跟踪");
                tokio::spawn(task);
            }
        }
    }

    /// 跟踪已经启动的任务
    pub fn track<T: Send + 'static>(&self, handle: JoinHandle<T>) {
        self.spawn(async move {
            let _ = handle.await;
        });
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().map(|tasks| tasks.len()).unwrap_or(0)
    }

    /// 等待所有后台任务完成，包括等待期间新加入的
    pub async fn settle(&self) {
        loop {
            let mut batch = {
                let Ok(mut tasks) = self.tasks.lock() else {
                    return;
                };
                std::mem::replace(&mut *tasks, JoinSet::new())
            };
            if batch.is_empty() {
                return;
            }

            debug!("等待 {} 个后台任务", batch.len());
            while let Some(result) = batch.join_next().await {
                if let Err(e) = result {
                    if e.is_panic() {
                        warn!("后台任务异常退出: {}", e);
                    }
                }
            }
        }
    }
}
