// 事件总线 - 用于模块间解耦通信
//
// 控制器把导航、数据渲染、表单结果等发布出去，
// 命令行驱动和测试通过订阅观察页面行为

use chrono::{DateTime, Local};
use tokio::sync::broadcast;

/// 应用事件
#[derive(Debug, Clone)]
pub enum AppEvent {
    // --- 页面事件 ---

    /// 整页跳转
    Navigated {
        page_id: String,
        path: String,
    },

    /// 面板显示状态变化
    PanelToggled {
        panel_id: String,
        visible: bool,
    },

    /// 弹窗提示
    Alerted {
        message: String,
    },

    // --- 语音事件 ---

    /// 朗读开关变化
    VoiceToggled {
        enabled: bool,
    },

    /// 朗读语言变化
    LanguageChanged {
        language: String,
    },

    // --- 数据事件 ---

    /// 绑定器渲染完成
    BindingRendered {
        binding: &'static str,
        at: DateTime<Local>,
    },

    /// 绑定器请求失败
    BindingFailed {
        binding: &'static str,
        error: String,
    },

    /// 过期响应被丢弃
    BindingSuperseded {
        binding: &'static str,
    },

    // --- 表单与聊天 ---

    /// 表单提交结果
    FormReplied {
        form_id: String,
        success: bool,
        message: String,
    },

    /// 聊天机器人回复
    ChatReplied {
        question: String,
        reply: String,
    },
}

/// 事件总线
///
/// 使用 broadcast channel 实现发布/订阅模式
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// 创建新的事件总线
    ///
    /// # 参数
    /// - `capacity`: 事件缓冲区大小
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 发布事件
    ///
    /// 没有订阅者时事件直接丢弃
    pub fn publish(&self, event: AppEvent) {
        match self.sender.send(event) {
            Ok(receiver_count) => {
                tracing::trace!("事件已发布，订阅者数量: {}", receiver_count);
            }
            Err(_) => {
                tracing::trace!("事件已发布但无订阅者");
            }
        }
    }

    /// 订阅事件
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_basic() {
        let bus = EventBus::new(100);
        let mut receiver = bus.subscribe();

        bus.publish(AppEvent::VoiceToggled { enabled: true });

        match receiver.recv().await {
            Ok(AppEvent::VoiceToggled { enabled }) => assert!(enabled),
            _ => panic!("未收到预期事件"),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new(100);
        let mut receiver1 = bus.subscribe();
        let mut receiver2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(AppEvent::Navigated {
            page_id: "homePage".to_string(),
            path: "/home/".to_string(),
        });

        assert!(receiver1.try_recv().is_ok());
        assert!(receiver2.try_recv().is_ok());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(4);
        bus.publish(AppEvent::Alerted {
            message: "ignored".to_string(),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }
}
