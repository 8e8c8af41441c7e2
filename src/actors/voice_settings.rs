// Voice Settings Actor - 使用Actor模式管理语音设置
//
// 朗读开关和当前语言只存在于这个Actor中，语音适配器和各绑定器持有Handle读取

use tokio::sync::{mpsc, oneshot};

use crate::models::VoiceSettings;

/// 语音设置命令
pub enum VoiceSettingsCommand {
    /// 切换朗读开关，返回切换后的状态
    Toggle {
        reply: oneshot::Sender<bool>,
    },

    /// 设置语言
    SetLanguage {
        language: String,
    },

    /// 获取设置
    Get {
        reply: oneshot::Sender<VoiceSettings>,
    },

    /// 健康检查
    HealthCheck {
        reply: oneshot::Sender<bool>,
    },
}

/// 语音设置Actor
pub struct VoiceSettingsActor {
    receiver: mpsc::Receiver<VoiceSettingsCommand>,
    settings: VoiceSettings,
}

impl VoiceSettingsActor {
    /// 创建新的Actor
    pub fn new(settings: VoiceSettings) -> (Self, VoiceSettingsHandle) {
        let (sender, receiver) = mpsc::channel(16);
        let actor = Self { receiver, settings };
        let handle = VoiceSettingsHandle { sender };
        (actor, handle)
    }

    /// 创建并在后台运行
    pub fn spawn(settings: VoiceSettings) -> VoiceSettingsHandle {
        let (actor, handle) = Self::new(settings);
        tokio::spawn(actor.run());
        handle
    }

    /// 运行Actor
    pub async fn run(mut self) {
        tracing::info!("Voice Settings Actor 已启动");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                VoiceSettingsCommand::Toggle { reply } => {
                    self.settings.enabled = !self.settings.enabled;
                    tracing::info!("朗读开关: {}", self.settings.enabled);
                    let _ = reply.send(self.settings.enabled);
                }

                VoiceSettingsCommand::SetLanguage { language } => {
                    tracing::info!("朗读语言: {} -> {}", self.settings.language, language);
                    self.settings.language = language;
                }

                VoiceSettingsCommand::Get { reply } => {
                    let _ = reply.send(self.settings.clone());
                }

                VoiceSettingsCommand::HealthCheck { reply } => {
                    let _ = reply.send(true);
                }
            }
        }

        tracing::info!("Voice Settings Actor 已停止");
    }
}

/// 语音设置Handle
#[derive(Clone)]
pub struct VoiceSettingsHandle {
    sender: mpsc::Sender<VoiceSettingsCommand>,
}

impl VoiceSettingsHandle {
    /// 切换朗读开关
    pub async fn toggle(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        if self
            .sender
            .send(VoiceSettingsCommand::Toggle { reply })
            .await
            .is_err()
        {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// 设置语言
    pub async fn set_language(&self, language: impl Into<String>) {
        let _ = self
            .sender
            .send(VoiceSettingsCommand::SetLanguage {
                language: language.into(),
            })
            .await;
    }

    /// 获取设置
    pub async fn get(&self) -> VoiceSettings {
        let (reply, rx) = oneshot::channel();
        self.sender.send(VoiceSettingsCommand::Get { reply }).await.ok();
        rx.await.unwrap_or_default()
    }

    pub async fn is_enabled(&self) -> bool {
        self.get().await.enabled
    }

    /// 健康检查，超时1秒
    pub async fn health_check(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        if self
            .sender
            .send(VoiceSettingsCommand::HealthCheck { reply })
            .await
            .is_err()
        {
            tracing::warn!("Voice Settings Actor 健康检查失败: 通道已关闭");
            return false;
        }

        match tokio::time::timeout(std::time::Duration::from_secs(1), rx).await {
            Ok(Ok(healthy)) => healthy,
            _ => false,
        }
    }
}
