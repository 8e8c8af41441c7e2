// 系统领域管理器
//
// 负责配置持久化

use std::sync::Arc;

use crate::settings::SettingsManager;

/// 系统领域管理器
#[derive(Clone)]
pub struct SystemDomain {
    settings: Arc<SettingsManager>,
}

impl SystemDomain {
    pub fn new(settings: Arc<SettingsManager>) -> Self {
        Self { settings }
    }

    /// 获取配置管理器
    pub fn get_settings(&self) -> &Arc<SettingsManager> {
        &self.settings
    }
}
