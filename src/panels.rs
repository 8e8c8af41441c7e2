// 面板切换 - 菜单、聊天窗口、有机菜单等浮层的显示/隐藏

use std::sync::Arc;

use tracing::debug;

use crate::dom::Document;
use crate::event_bus::{AppEvent, EventBus};

/// 触发按钮及其激活样式
#[derive(Debug, Clone, Copy)]
pub struct Trigger<'a> {
    pub id: &'a str,
    pub active_class: Option<&'a str>,
}

impl<'a> Trigger<'a> {
    pub fn plain(id: &'a str) -> Self {
        Self {
            id,
            active_class: None,
        }
    }

    pub fn with_active(id: &'a str, active_class: &'a str) -> Self {
        Self {
            id,
            active_class: Some(active_class),
        }
    }
}

/// 面板切换器
#[derive(Clone)]
pub struct PanelToggler {
    document: Document,
    event_bus: Arc<EventBus>,
}

impl PanelToggler {
    pub fn new(document: Document, event_bus: Arc<EventBus>) -> Self {
        Self {
            document,
            event_bus,
        }
    }

    /// 翻转面板可见性和触发按钮的激活样式，返回切换后是否可见
    pub fn toggle(&self, panel_id: &str, trigger: Option<Trigger<'_>>) -> Option<bool> {
        let hidden = self.document.toggle_class(panel_id, crate::dom::HIDDEN)?;
        if let Some(Trigger {
            id,
            active_class: Some(class),
        }) = trigger
        {
            self.document.toggle_class(id, class);
        }
        self.publish(panel_id, !hidden);
        Some(!hidden)
    }

    /// 隐藏面板并清除激活样式
    pub fn hide(&self, panel_id: &str, trigger: Option<Trigger<'_>>) {
        if !self.document.hide(panel_id) {
            return;
        }
        if let Some(Trigger {
            id,
            active_class: Some(class),
        }) = trigger
        {
            self.document.remove_class(id, class);
        }
        self.publish(panel_id, false);
    }

    /// 点击位置既不在触发按钮内也不在面板内时隐藏
    pub fn dismiss_on_outside_click(&self, panel_id: &str, trigger_id: &str, target: &str) -> bool {
        if self.document.contains(trigger_id, target) || self.document.contains(panel_id, target) {
            return false;
        }
        if self.document.is_hidden(panel_id) {
            return false;
        }
        debug!("点击 {} 位于 {} 之外，收起面板", target, panel_id);
        self.hide(panel_id, None);
        true
    }

    /// 只有点击遮罩本身时隐藏（点击内部内容不隐藏）
    pub fn dismiss_on_backdrop_click(
        &self,
        panel_id: &str,
        trigger: Option<Trigger<'_>>,
        target: &str,
    ) -> bool {
        if target != panel_id {
            return false;
        }
        self.hide(panel_id, trigger);
        true
    }

    /// 显示一个区域并隐藏另一个
    pub fn swap(&self, show_id: &str, hide_id: &str) {
        self.document.show(show_id);
        self.document.hide(hide_id);
        self.publish(show_id, true);
        self.publish(hide_id, false);
    }

    pub fn is_visible(&self, panel_id: &str) -> bool {
        self.document.contains_id(panel_id) && !self.document.is_hidden(panel_id)
    }

    fn publish(&self, panel_id: &str, visible: bool) {
        self.event_bus.publish(AppEvent::PanelToggled {
            panel_id: panel_id.to_string(),
            visible,
        });
    }
}
