//! 页面命令
//!
//! 菜单与仪表盘、有机菜单、朗读开关、语言选择和双击朗读

use tracing::debug;

use super::DispatchOutcome;
use crate::panels::Trigger;
use crate::AppState;

pub const MENU_BUTTON: &str = "menuBtn";
pub const DASHBOARD_OVERLAY: &str = "dashboardOverlay";
pub const ORGANIC_MENU_TOGGLE: &str = "organicMenuToggle";
pub const ORGANIC_MENU_OPTIONS: &str = "organicMenuOptions";

const HAMBURGER_ACTIVE: &str = "hamburger-active";

fn menu_trigger() -> Option<Trigger<'static>> {
    Some(Trigger::with_active(MENU_BUTTON, HAMBURGER_ACTIVE))
}

/// 菜单按钮：切换仪表盘
pub fn toggle_dashboard(state: &AppState) -> DispatchOutcome {
    match state
        .page_domain
        .get_panels()
        .toggle(DASHBOARD_OVERLAY, menu_trigger())
    {
        Some(_) => DispatchOutcome::Handled,
        None => DispatchOutcome::Ignored,
    }
}

/// 关闭仪表盘
pub fn close_dashboard(state: &AppState) -> DispatchOutcome {
    state
        .page_domain
        .get_panels()
        .hide(DASHBOARD_OVERLAY, menu_trigger());
    DispatchOutcome::Handled
}

/// 点击遮罩本身时关闭仪表盘
pub fn dashboard_backdrop(state: &AppState, target: &str) -> DispatchOutcome {
    if state
        .page_domain
        .get_panels()
        .dismiss_on_backdrop_click(DASHBOARD_OVERLAY, menu_trigger(), target)
    {
        DispatchOutcome::Handled
    } else {
        DispatchOutcome::Ignored
    }
}

/// 仪表盘卡片：跳转到 data-page 指定的页面
pub fn open_dashboard_card(state: &AppState, card_id: &str) -> DispatchOutcome {
    let document = state.page_domain.get_document();
    match document.attr(card_id, "data-page") {
        Some(page_id) if !page_id.is_empty() => {
            // 未知页面只记录日志
            let _ = state.page_domain.get_router().navigate_to(&page_id);
            DispatchOutcome::Handled
        }
        _ => DispatchOutcome::Ignored,
    }
}

/// 仪表盘上的有机农业入口
pub fn open_organic_dashboard(state: &AppState) -> DispatchOutcome {
    let _ = state.page_domain.get_router().navigate_to("organicMainPage");
    DispatchOutcome::Handled
}

/// 切换有机菜单
pub fn toggle_organic_menu(state: &AppState) -> DispatchOutcome {
    match state
        .page_domain
        .get_panels()
        .toggle(ORGANIC_MENU_OPTIONS, None)
    {
        Some(_) => DispatchOutcome::Handled,
        None => DispatchOutcome::Ignored,
    }
}

/// 页面任意位置的点击：落在有机菜单和按钮之外时收起菜单
pub fn dismiss_organic_menu(state: &AppState, target: &str) -> bool {
    let document = state.page_domain.get_document();
    if !document.contains_id(ORGANIC_MENU_TOGGLE) || !document.contains_id(ORGANIC_MENU_OPTIONS) {
        return false;
    }
    state.page_domain.get_panels().dismiss_on_outside_click(
        ORGANIC_MENU_OPTIONS,
        ORGANIC_MENU_TOGGLE,
        target,
    )
}

/// 朗读开关
pub async fn toggle_voice(state: &AppState) -> DispatchOutcome {
    state.page_domain.get_voice().toggle_voice().await;
    DispatchOutcome::Handled
}

/// 切换朗读语言
pub async fn change_language(state: &AppState, language: &str) -> DispatchOutcome {
    state.page_domain.get_voice().change_language(language).await;
    DispatchOutcome::Handled
}

/// 双击朗读选中文本
pub async fn speak_selection(state: &AppState, selection: &str) -> DispatchOutcome {
    if state
        .page_domain
        .get_speech()
        .speak_selection(selection)
        .await
    {
        DispatchOutcome::Handled
    } else {
        debug!("朗读未开启或没有选中文本");
        DispatchOutcome::Ignored
    }
}
