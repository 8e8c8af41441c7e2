//! 交互命令
//!
//! 表单提交和聊天窗口

use super::DispatchOutcome;
use crate::forms::{SubmitDecision, COMPANY_FORM, DBT_FORM, REGISTRATION_FORM};
use crate::AppState;

const CHAT_WINDOW: &str = "chatWindow";
const REVIEW_ACTION_SUFFIX: &str = "/review/";

/// 表单提交
///
/// 由控制器接管的表单在后台提交，字段取提交事件那一刻的值
pub fn submit_form(state: &AppState, form_id: &str) -> DispatchOutcome {
    let forms = state.interaction_domain.get_forms().clone();

    match form_id {
        REGISTRATION_FORM => {
            let submission = forms.snapshot(form_id);
            state.background.spawn(async move {
                forms.register(&submission).await;
            });
            DispatchOutcome::PreventDefault
        }
        DBT_FORM => {
            let submission = forms.snapshot(form_id);
            state.background.spawn(async move {
                forms.check_dbt(&submission).await;
            });
            DispatchOutcome::PreventDefault
        }
        COMPANY_FORM => {
            let submission = forms.snapshot(form_id);
            state.background.spawn(async move {
                forms.connect_company(&submission).await;
            });
            DispatchOutcome::PreventDefault
        }
        _ if is_review_form(state, form_id) => match forms.validate_review() {
            SubmitDecision::Prevent => DispatchOutcome::PreventDefault,
            SubmitDecision::Proceed => DispatchOutcome::Proceed,
        },
        // 其他表单不拦截
        _ => DispatchOutcome::Proceed,
    }
}

/// 评价表单按 action 识别
fn is_review_form(state: &AppState, form_id: &str) -> bool {
    state
        .page_domain
        .get_document()
        .attr(form_id, "action")
        .map(|action| action.ends_with(REVIEW_ACTION_SUFFIX))
        .unwrap_or(false)
}

/// 输入框内容变化
pub fn set_input(state: &AppState, target: &str, value: String) -> DispatchOutcome {
    if state.page_domain.get_document().set_value(target, value) {
        DispatchOutcome::Handled
    } else {
        DispatchOutcome::Ignored
    }
}

/// 勾选框和单选框
pub fn set_checked(state: &AppState, target: &str, checked: bool) -> DispatchOutcome {
    if state.page_domain.get_document().set_checked(target, checked) {
        DispatchOutcome::Handled
    } else {
        DispatchOutcome::Ignored
    }
}

pub fn toggle_chat(state: &AppState) -> DispatchOutcome {
    match state.page_domain.get_panels().toggle(CHAT_WINDOW, None) {
        Some(_) => DispatchOutcome::Handled,
        None => DispatchOutcome::Ignored,
    }
}

pub fn close_chat(state: &AppState) -> DispatchOutcome {
    state.page_domain.get_panels().hide(CHAT_WINDOW, None);
    DispatchOutcome::Handled
}

/// 发送输入框内容，回复在延迟后到达
pub fn send_chat(state: &AppState) -> DispatchOutcome {
    if let Some(reply) = state.interaction_domain.get_chat().send_input() {
        state.background.track(reply);
    }
    DispatchOutcome::Handled
}

pub fn chat_key_press(state: &AppState, key: &str) -> DispatchOutcome {
    if key == "Enter" {
        send_chat(state)
    } else {
        DispatchOutcome::Ignored
    }
}

pub fn start_voice_input(state: &AppState) -> DispatchOutcome {
    if let Some(listening) = state.interaction_domain.get_chat().start_voice_input() {
        state.background.track(listening);
    }
    DispatchOutcome::Handled
}

pub fn show_quick_help(state: &AppState) -> DispatchOutcome {
    state.interaction_domain.get_chat().show_quick_help();
    DispatchOutcome::Handled
}

pub fn ask_quick_question(state: &AppState, button_id: &str) -> DispatchOutcome {
    match state
        .interaction_domain
        .get_chat()
        .ask_quick_question(button_id)
    {
        Some(reply) => {
            state.background.track(reply);
            DispatchOutcome::Handled
        }
        None => DispatchOutcome::Ignored,
    }
}
