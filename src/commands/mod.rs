//! 页面事件分发
//!
//! 把用户操作路由到各模块，按功能分组：
//! - events: 事件与处理结果
//! - page: 菜单、仪表盘、有机菜单、朗读
//! - data: 天气、行情、作物详情、病害识别
//! - interaction: 表单与聊天

pub mod data;
pub mod events;
pub mod interaction;
pub mod page;

pub use events::{DispatchOutcome, UiEvent};

use tracing::debug;

use crate::chat::{CHAT_INPUT, QUICK_QUESTION_CLASS};
use crate::AppState;

/// 分发一个页面事件
pub async fn dispatch(state: &AppState, event: UiEvent) -> DispatchOutcome {
    debug!("页面事件: {:?}", event);

    match event {
        UiEvent::Click { target } => click(state, &target).await,
        UiEvent::DoubleClick { selection } => page::speak_selection(state, &selection).await,
        UiEvent::KeyPress { target, key } if target == CHAT_INPUT => {
            interaction::chat_key_press(state, &key)
        }
        UiEvent::KeyPress { .. } => DispatchOutcome::Ignored,
        UiEvent::Input { target, value } => interaction::set_input(state, &target, value),
        UiEvent::Change { target, checked } => interaction::set_checked(state, &target, checked),
        UiEvent::Submit { form } => interaction::submit_form(state, &form),
        UiEvent::LanguageChanged { language } => page::change_language(state, &language).await,
        UiEvent::FileSelected { target, file } => data::select_file(state, &target, file),
    }
}

async fn click(state: &AppState, target: &str) -> DispatchOutcome {
    let document = state.page_domain.get_document();
    if !document.contains_id(target) {
        return DispatchOutcome::Ignored;
    }

    let outcome = match target {
        page::MENU_BUTTON => page::toggle_dashboard(state),
        "closeDashboard" => page::close_dashboard(state),
        page::DASHBOARD_OVERLAY => page::dashboard_backdrop(state, target),
        "organicDashboardBtn" => page::open_organic_dashboard(state),
        page::ORGANIC_MENU_TOGGLE => page::toggle_organic_menu(state),
        "voiceBtn" => page::toggle_voice(state).await,

        "toggleForecast" => data::toggle_forecast(state),
        "refreshPrices" => data::refresh_prices(state).await,
        "backToCrops" => data::back_to_crops(state),
        "backToPestList" => data::back_to_pest_list(state),
        "startScan" => data::start_scan(state),
        "captureImage" => data::capture_image(state),
        "readScanResult" => data::read_scan_result(state).await,
        "saveResults" => data::save_results(state),
        "shareResults" => data::share_results(state),

        "chatToggle" => interaction::toggle_chat(state),
        "closeChatbot" => interaction::close_chat(state),
        "chatSend" => interaction::send_chat(state),
        "voiceInput" => interaction::start_voice_input(state),
        "quickHelp" => interaction::show_quick_help(state),

        _ => delegated_click(state, target).await,
    };

    // 文档级监听：任何点击都可能收起有机菜单
    let dismissed = page::dismiss_organic_menu(state, target);
    if dismissed && outcome == DispatchOutcome::Ignored {
        DispatchOutcome::Handled
    } else {
        outcome
    }
}

/// 按 class 绑定的卡片和按钮，点击子元素同样生效
async fn delegated_click(state: &AppState, target: &str) -> DispatchOutcome {
    let document = state.page_domain.get_document();

    if let Some(card) = document.closest(target, "dashboard-card") {
        return page::open_dashboard_card(state, &card);
    }
    if let Some(card) = document.closest(target, "crop-card") {
        return data::open_crop_card(state, &card);
    }
    if let Some(button) = document.closest(target, QUICK_QUESTION_CLASS) {
        return interaction::ask_quick_question(state, &button);
    }
    DispatchOutcome::Ignored
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::browser::headless::HeadlessBrowser;
    use crate::domains::SystemDomain;
    use crate::dom::Element;
    use crate::models::PersistedAppConfig;
    use crate::settings::SettingsManager;

    async fn state_for(path: &str) -> (AppState, HeadlessBrowser, tempfile::TempDir) {
        state_with_backend("http://127.0.0.1:9", path).await
    }

    async fn state_with_backend(
        base_url: &str,
        path: &str,
    ) -> (AppState, HeadlessBrowser, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let settings = SettingsManager::new(dir.path().join("config.json"))
            .await
            .unwrap();
        let system = SystemDomain::new(Arc::new(settings));
        let browser = HeadlessBrowser::new("http://localhost", path);
        let config = PersistedAppConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        let state = AppState::build(&config, browser.browser(), "tok", system).unwrap();
        (state, browser, dir)
    }

    fn click_event(target: &str) -> UiEvent {
        UiEvent::Click {
            target: target.to_string(),
        }
    }

    #[tokio::test]
    async fn test_menu_and_dashboard() {
        let (state, browser, _dir) = state_for("/home/").await;
        let doc = state.page_domain.get_document().clone();

        assert_eq!(dispatch(&state, click_event("menuBtn")).await, DispatchOutcome::Handled);
        assert!(!doc.is_hidden("dashboardOverlay"));
        assert!(doc.has_class("menuBtn", "hamburger-active"));

        // 点击面板内部不关闭
        assert_eq!(
            dispatch(&state, click_event("dashboardPanel")).await,
            DispatchOutcome::Ignored
        );
        assert!(!doc.is_hidden("dashboardOverlay"));

        dispatch(&state, click_event("dashboardOverlay")).await;
        assert!(doc.is_hidden("dashboardOverlay"));
        assert!(!doc.has_class("menuBtn", "hamburger-active"));

        dispatch(&state, click_event("card-marketPage")).await;
        dispatch(&state, click_event("organicDashboardBtn")).await;
        assert_eq!(
            browser.location.history(),
            vec!["/market/".to_string(), "/organic/".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unknown_dashboard_page_navigates_nowhere() {
        let (state, browser, _dir) = state_for("/home/").await;
        state.page_domain.get_document().insert(
            Element::new("card-broken", "div")
                .class("dashboard-card")
                .attr("data-page", "missingPage")
                .parent("dashboardPanel"),
        );

        dispatch(&state, click_event("card-broken")).await;
        assert!(browser.location.history().is_empty());
        assert!(browser.alerts.messages().is_empty());
    }

    #[tokio::test]
    async fn test_organic_menu_outside_click() {
        let (state, _browser, _dir) = state_for("/home/").await;
        let doc = state.page_domain.get_document().clone();

        dispatch(&state, click_event("organicMenuToggle")).await;
        assert!(!doc.is_hidden("organicMenuOptions"));

        dispatch(&state, click_event("organicMenuVideos")).await;
        assert!(!doc.is_hidden("organicMenuOptions"));

        assert_eq!(dispatch(&state, click_event("body")).await, DispatchOutcome::Handled);
        assert!(doc.is_hidden("organicMenuOptions"));
    }

    #[tokio::test]
    async fn test_forecast_toggle() {
        let (state, _browser, _dir) = state_for("/home/").await;
        let doc = state.page_domain.get_document().clone();

        dispatch(&state, click_event("toggleForecast")).await;
        assert!(!doc.is_hidden("forecastView"));
        assert!(doc.is_hidden("todayWeather"));
        assert_eq!(doc.text("toggleForecast").as_deref(), Some("Today View"));

        dispatch(&state, click_event("toggleForecast")).await;
        assert!(doc.is_hidden("forecastView"));
        assert_eq!(doc.text("toggleForecast").as_deref(), Some("10-Day View"));
    }

    #[tokio::test]
    async fn test_scan_buttons() {
        let (state, browser, _dir) = state_for("/scanner/").await;

        dispatch(&state, click_event("startScan")).await;
        assert_eq!(
            browser.alerts.last().as_deref(),
            Some("Please upload an image first.")
        );

        dispatch(&state, click_event("shareResults")).await;
        assert_eq!(
            browser.alerts.last().as_deref(),
            Some(crate::binder::scan::SHARE_FALLBACK_MESSAGE)
        );

        dispatch(&state, click_event("readScanResult")).await;
        assert!(browser
            .synth
            .audible()
            .unwrap()
            .text
            .starts_with("Detected disease: "));
    }

    #[tokio::test]
    async fn test_back_button_falls_back_to_navigation() {
        let (state, browser, _dir) = state_for("/crops/").await;
        let doc = state.page_domain.get_document().clone();

        doc.hide("cropListSection");
        doc.show("cropDetails");
        dispatch(&state, click_event("backToCrops")).await;
        assert!(!doc.is_hidden("cropListSection"));
        assert!(doc.is_hidden("cropDetails"));
        assert!(browser.location.history().is_empty());

        doc.insert(Element::new("backToPestList", "button").parent("body"));
        dispatch(&state, click_event("backToPestList")).await;
        assert_eq!(browser.location.history(), vec!["/pest/".to_string()]);
    }

    #[tokio::test]
    async fn test_review_submit_and_unknown_targets() {
        let (state, browser, _dir) = state_for("/review/").await;

        assert_eq!(
            dispatch(
                &state,
                UiEvent::Submit {
                    form: "reviewForm".to_string()
                }
            )
            .await,
            DispatchOutcome::PreventDefault
        );
        assert_eq!(
            browser.alerts.last().as_deref(),
            Some("Please select a rating before submitting.")
        );

        assert_eq!(
            dispatch(&state, click_event("noSuchButton")).await,
            DispatchOutcome::Ignored
        );
        assert_eq!(
            dispatch(
                &state,
                UiEvent::KeyPress {
                    target: "chatInput".to_string(),
                    key: "a".to_string()
                }
            )
            .await,
            DispatchOutcome::Ignored
        );
    }

    fn input_event(target: &str, value: &str) -> UiEvent {
        UiEvent::Input {
            target: target.to_string(),
            value: value.to_string(),
        }
    }

    #[tokio::test]
    async fn test_review_form_filled_then_submitted() {
        let (state, browser, _dir) = state_for("/review/").await;
        let submit = || UiEvent::Submit {
            form: "reviewForm".to_string(),
        };

        for rating in ["rating2", "rating5"] {
            let change = UiEvent::Change {
                target: rating.to_string(),
                checked: true,
            };
            assert_eq!(dispatch(&state, change).await, DispatchOutcome::Handled);
        }
        assert_eq!(
            dispatch(&state, input_event("reviewText", "Very useful")).await,
            DispatchOutcome::Handled
        );

        let doc = state.page_domain.get_document();
        assert_eq!(doc.checked_in_group("rating").unwrap().id, "rating5");
        assert_eq!(doc.value("reviewText").as_deref(), Some("Very useful"));

        assert_eq!(dispatch(&state, submit()).await, DispatchOutcome::Proceed);
        assert!(browser.alerts.messages().is_empty());
    }

    #[tokio::test]
    async fn test_input_on_missing_element_is_ignored() {
        let (state, _browser, _dir) = state_for("/home/").await;
        assert_eq!(
            dispatch(&state, input_event("phoneNumber", "98765")).await,
            DispatchOutcome::Ignored
        );
        let change = UiEvent::Change {
            target: "rating1".to_string(),
            checked: true,
        };
        assert_eq!(dispatch(&state, change).await, DispatchOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_signup_typed_then_submitted() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/api/register-farmer/"))
            .and(wiremock::matchers::body_string(
                "phoneNumber=9876543210&emailId=ravi%40example.com",
            ))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": true, "message": "Registration successful!"}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let (state, browser, _dir) = state_with_backend(&server.uri(), "/signup/").await;
        dispatch(&state, input_event("phoneNumber", "9876543210")).await;
        dispatch(&state, input_event("emailId", "ravi@example.com")).await;

        let outcome = dispatch(
            &state,
            UiEvent::Submit {
                form: "registrationForm".to_string(),
            },
        )
        .await;
        // 提交之后的输入不影响已发出的表单
        dispatch(&state, input_event("phoneNumber", "")).await;
        assert_eq!(outcome, DispatchOutcome::PreventDefault);

        state.settle().await;
        assert_eq!(
            browser.alerts.last().as_deref(),
            Some("Registration successful!")
        );
        assert_eq!(browser.location.history(), vec!["/home/".to_string()]);
        assert!(state.page_domain.is_stale());
    }

    #[tokio::test]
    async fn test_chat_typed_then_sent_with_enter() {
        let (state, _browser, _dir) = state_for("/home/").await;
        let doc = state.page_domain.get_document().clone();

        dispatch(&state, input_event("chatInput", "Tell me about wheat")).await;
        let enter = UiEvent::KeyPress {
            target: "chatInput".to_string(),
            key: "Enter".to_string(),
        };
        assert_eq!(dispatch(&state, enter).await, DispatchOutcome::Handled);
        assert_eq!(state.background.pending(), 1);

        state.settle().await;
        assert!(doc
            .inner_html("chatMessages")
            .unwrap()
            .contains("Wheat Cultivation Guide"));
    }
}
