//! 数据命令
//!
//! 天气视图切换、行情刷新、作物卡片与返回按钮、病害识别相关按钮

use tracing::{debug, info};

use super::DispatchOutcome;
use crate::binder::details::LIST_SECTION;
use crate::binder::scan::{
    self, ScanBinding, CAPTURE_MESSAGE, NO_IMAGE_MESSAGE, SAVED_MESSAGE, SHARE_FALLBACK_MESSAGE,
};
use crate::binder::{CultivationSchema, PestSchema, RecordSchema};
use crate::dom::FileUpload;
use crate::event_bus::AppEvent;
use crate::AppState;

const TODAY_VIEW: &str = "todayWeather";
const FORECAST_VIEW: &str = "forecastView";
const FORECAST_TOGGLE: &str = "toggleForecast";

const PRICES_UPDATED: &str = "Market prices updated successfully";

fn alert(state: &AppState, message: &str) {
    state.page_domain.get_browser().dialogs.alert(message);
    state.event_bus.publish(AppEvent::Alerted {
        message: message.to_string(),
    });
}

/// 今日 / 10 日视图切换
pub fn toggle_forecast(state: &AppState) -> DispatchOutcome {
    let document = state.page_domain.get_document();
    let panels = state.page_domain.get_panels();

    if document.is_hidden(FORECAST_VIEW) {
        panels.swap(FORECAST_VIEW, TODAY_VIEW);
        document.set_text(FORECAST_TOGGLE, "Today View");
    } else {
        panels.swap(TODAY_VIEW, FORECAST_VIEW);
        document.set_text(FORECAST_TOGGLE, "10-Day View");
    }
    DispatchOutcome::Handled
}

/// 手动刷新行情
///
/// 刷新提示在请求发出时就播报，不等结果
pub async fn refresh_prices(state: &AppState) -> DispatchOutcome {
    info!("手动刷新行情");
    let market = state.data_domain.get_market().clone();
    state.background.spawn(async move {
        let _ = market.bind(&()).await;
    });

    state.page_domain.get_speech().announce(PRICES_UPDATED).await;
    DispatchOutcome::Handled
}

/// 作物卡片：加载详情
pub fn open_crop_card(state: &AppState, card_id: &str) -> DispatchOutcome {
    let Some(crop) = state.page_domain.get_document().attr(card_id, "data-crop") else {
        return DispatchOutcome::Ignored;
    };
    debug!("打开作物详情: {}", crop);
    let details = state.data_domain.get_details().clone();
    // 失败已在绑定器内提示
    state.background.spawn(async move {
        let _ = details.show(&crop).await;
    });
    DispatchOutcome::Handled
}

/// 详情页返回列表；页面缺少区域时整页回到列表页
pub fn back_to_list<S: RecordSchema>(state: &AppState, page_id: &str) -> DispatchOutcome {
    let document = state.page_domain.get_document();
    if document.contains_id(LIST_SECTION) && document.contains_id(S::DETAILS_SECTION) {
        state
            .page_domain
            .get_panels()
            .swap(LIST_SECTION, S::DETAILS_SECTION);
    } else {
        let _ = state.page_domain.get_router().navigate_to(page_id);
    }
    DispatchOutcome::Handled
}

pub fn back_to_crops(state: &AppState) -> DispatchOutcome {
    back_to_list::<CultivationSchema>(state, "cropsPage")
}

pub fn back_to_pest_list(state: &AppState) -> DispatchOutcome {
    back_to_list::<PestSchema>(state, "pestPage")
}

/// 文件选择
pub fn select_file(state: &AppState, target: &str, file: FileUpload) -> DispatchOutcome {
    if state
        .page_domain
        .get_document()
        .set_files(target, vec![file])
    {
        DispatchOutcome::Handled
    } else {
        DispatchOutcome::Ignored
    }
}

/// 开始识别
pub fn start_scan(state: &AppState) -> DispatchOutcome {
    let Some(image) = ScanBinding::selected_image(state.page_domain.get_document()) else {
        alert(state, NO_IMAGE_MESSAGE);
        return DispatchOutcome::Handled;
    };
    let scan = state.data_domain.get_scan().clone();
    state.background.spawn(async move {
        let _ = scan.bind(&image).await;
    });
    DispatchOutcome::Handled
}

pub fn capture_image(state: &AppState) -> DispatchOutcome {
    alert(state, CAPTURE_MESSAGE);
    DispatchOutcome::Handled
}

pub fn save_results(state: &AppState) -> DispatchOutcome {
    alert(state, SAVED_MESSAGE);
    DispatchOutcome::Handled
}

/// 朗读识别结果（不受朗读开关限制）
pub async fn read_scan_result(state: &AppState) -> DispatchOutcome {
    let summary = scan::scan_summary(state.page_domain.get_document());
    state.page_domain.get_speech().speak_current(&summary).await;
    DispatchOutcome::Handled
}

/// 分享识别报告，不支持系统分享时提示
pub fn share_results(state: &AppState) -> DispatchOutcome {
    let browser = state.page_domain.get_browser();
    if browser.share.can_share() {
        let data = scan::share_data(
            state.page_domain.get_document(),
            state.page_domain.get_router().href(),
        );
        browser.share.share(data);
    } else {
        alert(state, SHARE_FALLBACK_MESSAGE);
    }
    DispatchOutcome::Handled
}
