// 页面模板 - 每个页面固定的元素集合
//
// 公共布局（菜单、仪表盘、语音按钮、聊天窗口、有机菜单）加上页面主体

use super::{Document, Element};
use crate::binder::details::{CultivationSchema, PestSchema, RecordSchema};

/// 仪表盘卡片对应的页面
const DASHBOARD_PAGES: &[&str] = &[
    "homePage",
    "cropsPage",
    "marketPage",
    "scannerPage",
    "dbtPage",
    "pestPage",
    "organicMainPage",
    "reviewPage",
];

/// 作物列表中展示的作物
pub const CROP_CARDS: &[&str] = &[
    "wheat", "rice", "maize", "barley", "gram", "mustard", "cotton", "sugarcane", "potato",
    "tomato", "onion", "mango",
];

/// 按路径构建页面文档
pub fn document_for(path: &str, csrf_token: &str) -> Document {
    let doc = Document::new();
    layout(&doc, csrf_token);

    match path {
        "/home/" => home_body(&doc),
        "/market/" => market_body(&doc),
        "/crops/" => crops_body(&doc),
        "/pest/" => pest_body(&doc),
        "/scanner/" => scanner_body(&doc),
        "/dbt/" => dbt_body(&doc),
        "/signup/" => signup_body(&doc),
        "/connect-companies/" => company_body(&doc),
        "/review/" => review_body(&doc),
        _ => {}
    }

    doc
}

fn layout(doc: &Document, csrf_token: &str) {
    doc.insert(Element::new("body", "body"));
    doc.insert(
        Element::new("csrfToken", "input")
            .attr("type", "hidden")
            .name("csrfmiddlewaretoken")
            .value(csrf_token)
            .parent("body"),
    );

    // 菜单与仪表盘
    doc.insert(Element::new("menuBtn", "button").parent("body"));
    doc.insert(Element::new("dashboardOverlay", "div").hidden().parent("body"));
    doc.insert(Element::new("dashboardPanel", "div").parent("dashboardOverlay"));
    doc.insert(Element::new("closeDashboard", "button").parent("dashboardPanel"));
    for page in DASHBOARD_PAGES {
        doc.insert(
            Element::new(format!("card-{}", page), "div")
                .class("dashboard-card")
                .attr("data-page", *page)
                .parent("dashboardPanel"),
        );
    }
    doc.insert(Element::new("organicDashboardBtn", "button").parent("dashboardPanel"));

    // 语音
    doc.insert(
        Element::new("voiceBtn", "button")
            .class("voice-pulse")
            .text("🔊 Voice")
            .parent("body"),
    );
    doc.insert(Element::new("languageSelect", "select").value("en-US").parent("body"));

    // 聊天窗口
    doc.insert(Element::new("chatToggle", "button").parent("body"));
    doc.insert(Element::new("chatWindow", "div").hidden().parent("body"));
    doc.insert(Element::new("closeChatbot", "button").parent("chatWindow"));
    doc.insert(Element::new("chatMessages", "div").parent("chatWindow"));
    doc.insert(Element::new("chatInput", "input").parent("chatWindow"));
    doc.insert(Element::new("chatSend", "button").parent("chatWindow"));
    doc.insert(
        Element::new("voiceInput", "button")
            .text("🎤 Voice Input")
            .parent("chatWindow"),
    );
    doc.insert(Element::new("quickHelp", "button").parent("chatWindow"));

    // 有机菜单
    doc.insert(Element::new("organicMenuToggle", "button").parent("body"));
    doc.insert(Element::new("organicMenuOptions", "div").hidden().parent("body"));
    doc.insert(
        Element::new("organicMenuVideos", "a")
            .attr("href", "/videos/")
            .parent("organicMenuOptions"),
    );
}

fn home_body(doc: &Document) {
    doc.insert(Element::new("todayWeather", "div").parent("body"));
    for id in [
        "temperature",
        "condition",
        "humidity",
        "windSpeed",
        "rainfall",
        "uvIndex",
    ] {
        doc.insert(Element::new(id, "span").parent("todayWeather"));
    }
    doc.insert(Element::new("forecastView", "div").hidden().parent("body"));
    doc.insert(Element::new("weatherForecast", "div").parent("forecastView"));
    doc.insert(
        Element::new("toggleForecast", "button")
            .text("10-Day View")
            .parent("body"),
    );
    doc.insert(Element::new("lastUpdated", "p").parent("body"));
}

fn market_body(doc: &Document) {
    for id in [
        "cerealPrices",
        "vegetablePrices",
        "pulsesPrices",
        "topDemandCrops",
        "marketAnalysis",
    ] {
        doc.insert(Element::new(id, "div").parent("body"));
    }
    doc.insert(Element::new("priceUpdateTime", "span").parent("body"));
    doc.insert(Element::new("refreshPrices", "button").parent("body"));
}

fn crop_list(doc: &Document) {
    doc.insert(Element::new("cropListSection", "div").parent("body"));
    for crop in CROP_CARDS {
        doc.insert(
            Element::new(format!("crop-card-{}", crop), "div")
                .class("crop-card")
                .attr("data-crop", *crop)
                .parent("cropListSection"),
        );
    }
}

fn detail_section<S: RecordSchema>(doc: &Document, back_button: &str) {
    doc.insert(Element::new(S::DETAILS_SECTION, "div").hidden().parent("body"));
    doc.insert(Element::new(S::TITLE_ID, "h2").parent(S::DETAILS_SECTION));
    for field in S::FIELDS {
        doc.insert(Element::new(*field, "p").parent(S::DETAILS_SECTION));
    }
    doc.insert(Element::new(back_button, "button").parent(S::DETAILS_SECTION));
}

fn crops_body(doc: &Document) {
    crop_list(doc);
    detail_section::<CultivationSchema>(doc, "backToCrops");
}

fn pest_body(doc: &Document) {
    crop_list(doc);
    detail_section::<PestSchema>(doc, "backToPestList");
}

fn scanner_body(doc: &Document) {
    doc.insert(
        Element::new("imageUpload", "input")
            .attr("type", "file")
            .parent("body"),
    );
    doc.insert(Element::new("startScan", "button").parent("body"));
    doc.insert(Element::new("captureImage", "button").parent("body"));
    doc.insert(Element::new("scanLine", "div").hidden().parent("body"));
    doc.insert(Element::new("scanResult", "div").hidden().parent("body"));
    for id in [
        "diseaseType",
        "diseaseDescription",
        "confidence",
        "treatmentList",
        "pesticideRecommendations",
        "preventionTips",
        "readScanResult",
        "saveResults",
        "shareResults",
    ] {
        doc.insert(Element::new(id, "div").parent("scanResult"));
    }
}

fn form_input(doc: &Document, form_id: &str, id: &str, name: &str) {
    doc.insert(
        Element::new(id, "input")
            .name(name)
            .form(form_id)
            .parent(form_id),
    );
}

fn dbt_body(doc: &Document) {
    doc.insert(Element::new("dbtForm", "form").parent("body"));
    form_input(doc, "dbtForm", "dbtAadhaar", "dbtAadhaar");
    form_input(doc, "dbtForm", "bankAccount", "bankAccount");
    doc.insert(Element::new("dbtResult", "div").hidden().parent("body"));
    doc.insert(Element::new("dbtResultText", "p").parent("dbtResult"));
}

fn signup_body(doc: &Document) {
    doc.insert(Element::new("registrationForm", "form").parent("body"));
    form_input(doc, "registrationForm", "phoneNumber", "phoneNumber");
    form_input(doc, "registrationForm", "emailId", "emailId");
}

fn company_body(doc: &Document) {
    doc.insert(Element::new("companyConnectForm", "form").parent("body"));
    form_input(doc, "companyConnectForm", "farmerName", "farmer_name");
    form_input(doc, "companyConnectForm", "contactNumber", "contact_number");
    form_input(doc, "companyConnectForm", "cropType", "crop_type");
    form_input(doc, "companyConnectForm", "quantity", "quantity");
}

fn review_body(doc: &Document) {
    doc.insert(
        Element::new("reviewForm", "form")
            .attr("action", "/review/")
            .parent("body"),
    );
    for rating in 1..=5 {
        doc.insert(
            Element::new(format!("rating{}", rating), "input")
                .attr("type", "radio")
                .name("rating")
                .value(rating.to_string())
                .form("reviewForm")
                .parent("reviewForm"),
        );
    }
    form_input(doc, "reviewForm", "reviewText", "review_text");
}
