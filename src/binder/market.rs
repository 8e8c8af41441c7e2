// 行情绑定 - 三类价格、涨幅榜与趋势面板

use async_trait::async_trait;
use chrono::{DateTime, Local};

use super::{num, Binding};
use crate::api::FarmApi;
use crate::dom::{escape_html, Document};
use crate::error::ApiError;
use crate::models::{MarketBasket, PriceEntry};

/// 涨幅榜条数
pub const TOP_MOVERS: usize = 5;

/// 趋势面板，内容固定
const MARKET_ANALYSIS: &str = concat!(
    r#"<div class="text-center p-4 bg-green-50 rounded-lg"><div class="text-2xl font-bold text-green-600">📈 Rising</div><p class="text-sm text-gray-600">Pulses &amp; Organic Vegetables</p></div>"#,
    r#"<div class="text-center p-4 bg-yellow-50 rounded-lg"><div class="text-2xl font-bold text-yellow-600">→ Stable</div><p class="text-sm text-gray-600">Wheat &amp; Rice Prices</p></div>"#,
    r#"<div class="text-center p-4 bg-blue-50 rounded-lg"><div class="text-2xl font-bold text-blue-600">🎯 Opportunity</div><p class="text-sm text-gray-600">Export Quality Basmati</p></div>"#,
);

/// 行情绑定
#[derive(Default)]
pub struct MarketBinding;

impl MarketBinding {
    pub fn new() -> Self {
        Self
    }
}

fn price_label(entry: &PriceEntry) -> String {
    format!("₹{}/{}", num(entry.price), escape_html(entry.unit_label()))
}

fn change_label(entry: &PriceEntry) -> String {
    let arrow = if entry.is_rising() { "↗" } else { "↘" };
    format!("{} {}%", arrow, num(entry.change.abs()))
}

fn price_row(entry: &PriceEntry) -> String {
    let color = if entry.is_rising() {
        "text-green-600"
    } else {
        "text-red-600"
    };
    format!(
        r#"<div class="flex justify-between items-center border-b pb-2"><span class="font-medium">{}</span><div class="text-right"><div class="font-semibold">{}</div><div class="text-xs {}">{}</div></div></div>"#,
        escape_html(&entry.name),
        price_label(entry),
        color,
        change_label(entry)
    )
}

fn mover_card(entry: &PriceEntry) -> String {
    let color = if entry.is_rising() {
        "text-green-200"
    } else {
        "text-red-200"
    };
    format!(
        r#"<div class="bg-white bg-opacity-20 p-3 rounded-lg text-center"><div class="text-lg font-bold">{}</div><div class="text-sm">{}</div><div class="text-xs {}">{}</div></div>"#,
        escape_html(&entry.name),
        price_label(entry),
        color,
        change_label(entry)
    )
}

fn render_section(document: &Document, id: &str, entries: &[PriceEntry]) {
    let html: String = entries.iter().map(price_row).collect();
    document.set_inner_html(id, html);
}

#[async_trait]
impl Binding for MarketBinding {
    type Request = ();
    type Payload = MarketBasket;

    fn name(&self) -> &'static str {
        "market"
    }

    fn anchor(&self) -> Option<&'static str> {
        Some("cerealPrices")
    }

    async fn fetch(&self, api: &FarmApi, _request: &()) -> Result<MarketBasket, ApiError> {
        api.market_prices().await
    }

    fn render(
        &self,
        document: &Document,
        _request: &(),
        basket: &MarketBasket,
        now: DateTime<Local>,
    ) -> Result<(), ApiError> {
        render_section(document, "cerealPrices", &basket.cereals);
        render_section(document, "vegetablePrices", &basket.vegetables);
        render_section(document, "pulsesPrices", &basket.pulses);

        let movers: String = basket.top_movers(TOP_MOVERS).iter().map(mover_card).collect();
        document.set_inner_html("topDemandCrops", movers);
        document.set_inner_html("marketAnalysis", MARKET_ANALYSIS);

        document.set_text(
            "priceUpdateTime",
            now.format("%d/%m/%Y, %I:%M:%S %P").to_string(),
        );
        Ok(())
    }

    fn failure_message(&self, _request: &(), error: &ApiError) -> String {
        match error.server_message() {
            Some(message) => format!("Market prices update failed: {}", message),
            None => "Unable to load market prices. Please try again later.".to_string(),
        }
    }
}
