// 天气绑定 - 当前天气与逐日预报

use async_trait::async_trait;
use chrono::{DateTime, Local};

use super::{num, Binding};
use crate::api::FarmApi;
use crate::dom::{escape_html, Document};
use crate::error::ApiError;
use crate::models::{DailyForecast, GeoLocation, WeatherSnapshot};

/// 天气绑定
pub struct WeatherBinding {
    location: GeoLocation,
}

impl WeatherBinding {
    pub fn new(location: GeoLocation) -> Self {
        Self { location }
    }
}

fn forecast_card(day: &DailyForecast) -> String {
    format!(
        r#"<div class="bg-white bg-opacity-20 p-2 rounded-lg text-center"><div class="text-xs font-semibold">{}</div><div class="text-lg">{}</div><div class="text-xs">{}°/{}°</div><div class="text-xs opacity-75">{}%</div></div>"#,
        escape_html(&day.day),
        escape_html(&day.icon),
        num(day.high),
        num(day.low),
        num(day.rain)
    )
}

#[async_trait]
impl Binding for WeatherBinding {
    type Request = ();
    type Payload = WeatherSnapshot;

    fn name(&self) -> &'static str {
        "weather"
    }

    fn anchor(&self) -> Option<&'static str> {
        Some("todayWeather")
    }

    async fn fetch(&self, api: &FarmApi, _request: &()) -> Result<WeatherSnapshot, ApiError> {
        api.weather(self.location).await
    }

    fn render(
        &self,
        document: &Document,
        _request: &(),
        snapshot: &WeatherSnapshot,
        now: DateTime<Local>,
    ) -> Result<(), ApiError> {
        let current = &snapshot.current;
        document.set_text("temperature", format!("{}°C", num(current.temp)));
        document.set_text("condition", current.condition.clone());
        document.set_text("humidity", format!("{}%", num(current.humidity)));
        document.set_text("windSpeed", format!("{} km/h", num(current.wind_speed)));
        document.set_text("rainfall", format!("{}mm", num(current.rainfall)));
        document.set_text("uvIndex", num(current.uv_index));

        let cards: String = snapshot.forecast.iter().map(forecast_card).collect();
        document.set_inner_html("weatherForecast", cards);

        document.set_text(
            "lastUpdated",
            format!("Last updated: {}", now.format("%I:%M %P")),
        );
        Ok(())
    }

    fn failure_message(&self, _request: &(), error: &ApiError) -> String {
        match error.server_message() {
            Some(message) => format!("Weather update failed: {}", message),
            None => "Unable to load weather data. Please try again later.".to_string(),
        }
    }
}
