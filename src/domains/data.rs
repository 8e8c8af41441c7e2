// 数据领域管理器
//
// 持有天气、行情、作物详情和病害识别四个绑定器，以及两个轮询任务

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::info;

use crate::binder::{
    CropDetailsBinder, DataBinder, MarketBinding, Poller, PollerHandle, ScanBinding,
    WeatherBinding,
};

/// 数据领域管理器
pub struct DataDomain {
    weather: Arc<DataBinder<WeatherBinding>>,
    market: Arc<DataBinder<MarketBinding>>,
    details: Arc<CropDetailsBinder>,
    scan: Arc<DataBinder<ScanBinding>>,
    pollers: Mutex<Vec<PollerHandle>>,
}

impl DataDomain {
    pub fn new(
        weather: DataBinder<WeatherBinding>,
        market: DataBinder<MarketBinding>,
        details: CropDetailsBinder,
        scan: DataBinder<ScanBinding>,
    ) -> Self {
        Self {
            weather: Arc::new(weather),
            market: Arc::new(market),
            details: Arc::new(details),
            scan: Arc::new(scan),
            pollers: Mutex::new(Vec::new()),
        }
    }

    pub fn get_weather(&self) -> &Arc<DataBinder<WeatherBinding>> {
        &self.weather
    }

    pub fn get_market(&self) -> &Arc<DataBinder<MarketBinding>> {
        &self.market
    }

    pub fn get_details(&self) -> &Arc<CropDetailsBinder> {
        &self.details
    }

    pub fn get_scan(&self) -> &Arc<DataBinder<ScanBinding>> {
        &self.scan
    }

    /// 启动天气和行情轮询，已在运行的先停止
    pub fn start_polling(&self, weather_period: Duration, market_period: Duration) {
        self.stop_polling();

        let handles = vec![
            Poller::start(self.weather.clone(), (), weather_period),
            Poller::start(self.market.clone(), (), market_period),
        ];
        if let Ok(mut pollers) = self.pollers.lock() {
            *pollers = handles;
        }
    }

    /// 停止全部轮询
    pub fn stop_polling(&self) {
        let handles = match self.pollers.lock() {
            Ok(mut pollers) => std::mem::take(&mut *pollers),
            Err(_) => return,
        };
        if !handles.is_empty() {
            info!("停止 {} 个轮询任务", handles.len());
        }
        for handle in handles {
            handle.stop();
        }
    }

    /// 正在运行的轮询任务
    pub fn polling_names(&self) -> Vec<&'static str> {
        self.pollers
            .lock()
            .map(|pollers| {
                pollers
                    .iter()
                    .filter(|p| !p.is_finished())
                    .map(|p| p.name())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Drop for DataDomain {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
