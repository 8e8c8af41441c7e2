// 页面导航 - 逻辑页面 id 到路径的静态映射
//
// 只做整页跳转，历史记录完全交给浏览器

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::browser::Location;
use crate::error::NavigationError;
use crate::event_bus::{AppEvent, EventBus};

/// 页面路由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRoute {
    pub id: &'static str,
    pub path: &'static str,
}

const fn route(id: &'static str, path: &'static str) -> PageRoute {
    PageRoute { id, path }
}

/// 路由表
pub const PAGE_ROUTES: &[PageRoute] = &[
    route("homePage", "/home/"),
    route("cropsPage", "/crops/"),
    route("marketPage", "/market/"),
    route("scannerPage", "/scanner/"),
    route("dbtPage", "/dbt/"),
    route("pestPage", "/pest/"),
    route("organicMainPage", "/organic/"),
    route("videosPage", "/videos/"),
    route("agriNewsPage", "/agri-news/"),
    route("ctocPage", "/connect-companies/"),
    route("jobsPage", "/jobs/"),
    route("benefitsPage", "/benefits/"),
    route("organicPestPage", "/organic-pest/"),
    route("registrationPage", "/signup/"),
    route("reviewPage", "/review/"),
    route("reviewsListPage", "/reviews/all/"),
];

/// 按 id 查找路由
pub fn route_for(page_id: &str) -> Option<&'static PageRoute> {
    PAGE_ROUTES.iter().find(|r| r.id == page_id)
}

pub fn routes() -> impl Iterator<Item = &'static PageRoute> {
    PAGE_ROUTES.iter()
}

/// 当前页面上下文，决定详情绑定器使用的字段结构
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageContext {
    /// 种植指南页
    Crops,
    /// 病虫害管理页
    Pest,
    /// 其他页面
    Other,
}

impl PageContext {
    /// 由当前路径确定上下文，只在构建控制器时调用一次
    pub fn from_path(path: &str) -> Self {
        let path = path.trim_end_matches('/');
        if path == "/pest" {
            Self::Pest
        } else if path == "/crops" {
            Self::Crops
        } else {
            Self::Other
        }
    }
}

/// 导航器
#[derive(Clone)]
pub struct Router {
    location: Arc<dyn Location>,
    event_bus: Arc<EventBus>,
}

impl Router {
    pub fn new(location: Arc<dyn Location>, event_bus: Arc<EventBus>) -> Self {
        Self {
            location,
            event_bus,
        }
    }

    /// 跳转到页面；未知 id 只记录错误
    pub fn navigate_to(&self, page_id: &str) -> Result<&'static str, NavigationError> {
        let Some(route) = route_for(page_id) else {
            let err = NavigationError::UnknownPage(page_id.to_string());
            error!("{}", err);
            return Err(err);
        };

        info!("导航到 {} ({})", route.id, route.path);
        self.location.assign(route.path);
        self.event_bus.publish(AppEvent::Navigated {
            page_id: route.id.to_string(),
            path: route.path.to_string(),
        });
        Ok(route.path)
    }

    /// 直接跳转到路径（表单成功后返回首页等）
    pub fn assign(&self, path: &str) {
        info!("跳转到 {}", path);
        self.location.assign(path);
        let page_id = PAGE_ROUTES
            .iter()
            .find(|r| r.path == path)
            .map(|r| r.id.to_string())
            .unwrap_or_default();
        self.event_bus.publish(AppEvent::Navigated {
            page_id,
            path: path.to_string(),
        });
    }

    pub fn current_path(&self) -> String {
        self.location.pathname()
    }

    pub fn href(&self) -> String {
        self.location.href()
    }
}
