// 页面领域管理器
//
// 负责文档、浏览器能力、导航、面板和语音开关

use crate::browser::Browser;
use crate::dom::Document;
use crate::navigation::Router;
use crate::panels::PanelToggler;
use crate::speech::{SpeechAdapter, VoiceControls};

/// 页面领域管理器
#[derive(Clone)]
pub struct PageDomain {
    document: Document,
    browser: Browser,
    router: Router,
    panels: PanelToggler,
    speech: SpeechAdapter,
    voice: VoiceControls,
    /// 构建文档时的路径
    path: String,
}

impl PageDomain {
    pub fn new(
        document: Document,
        browser: Browser,
        router: Router,
        panels: PanelToggler,
        speech: SpeechAdapter,
        voice: VoiceControls,
        path: impl Into<String>,
    ) -> Self {
        Self {
            document,
            browser,
            router,
            panels,
            speech,
            voice,
            path: path.into(),
        }
    }

    pub fn get_document(&self) -> &Document {
        &self.document
    }

    pub fn get_browser(&self) -> &Browser {
        &self.browser
    }

    pub fn get_router(&self) -> &Router {
        &self.router
    }

    pub fn get_panels(&self) -> &PanelToggler {
        &self.panels
    }

    pub fn get_speech(&self) -> &SpeechAdapter {
        &self.speech
    }

    pub fn get_voice(&self) -> &VoiceControls {
        &self.voice
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// 整页跳转之后文档仍是旧页面的
    pub fn is_stale(&self) -> bool {
        self.router.current_path() != self.path
    }
}
