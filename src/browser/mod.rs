//! 浏览器能力接口
//!
//! 页面控制器只依赖这里的黑盒契约：
//! - 语音合成 / 语音识别
//! - 地址栏（当前路径与整页跳转）
//! - 弹窗提示
//! - 系统分享

pub mod headless;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SpeechError;

/// 可用的合成语音
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP 47 语言标签，例如 hi-IN
    pub lang: String,
}

/// 一次朗读请求
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub voice: Option<Voice>,
}

/// 语音合成能力
pub trait SpeechSynthesis: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }

    fn voices(&self) -> Vec<Voice>;

    /// 取消正在播放和排队的朗读
    fn cancel(&self);

    /// 异步播放，不等待结束
    fn speak(&self, utterance: Utterance);
}

/// 语音识别能力
#[async_trait]
pub trait SpeechRecognition: Send + Sync {
    fn is_available(&self) -> bool;

    /// 单次识别，返回第一条转写结果
    async fn recognize_once(&self, locale: &str) -> Result<String, SpeechError>;
}

/// 地址栏
pub trait Location: Send + Sync {
    fn pathname(&self) -> String;

    fn href(&self) -> String;

    /// 整页跳转
    fn assign(&self, path: &str);
}

/// 阻塞式弹窗
pub trait Dialogs: Send + Sync {
    fn alert(&self, message: &str);
}

/// 分享内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// 系统分享
pub trait Share: Send + Sync {
    fn can_share(&self) -> bool;

    fn share(&self, data: ShareData);
}

/// 页面可用的全部浏览器能力
#[derive(Clone)]
pub struct Browser {
    pub synthesis: Arc<dyn SpeechSynthesis>,
    pub recognition: Arc<dyn SpeechRecognition>,
    pub location: Arc<dyn Location>,
    pub dialogs: Arc<dyn Dialogs>,
    pub share: Arc<dyn Share>,
}
