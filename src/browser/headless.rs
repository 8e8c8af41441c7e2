// 无界面浏览器能力实现
//
// 记录每一次调用，供命令行驱动和测试检查

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use super::{
    Browser, Dialogs, Location, ShareData, Share, SpeechRecognition, SpeechSynthesis, Utterance,
    Voice,
};
use crate::error::SpeechError;

#[derive(Default)]
struct SynthState {
    current: Option<Utterance>,
    started: Vec<Utterance>,
    cancels: usize,
}

/// 记录式语音合成
///
/// 没有播放结束回调，最后一次 speak 的内容一直处于"可听见"状态，直到被 cancel
pub struct HeadlessSynth {
    available: bool,
    voices: Vec<Voice>,
    state: Mutex<SynthState>,
}

impl HeadlessSynth {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self {
            available: true,
            voices,
            state: Mutex::new(SynthState::default()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            voices: Vec::new(),
            state: Mutex::new(SynthState::default()),
        }
    }

    /// 当前可听见的朗读
    pub fn audible(&self) -> Option<Utterance> {
        self.state.lock().ok().and_then(|s| s.current.clone())
    }

    /// 所有开始过的朗读
    pub fn started(&self) -> Vec<Utterance> {
        self.state
            .lock()
            .map(|s| s.started.clone())
            .unwrap_or_default()
    }

    pub fn cancel_count(&self) -> usize {
        self.state.lock().map(|s| s.cancels).unwrap_or(0)
    }
}

impl SpeechSynthesis for HeadlessSynth {
    fn is_available(&self) -> bool {
        self.available
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn cancel(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.current = None;
            state.cancels += 1;
        }
    }

    fn speak(&self, utterance: Utterance) {
        if let Ok(mut state) = self.state.lock() {
            // 没有 cancel 时浏览器会排队，这里只保留正在播放的一条
            if state.current.is_none() {
                state.current = Some(utterance.clone());
            }
            state.started.push(utterance);
        }
    }
}

/// 预置转写结果的语音识别
pub struct ScriptedRecognizer {
    available: bool,
    transcripts: Mutex<VecDeque<String>>,
}

impl ScriptedRecognizer {
    pub fn new(transcripts: Vec<String>) -> Self {
        Self {
            available: true,
            transcripts: Mutex::new(transcripts.into()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            transcripts: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, transcript: impl Into<String>) {
        if let Ok(mut queue) = self.transcripts.lock() {
            queue.push_back(transcript.into());
        }
    }
}

#[async_trait]
impl SpeechRecognition for ScriptedRecognizer {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn recognize_once(&self, locale: &str) -> Result<String, SpeechError> {
        if !self.available {
            return Err(SpeechError::Unavailable);
        }
        let next = self
            .transcripts
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());
        match next {
            Some(transcript) => Ok(transcript),
            None => Err(SpeechError::Recognition(format!("{} 无识别结果", locale))),
        }
    }
}

/// 内存地址栏
pub struct MemoryLocation {
    origin: String,
    path: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl MemoryLocation {
    pub fn new(origin: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            path: Mutex::new(path.into()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// 所有 assign 过的路径
    pub fn history(&self) -> Vec<String> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

impl Location for MemoryLocation {
    fn pathname(&self) -> String {
        self.path.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn href(&self) -> String {
        format!("{}{}", self.origin.trim_end_matches('/'), self.pathname())
    }

    fn assign(&self, path: &str) {
        info!("页面跳转: {}", path);
        if let Ok(mut current) = self.path.lock() {
            *current = path.to_string();
        }
        if let Ok(mut history) = self.history.lock() {
            history.push(path.to_string());
        }
    }
}

/// 记录弹窗内容
#[derive(Default)]
pub struct AlertLog {
    messages: Mutex<Vec<String>>,
}

impl AlertLog {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().ok().and_then(|m| m.last().cloned())
    }
}

impl Dialogs for AlertLog {
    fn alert(&self, message: &str) {
        info!("弹窗提示: {}", message);
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

/// 记录式分享
pub struct HeadlessShare {
    supported: bool,
    shared: Mutex<Vec<ShareData>>,
}

impl HeadlessShare {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            shared: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(&self) -> Vec<ShareData> {
        self.shared.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Share for HeadlessShare {
    fn can_share(&self) -> bool {
        self.supported
    }

    fn share(&self, data: ShareData) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.push(data);
        }
    }
}

/// 无界面浏览器，保留各能力的具体类型以便检查
#[derive(Clone)]
pub struct HeadlessBrowser {
    pub synth: Arc<HeadlessSynth>,
    pub recognizer: Arc<ScriptedRecognizer>,
    pub location: Arc<MemoryLocation>,
    pub alerts: Arc<AlertLog>,
    pub share: Arc<HeadlessShare>,
}

impl HeadlessBrowser {
    /// 默认带英语、印地语、泰卢固语三种语音
    pub fn new(origin: &str, path: &str) -> Self {
        let voices = vec![
            Voice {
                name: "English (India)".to_string(),
                lang: "en-IN".to_string(),
            },
            Voice {
                name: "Hindi".to_string(),
                lang: "hi-IN".to_string(),
            },
            Voice {
                name: "Telugu".to_string(),
                lang: "te-IN".to_string(),
            },
        ];
        Self {
            synth: Arc::new(HeadlessSynth::new(voices)),
            recognizer: Arc::new(ScriptedRecognizer::new(Vec::new())),
            location: Arc::new(MemoryLocation::new(origin, path)),
            alerts: Arc::new(AlertLog::default()),
            share: Arc::new(HeadlessShare::new(false)),
        }
    }

    pub fn browser(&self) -> Browser {
        Browser {
            synthesis: self.synth.clone(),
            recognition: self.recognizer.clone(),
            location: self.location.clone(),
            dialogs: self.alerts.clone(),
            share: self.share.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utterance(text: &str) -> Utterance {
        Utterance {
            text: text.to_string(),
            lang: "en-US".to_string(),
            rate: 0.8,
            pitch: 1.0,
            voice: None,
        }
    }

    #[test]
    fn test_cancel_clears_audible() {
        let synth = HeadlessSynth::new(Vec::new());
        synth.speak(utterance("first"));
        assert_eq!(synth.audible().map(|u| u.text), Some("first".to_string()));

        synth.cancel();
        assert!(synth.audible().is_none());
        assert_eq!(synth.cancel_count(), 1);
    }

    #[test]
    fn test_location_records_history() {
        let location = MemoryLocation::new("http://localhost:8000/", "/home/");
        location.assign("/crops/");
        assert_eq!(location.pathname(), "/crops/");
        assert_eq!(location.href(), "http://localhost:8000/crops/");
        assert_eq!(location.history(), vec!["/crops/".to_string()]);
    }

    #[tokio::test]
    async fn test_recognizer_pops_transcripts() {
        let recognizer = ScriptedRecognizer::new(vec!["wheat price".to_string()]);
        assert_eq!(recognizer.recognize_once("en-IN").await.unwrap(), "wheat price");
        assert!(recognizer.recognize_once("en-IN").await.is_err());

        let missing = ScriptedRecognizer::unavailable();
        assert!(matches!(
            missing.recognize_once("en-IN").await,
            Err(SpeechError::Unavailable)
        ));
    }
}
