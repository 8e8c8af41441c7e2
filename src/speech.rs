// 语音适配器 - 包装语音合成与语音识别
//
// 同一时间最多只有一条朗读可听见：每次 speak 前先 cancel

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::actors::VoiceSettingsHandle;
use crate::browser::{SpeechRecognition, SpeechSynthesis, Utterance};
use crate::dom::Document;
use crate::error::SpeechError;
use crate::event_bus::{AppEvent, EventBus};
use crate::models::VoiceSettings;

/// 朗读语速
const SPEECH_RATE: f32 = 0.8;
/// 朗读音调
const SPEECH_PITCH: f32 = 1.0;

/// 语音适配器
#[derive(Clone)]
pub struct SpeechAdapter {
    synthesis: Arc<dyn SpeechSynthesis>,
    recognition: Arc<dyn SpeechRecognition>,
    settings: VoiceSettingsHandle,
    recognition_locale: String,
}

impl SpeechAdapter {
    pub fn new(
        synthesis: Arc<dyn SpeechSynthesis>,
        recognition: Arc<dyn SpeechRecognition>,
        settings: VoiceSettingsHandle,
        recognition_locale: impl Into<String>,
    ) -> Self {
        Self {
            synthesis,
            recognition,
            settings,
            recognition_locale: recognition_locale.into(),
        }
    }

    pub fn settings(&self) -> &VoiceSettingsHandle {
        &self.settings
    }

    /// 用指定语言朗读，打断正在播放的内容
    pub fn speak(&self, text: &str, lang: &str) {
        if !self.synthesis.is_available() || text.is_empty() {
            return;
        }

        self.synthesis.cancel();

        // 按主语言子标签匹配语音，例如 hi-IN 匹配 hi
        let primary = lang.split('-').next().unwrap_or(lang);
        let voice = self
            .synthesis
            .voices()
            .into_iter()
            .find(|v| v.lang.starts_with(primary));
        if voice.is_none() {
            debug!("没有 {} 对应的语音，使用默认语音", lang);
        }

        self.synthesis.speak(Utterance {
            text: text.to_string(),
            lang: lang.to_string(),
            rate: SPEECH_RATE,
            pitch: SPEECH_PITCH,
            voice,
        });
    }

    /// 用当前选择的语言朗读（不检查开关）
    pub async fn speak_current(&self, text: &str) {
        let settings = self.settings.get().await;
        self.speak(text, &settings.language);
    }

    /// 只有在朗读开启时才播报
    pub async fn announce(&self, text: &str) -> bool {
        let settings = self.settings.get().await;
        if !settings.enabled {
            return false;
        }
        self.speak(text, &settings.language);
        true
    }

    /// 双击朗读选中文本
    pub async fn speak_selection(&self, selection: &str) -> bool {
        if selection.is_empty() {
            return false;
        }
        self.announce(selection).await
    }

    pub fn can_listen(&self) -> bool {
        self.recognition.is_available()
    }

    /// 单次语音识别
    pub async fn listen(&self) -> Result<String, SpeechError> {
        if !self.recognition.is_available() {
            warn!("语音识别不可用");
            return Err(SpeechError::Unavailable);
        }
        let transcript = self
            .recognition
            .recognize_once(&self.recognition_locale)
            .await?;
        debug!("识别结果: {}", transcript);
        Ok(transcript)
    }
}

/// 朗读开关按钮
pub const VOICE_BUTTON: &str = "voiceBtn";
/// 语言下拉框
pub const LANGUAGE_SELECT: &str = "languageSelect";

const VOICE_PULSE: &str = "voice-pulse";

/// 页面上的朗读开关与语言选择
#[derive(Clone)]
pub struct VoiceControls {
    speech: SpeechAdapter,
    document: Document,
    event_bus: Arc<EventBus>,
}

impl VoiceControls {
    pub fn new(speech: SpeechAdapter, document: Document, event_bus: Arc<EventBus>) -> Self {
        Self {
            speech,
            document,
            event_bus,
        }
    }

    /// 切换朗读开关并更新按钮，返回切换后的状态
    pub async fn toggle_voice(&self) -> bool {
        let enabled = self.speech.settings().toggle().await;

        if enabled {
            self.document.set_text(VOICE_BUTTON, "🔇 Voice Off");
            self.document.remove_class(VOICE_BUTTON, VOICE_PULSE);
            self.speech
                .speak_current("Voice reading enabled. Double click on any text to hear it read aloud.")
                .await;
        } else {
            self.document.set_text(VOICE_BUTTON, "🔊 Voice");
            self.document.add_class(VOICE_BUTTON, VOICE_PULSE);
            self.speech.speak_current("Voice reading disabled.").await;
        }

        self.event_bus.publish(AppEvent::VoiceToggled { enabled });
        enabled
    }

    /// 切换朗读语言，开启朗读时播报新语言
    pub async fn change_language(&self, code: &str) {
        info!("选择朗读语言: {}", code);
        self.speech.settings().set_language(code).await;
        self.document.set_value(LANGUAGE_SELECT, code);

        let name = VoiceSettings::language_name(code).unwrap_or(code);
        self.speech
            .announce(&format!("Language changed to {}", name))
            .await;

        self.event_bus.publish(AppEvent::LanguageChanged {
            language: code.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::VoiceSettingsActor;
    use crate::browser::headless::{HeadlessBrowser, HeadlessSynth, ScriptedRecognizer};
    use crate::models::VoiceSettings;

    fn adapter(browser: &HeadlessBrowser, enabled: bool) -> SpeechAdapter {
        let settings = VoiceSettingsActor::spawn(VoiceSettings {
            enabled,
            language: "hi-IN".to_string(),
        });
        SpeechAdapter::new(
            browser.synth.clone(),
            browser.recognizer.clone(),
            settings,
            "en-IN",
        )
    }

    #[tokio::test]
    async fn test_second_speak_cancels_first() {
        let browser = HeadlessBrowser::new("http://localhost", "/home/");
        let speech = adapter(&browser, true);

        speech.speak("first", "en-US");
        speech.speak("second", "en-US");

        let audible = browser.synth.audible().unwrap();
        assert_eq!(audible.text, "second");
        assert_eq!(browser.synth.cancel_count(), 2);
        assert_eq!(browser.synth.started().len(), 2);
    }

    #[tokio::test]
    async fn test_voice_selected_by_primary_subtag() {
        let browser = HeadlessBrowser::new("http://localhost", "/home/");
        let speech = adapter(&browser, true);

        speech.speak("नमस्ते", "hi-IN");
        let audible = browser.synth.audible().unwrap();
        assert_eq!(audible.voice.map(|v| v.lang), Some("hi-IN".to_string()));
        assert_eq!(audible.rate, 0.8);

        speech.speak("Bonjour", "fr-FR");
        assert!(browser.synth.audible().unwrap().voice.is_none());
    }

    #[tokio::test]
    async fn test_empty_text_and_missing_synth() {
        let browser = HeadlessBrowser::new("http://localhost", "/home/");
        let speech = adapter(&browser, true);
        speech.speak("", "en-US");
        assert!(browser.synth.started().is_empty());

        let settings = VoiceSettingsActor::spawn(VoiceSettings::default());
        let synth = Arc::new(HeadlessSynth::unavailable());
        let mute = SpeechAdapter::new(
            synth.clone(),
            Arc::new(ScriptedRecognizer::unavailable()),
            settings,
            "en-IN",
        );
        mute.speak("hello", "en-US");
        assert!(synth.started().is_empty());
    }

    #[tokio::test]
    async fn test_announce_respects_switch() {
        let browser = HeadlessBrowser::new("http://localhost", "/home/");
        let off = adapter(&browser, false);
        assert!(!off.announce("Market prices updated successfully").await);
        assert!(!off.speak_selection("selected words").await);
        assert!(browser.synth.started().is_empty());

        let on = adapter(&browser, true);
        assert!(on.speak_selection("selected words").await);
        assert_eq!(browser.synth.audible().unwrap().lang, "hi-IN");
    }

    #[tokio::test]
    async fn test_listen() {
        let browser = HeadlessBrowser::new("http://localhost", "/home/");
        browser.recognizer.push("Tell me about wheat");
        let speech = adapter(&browser, false);
        assert_eq!(speech.listen().await.unwrap(), "Tell me about wheat");

        let settings = VoiceSettingsActor::spawn(VoiceSettings::default());
        let deaf = SpeechAdapter::new(
            browser.synth.clone(),
            Arc::new(ScriptedRecognizer::unavailable()),
            settings,
            "en-IN",
        );
        assert!(!deaf.can_listen());
        assert!(matches!(deaf.listen().await, Err(SpeechError::Unavailable)));
    }

    #[tokio::test]
    async fn test_voice_toggle_updates_button() {
        let browser = HeadlessBrowser::new("http://localhost", "/home/");
        let doc = crate::dom::templates::document_for("/home/", "tok");
        let controls = VoiceControls::new(adapter(&browser, false), doc.clone(), Arc::new(EventBus::new(16)));

        assert!(controls.toggle_voice().await);
        assert_eq!(doc.text(VOICE_BUTTON).as_deref(), Some("🔇 Voice Off"));
        assert!(!doc.has_class(VOICE_BUTTON, "voice-pulse"));
        assert!(browser.synth.audible().unwrap().text.starts_with("Voice reading enabled."));

        assert!(!controls.toggle_voice().await);
        assert_eq!(doc.text(VOICE_BUTTON).as_deref(), Some("🔊 Voice"));
        assert!(doc.has_class(VOICE_BUTTON, "voice-pulse"));
        assert_eq!(browser.synth.audible().unwrap().text, "Voice reading disabled.");
    }

    #[tokio::test]
    async fn test_language_change_announced_only_when_enabled() {
        let browser = HeadlessBrowser::new("http://localhost", "/home/");
        let doc = crate::dom::templates::document_for("/home/", "tok");
        let speech = adapter(&browser, false);
        let controls = VoiceControls::new(speech.clone(), doc.clone(), Arc::new(EventBus::new(16)));

        controls.change_language("te-IN").await;
        assert!(browser.synth.started().is_empty());
        assert_eq!(speech.settings().get().await.language, "te-IN");

        speech.settings().toggle().await;
        controls.change_language("hi-IN").await;
        let audible = browser.synth.audible().unwrap();
        assert_eq!(audible.text, "Language changed to Hindi");
        assert_eq!(audible.lang, "hi-IN");
    }
}
