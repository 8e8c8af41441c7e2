// Actor模块 - 使用Actor模式管理并发状态
//
// 语音开关和语言原本是页面级全局变量，这里改为由Actor持有，
// 各组件通过Handle显式获取

pub mod voice_settings;

pub use voice_settings::{VoiceSettingsActor, VoiceSettingsCommand, VoiceSettingsHandle};
