// 聊天助手 - 关键词规则回复、快捷问题和语音输入
//
// 回复在固定延迟后追加，期间页面仍可响应其他事件

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::browser::Dialogs;
use crate::dom::{escape_html, Document, Element};
use crate::event_bus::{AppEvent, EventBus};
use crate::speech::SpeechAdapter;

pub const CHAT_INPUT: &str = "chatInput";
pub const CHAT_MESSAGES: &str = "chatMessages";
pub const VOICE_INPUT: &str = "voiceInput";

/// 快捷问题按钮的 class
pub const QUICK_QUESTION_CLASS: &str = "quick-question";

const USER_BUBBLE_CLASS: &str = "bg-green-100 p-2 rounded-lg ml-8";
const BOT_BUBBLE_CLASS: &str = "bg-gray-100 p-2 rounded-lg mr-8";
const HELP_PANEL_CLASS: &str =
    "bg-gradient-to-r from-blue-100 to-purple-100 p-3 rounded-lg border border-blue-200";

const LISTENING_LABEL: &str = "🎤 Listening...";
const VOICE_INPUT_LABEL: &str = "🎤 Voice Input";
const VOICE_UNSUPPORTED: &str = "Voice input not supported in this browser";

const DEFAULT_REPLY: &str = "Hello! I can help with a variety of farming topics.";

/// 快捷问题
pub const QUICK_QUESTIONS: [&str; 5] = [
    "What is the cost estimation for wheat per acre?",
    "How to control pests in rice crop?",
    "What are the best organic farming practices?",
    "Current market prices for vegetables",
    "Soil management tips for better yield",
];

/// 关键词规则，按顺序匹配，先命中者生效
const RULES: &[(&str, &str)] = &[
    (
        "wheat",
        "🌾 **Wheat Cultivation Guide:**\n\
         • **Sowing:** November (1st-3rd week) in Punjab\n\
         • **Varieties:** PBW 725, HD 3086, WH 1105 (rust-resistant)\n\
         • **Soil:** Loamy to clay-loam, pH 6.0-7.5\n\
         • **Water:** 450-600mm during crop cycle\n\
         • **Yield:** 40-50 quintals/ha (average), 60-65 quintals/ha (advanced)\n\
         • **Cost per acre:** ₹25,000-30,000 including all inputs",
    ),
    (
        "rice",
        "🌾 **Rice Pest Control:**\n\
         • **Stem borer:** Install pheromone traps, 8 per acre\n\
         • **Brown plant hopper:** Avoid excess nitrogen, drain the field for 3-4 days\n\
         • **Leaf folder:** Spray neem oil 5ml/L at early infestation\n\
         • Scout the field weekly from transplanting to flowering",
    ),
    (
        "organic",
        "🌱 **Organic Farming Practices:**\n\
         • Apply vermicompost or FYM at 5-10 tonnes/ha\n\
         • Use Jeevamrut and Beejamrut for soil and seed treatment\n\
         • Rotate cereals with legumes to fix nitrogen\n\
         • Control pests with neem, trichoderma and pheromone traps",
    ),
    (
        "market",
        "📈 **Market Prices:**\n\
         Open the Market page from the menu for live mandi rates of cereals, vegetables and pulses. \
         Prices refresh every 10 minutes.",
    ),
    (
        "soil",
        "🪱 **Soil Management Tips:**\n\
         • Test soil every 2-3 years and follow the Soil Health Card\n\
         • Keep pH between 6.0 and 7.5, apply lime or gypsum as advised\n\
         • Add green manure such as dhaincha before kharif\n\
         • Avoid burning crop residue, mulch it instead",
    ),
];

/// 规则回复（不区分大小写）
pub fn respond(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, reply)| *reply)
        .unwrap_or(DEFAULT_REPLY)
}

fn bubble(class_name: &str, html: &str) -> String {
    format!(
        r#"<div class="{}"><p class="text-sm">{}</p></div>"#,
        class_name, html
    )
}

/// 聊天助手
#[derive(Clone)]
pub struct ChatResponder {
    document: Document,
    speech: SpeechAdapter,
    dialogs: Arc<dyn Dialogs>,
    event_bus: Arc<EventBus>,
    reply_delay: Duration,
    listening_indicator: Duration,
}

impl ChatResponder {
    pub fn new(
        document: Document,
        speech: SpeechAdapter,
        dialogs: Arc<dyn Dialogs>,
        event_bus: Arc<EventBus>,
        reply_delay: Duration,
        listening_indicator: Duration,
    ) -> Self {
        Self {
            document,
            speech,
            dialogs,
            event_bus,
            reply_delay,
            listening_indicator,
        }
    }

    /// 发送输入框中的内容
    pub fn send_input(&self) -> Option<JoinHandle<String>> {
        let message = self.document.value(CHAT_INPUT).unwrap_or_default();
        self.send(&message)
    }

    /// 追加用户消息并在延迟后回复；空消息不处理
    pub fn send(&self, message: &str) -> Option<JoinHandle<String>> {
        let message = message.trim().to_string();
        if message.is_empty() {
            return None;
        }

        self.document.append_child(
            CHAT_MESSAGES,
            bubble(USER_BUBBLE_CLASS, &escape_html(&message)),
        );
        self.document.set_value(CHAT_INPUT, "");

        let responder = self.clone();
        Some(tokio::spawn(async move {
            tokio::time::sleep(responder.reply_delay).await;

            let reply = respond(&message);
            responder
                .document
                .append_child(CHAT_MESSAGES, bubble(BOT_BUBBLE_CLASS, reply));
            debug!("聊天回复: {} -> {} 字", message, reply.chars().count());

            responder.event_bus.publish(AppEvent::ChatReplied {
                question: message,
                reply: reply.to_string(),
            });
            responder.speech.announce(reply).await;
            reply.to_string()
        }))
    }

    /// 追加快捷问题面板
    pub fn show_quick_help(&self) {
        let buttons: String = QUICK_QUESTIONS
            .iter()
            .map(|q| {
                format!(
                    r#"<button class="block w-full text-left text-xs bg-white p-2 mb-1 rounded hover:bg-blue-50 transition-colors">{}</button>"#,
                    q
                )
            })
            .collect();
        self.document.append_child(
            CHAT_MESSAGES,
            format!(
                r#"<div class="{}"><p class="text-sm font-medium mb-2">💡 Quick Questions:</p>{}</div>"#,
                HELP_PANEL_CLASS, buttons
            ),
        );

        // 按钮同时登记为元素，点击事件按 id 分发
        for (index, question) in QUICK_QUESTIONS.iter().enumerate() {
            self.document.insert(
                Element::new(format!("quickQuestion{}", index + 1), "button")
                    .class(QUICK_QUESTION_CLASS)
                    .attr("data-question", *question)
                    .parent(CHAT_MESSAGES),
            );
        }
    }

    /// 点击快捷问题：填入输入框并发送
    pub fn ask_quick_question(&self, button_id: &str) -> Option<JoinHandle<String>> {
        let question = self.document.attr(button_id, "data-question")?;
        self.document.set_value(CHAT_INPUT, question);
        self.send_input()
    }

    /// 语音输入：识别结果填入输入框并发送
    pub fn start_voice_input(&self) -> Option<JoinHandle<()>> {
        if !self.speech.can_listen() {
            self.dialogs.alert(VOICE_UNSUPPORTED);
            self.event_bus.publish(AppEvent::Alerted {
                message: VOICE_UNSUPPORTED.to_string(),
            });
            return None;
        }

        self.document.set_text(VOICE_INPUT, LISTENING_LABEL);
        let document = self.document.clone();
        let indicator = self.listening_indicator;
        tokio::spawn(async move {
            tokio::time::sleep(indicator).await;
            document.set_text(VOICE_INPUT, VOICE_INPUT_LABEL);
        });

        let responder = self.clone();
        Some(tokio::spawn(async move {
            match responder.speech.listen().await {
                Ok(transcript) => {
                    responder.document.set_value(CHAT_INPUT, transcript);
                    if let Some(reply) = responder.send_input() {
                        let _ = reply.await;
                    }
                }
                Err(e) => warn!("语音输入失败: {}", e),
            }
        }))
    }
}
