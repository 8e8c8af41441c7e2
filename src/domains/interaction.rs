// 交互领域管理器 - 表单提交与聊天助手

use crate::chat::ChatResponder;
use crate::forms::FormSubmitter;

#[derive(Clone)]
pub struct InteractionDomain {
    forms: FormSubmitter,
    chat: ChatResponder,
}

impl InteractionDomain {
    pub fn new(forms: FormSubmitter, chat: ChatResponder) -> Self {
        Self { forms, chat }
    }

    pub fn get_forms(&self) -> &FormSubmitter {
        &self.forms
    }

    pub fn get_chat(&self) -> &ChatResponder {
        &self.chat
    }
}
