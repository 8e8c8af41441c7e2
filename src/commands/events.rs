//! 页面事件
//!
//! 命令行驱动从标准输入逐行读取 JSON，例如：
//! `{"type":"click","target":"menuBtn"}`

use serde::{Deserialize, Serialize};

use crate::dom::FileUpload;

/// 页面上发生的用户操作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// 点击元素
    Click { target: String },
    /// 双击，附带当前选中的文本
    DoubleClick {
        #[serde(default)]
        selection: String,
    },
    /// 在元素内按键
    KeyPress { target: String, key: String },
    /// 输入框内容变化
    Input { target: String, value: String },
    /// 勾选或取消勾选
    Change { target: String, checked: bool },
    /// 提交表单
    Submit { form: String },
    /// 切换朗读语言
    LanguageChanged { language: String },
    /// 文件选择框选中文件
    FileSelected { target: String, file: FileUpload },
}

/// 事件处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// 有对应的处理逻辑
    Handled,
    /// 页面上没有监听这个事件
    Ignored,
    /// 阻止浏览器默认行为（表单已由控制器提交或校验未通过）
    PreventDefault,
    /// 交给浏览器原生处理
    Proceed,
}
