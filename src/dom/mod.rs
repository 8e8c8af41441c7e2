// 页面文档模型 - 以元素 id 为键的内存 DOM
//
// 绑定器、表单和聊天模块都只通过这里读写页面，
// 缺失的目标节点一律静默跳过（写操作返回 false）

pub mod templates;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// 隐藏状态使用的 class
pub const HIDDEN: &str = "hidden";

/// 上传的文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    #[serde(default)]
    pub bytes: Vec<u8>,
}

/// 页面元素
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub id: String,
    pub tag: String,
    pub text: String,
    pub inner_html: String,
    pub children: Vec<String>,
    pub classes: Vec<String>,
    pub value: String,
    pub checked: bool,
    pub name: Option<String>,
    pub form: Option<String>,
    pub parent: Option<String>,
    pub attrs: BTreeMap<String, String>,
    pub files: Vec<FileUpload>,
}

impl Element {
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class_name: &str) -> Self {
        for class in class_name.split_whitespace() {
            if !self.classes.iter().any(|c| c == class) {
                self.classes.push(class.to_string());
            }
        }
        self
    }

    pub fn hidden(self) -> Self {
        self.class(HIDDEN)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn form(mut self, form_id: impl Into<String>) -> Self {
        self.form = Some(form_id.into());
        self
    }

    pub fn parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent = Some(parent_id.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    /// 可勾选输入（radio/checkbox）
    fn is_checkable(&self) -> bool {
        matches!(
            self.attrs.get("type").map(String::as_str),
            Some("radio") | Some("checkbox")
        )
    }
}

#[derive(Default)]
struct DocumentInner {
    elements: HashMap<String, Element>,
    order: Vec<String>,
}

/// 共享的页面文档
#[derive(Clone, Default)]
pub struct Document {
    inner: Arc<RwLock<DocumentInner>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入元素，同 id 的旧元素被替换
    pub fn insert(&self, element: Element) {
        if let Ok(mut inner) = self.inner.write() {
            if !inner.elements.contains_key(&element.id) {
                inner.order.push(element.id.clone());
            }
            inner.elements.insert(element.id.clone(), element);
        }
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.inner
            .read()
            .map(|inner| inner.elements.contains_key(id))
            .unwrap_or(false)
    }

    pub fn get(&self, id: &str) -> Option<Element> {
        self.inner.read().ok()?.elements.get(id).cloned()
    }

    /// 修改元素，目标不存在时返回 false
    pub fn update<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Element),
    {
        match self.inner.write() {
            Ok(mut inner) => match inner.elements.get_mut(id) {
                Some(element) => {
                    f(element);
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.get(id).map(|e| e.text)
    }

    /// 相当于 textContent 赋值，会清空原有子内容
    pub fn set_text(&self, id: &str, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update(id, |e| {
            e.text = text;
            e.inner_html.clear();
            e.children.clear();
        })
    }

    pub fn inner_html(&self, id: &str) -> Option<String> {
        self.get(id).map(|e| e.inner_html)
    }

    /// 相当于 innerHTML 赋值
    pub fn set_inner_html(&self, id: &str, html: impl Into<String>) -> bool {
        let html = html.into();
        self.update(id, |e| {
            e.inner_html = html;
            e.text.clear();
            e.children.clear();
        })
    }

    /// 追加子节点片段
    pub fn append_child(&self, id: &str, fragment: impl Into<String>) -> bool {
        let fragment = fragment.into();
        self.update(id, |e| {
            e.inner_html.push_str(&fragment);
            e.children.push(fragment);
        })
    }

    pub fn children(&self, id: &str) -> Vec<String> {
        self.get(id).map(|e| e.children).unwrap_or_default()
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.get(id).map(|e| e.has_class(class)).unwrap_or(false)
    }

    pub fn add_class(&self, id: &str, class: &str) -> bool {
        self.update(id, |e| {
            if !e.has_class(class) {
                e.classes.push(class.to_string());
            }
        })
    }

    pub fn remove_class(&self, id: &str, class: &str) -> bool {
        self.update(id, |e| e.classes.retain(|c| c != class))
    }

    /// 切换 class，返回切换后是否存在；目标不存在返回 None
    pub fn toggle_class(&self, id: &str, class: &str) -> Option<bool> {
        let mut present = None;
        self.update(id, |e| {
            if e.has_class(class) {
                e.classes.retain(|c| c != class);
                present = Some(false);
            } else {
                e.classes.push(class.to_string());
                present = Some(true);
            }
        });
        present
    }

    /// 相当于 className 赋值
    pub fn set_class_name(&self, id: &str, class_name: &str) -> bool {
        self.update(id, |e| {
            e.classes = class_name.split_whitespace().map(str::to_string).collect();
        })
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.has_class(id, HIDDEN)
    }

    pub fn show(&self, id: &str) -> bool {
        self.remove_class(id, HIDDEN)
    }

    pub fn hide(&self, id: &str) -> bool {
        self.add_class(id, HIDDEN)
    }

    pub fn value(&self, id: &str) -> Option<String> {
        self.get(id).map(|e| e.value)
    }

    pub fn set_value(&self, id: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update(id, |e| e.value = value)
    }

    pub fn attr(&self, id: &str, key: &str) -> Option<String> {
        self.get(id).and_then(|e| e.attrs.get(key).cloned())
    }

    /// 勾选或取消勾选；勾选单选框时同组其他项取消
    pub fn set_checked(&self, id: &str, checked: bool) -> bool {
        let Ok(mut inner) = self.inner.write() else {
            return false;
        };
        let Some(target) = inner.elements.get(id) else {
            return false;
        };

        let is_radio = target.attrs.get("type").map(String::as_str) == Some("radio");
        if checked && is_radio {
            if let Some(name) = target.name.clone() {
                let form = target.form.clone();
                for element in inner.elements.values_mut() {
                    if element.name.as_deref() == Some(name.as_str()) && element.form == form {
                        element.checked = false;
                    }
                }
            }
        }

        if let Some(element) = inner.elements.get_mut(id) {
            element.checked = checked;
        }
        true
    }

    pub fn set_files(&self, id: &str, files: Vec<FileUpload>) -> bool {
        self.update(id, |e| e.files = files)
    }

    /// 第一个 name 匹配的元素（按插入顺序）
    pub fn find_by_name(&self, name: &str) -> Option<Element> {
        let inner = self.inner.read().ok()?;
        inner
            .order
            .iter()
            .filter_map(|id| inner.elements.get(id))
            .find(|e| e.name.as_deref() == Some(name))
            .cloned()
    }

    /// 同名单选组中被勾选的元素
    pub fn checked_in_group(&self, name: &str) -> Option<Element> {
        let inner = self.inner.read().ok()?;
        inner
            .order
            .iter()
            .filter_map(|id| inner.elements.get(id))
            .find(|e| e.name.as_deref() == Some(name) && e.checked)
            .cloned()
    }

    /// 序列化表单字段（按文档顺序，未勾选的 radio/checkbox 跳过）
    pub fn form_fields(&self, form_id: &str) -> Vec<(String, String)> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        inner
            .order
            .iter()
            .filter_map(|id| inner.elements.get(id))
            .filter(|e| e.form.as_deref() == Some(form_id))
            .filter(|e| !e.is_checkable() || e.checked)
            .filter_map(|e| e.name.clone().map(|name| (name, e.value.clone())))
            .collect()
    }

    /// target 是否为 ancestor 本身或其后代
    pub fn contains(&self, ancestor: &str, target: &str) -> bool {
        let Ok(inner) = self.inner.read() else {
            return false;
        };
        let mut current = Some(target.to_string());
        let mut depth = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            depth += 1;
            if depth > inner.elements.len() {
                // 父链成环
                return false;
            }
            current = inner.elements.get(&id).and_then(|e| e.parent.clone());
        }
        false
    }

    /// 从 target 开始沿父链找到第一个带 class 的元素
    pub fn closest(&self, target: &str, class: &str) -> Option<String> {
        let inner = self.inner.read().ok()?;
        let mut current = inner.elements.get(target);
        let mut depth = 0;
        while let Some(element) = current {
            if element.has_class(class) {
                return Some(element.id.clone());
            }
            depth += 1;
            if depth > inner.elements.len() {
                return None;
            }
            current = element
                .parent
                .as_ref()
                .and_then(|parent| inner.elements.get(parent));
        }
        None
    }

    /// 带某个 class 的所有元素 id（按文档顺序）
    pub fn ids_with_class(&self, class: &str) -> Vec<String> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        inner
            .order
            .iter()
            .filter(|id| inner.elements.get(*id).map(|e| e.has_class(class)).unwrap_or(false))
            .cloned()
            .collect()
    }
}

/// 转义插入 HTML 片段的文本
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radio_group_keeps_one_checked() {
        let doc = Document::new();
        for id in ["rating1", "rating2"] {
            doc.insert(
                Element::new(id, "input")
                    .attr("type", "radio")
                    .name("rating")
                    .form("reviewForm"),
            );
        }

        assert!(doc.set_checked("rating1", true));
        assert!(doc.set_checked("rating2", true));
        assert!(!doc.get("rating1").unwrap().checked);
        assert_eq!(doc.checked_in_group("rating").unwrap().id, "rating2");

        assert!(doc.set_checked("rating2", false));
        assert!(doc.checked_in_group("rating").is_none());
        assert!(!doc.set_checked("rating9", true));
    }

    #[test]
    fn test_missing_target_is_skipped() {
        let doc = Document::new();
        assert!(!doc.set_text("temperature", "31°C"));
        assert!(!doc.add_class("temperature", HIDDEN));
        assert_eq!(doc.toggle_class("temperature", HIDDEN), None);
    }

    #[test]
    fn test_text_and_html_replace_each_other() {
        let doc = Document::new();
        doc.insert(Element::new("box", "div"));

        doc.append_child("box", "<p>a</p>");
        assert_eq!(doc.children("box").len(), 1);

        doc.set_text("box", "plain");
        assert_eq!(doc.text("box").as_deref(), Some("plain"));
        assert!(doc.children("box").is_empty());

        doc.set_inner_html("box", "<b>x</b>");
        assert_eq!(doc.inner_html("box").as_deref(), Some("<b>x</b>"));
        assert_eq!(doc.text("box").as_deref(), Some(""));
    }

    #[test]
    fn test_form_fields_skip_unchecked_radios() {
        let doc = Document::new();
        doc.insert(Element::new("reviewForm", "form"));
        doc.insert(
            Element::new("rating1", "input")
                .attr("type", "radio")
                .name("rating")
                .value("1")
                .form("reviewForm"),
        );
        doc.insert(
            Element::new("rating5", "input")
                .attr("type", "radio")
                .name("rating")
                .value("5")
                .form("reviewForm")
                .checked(true),
        );
        doc.insert(
            Element::new("reviewText", "textarea")
                .name("review_text")
                .value("good")
                .form("reviewForm"),
        );

        let fields = doc.form_fields("reviewForm");
        assert_eq!(
            fields,
            vec![
                ("rating".to_string(), "5".to_string()),
                ("review_text".to_string(), "good".to_string()),
            ]
        );
        assert_eq!(doc.checked_in_group("rating").map(|e| e.id), Some("rating5".to_string()));
    }

    #[test]
    fn test_contains_walks_parents() {
        let doc = Document::new();
        doc.insert(Element::new("menu", "div"));
        doc.insert(Element::new("item", "button").parent("menu"));
        doc.insert(Element::new("other", "div"));

        assert!(doc.contains("menu", "item"));
        assert!(doc.contains("menu", "menu"));
        assert!(!doc.contains("menu", "other"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
        assert_eq!(escape_html("₹2125/quintal"), "₹2125/quintal");
    }
}
