// 错误类型定义
//
// 接口层、语音层和导航层各自的类型化错误，应用装配层仍使用 anyhow

/// 后端接口错误
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 网络/传输失败（连接失败、超时等）
    #[error("请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    /// 非 2xx 状态码，message 为响应体中的 error 字段
    #[error("接口返回状态 {status}: {}", message.as_deref().unwrap_or("无错误信息"))]
    Status { status: u16, message: Option<String> },

    /// 业务失败（success:false 或包含 error 字段）
    #[error("接口返回错误: {0}")]
    Application(String),

    /// 响应体无法解析
    #[error("响应解析失败: {0}")]
    Decode(String),

    /// 页面缺少渲染所需的区域
    #[error("页面区域不可用: {0}")]
    Unavailable(String),
}

impl ApiError {
    /// 后端给出的错误信息（如果有）
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            Self::Application(message) => Some(message),
            _ => None,
        }
    }

    /// 是否为传输层失败
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// 语音能力错误
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("当前环境不支持语音识别")]
    Unavailable,

    #[error("语音识别失败: {0}")]
    Recognition(String),
}

/// 导航错误
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("No URL found for page ID: {0}")]
    UnknownPage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message() {
        let err = ApiError::Status {
            status: 404,
            message: Some("not found".to_string()),
        };
        assert_eq!(err.server_message(), Some("not found"));
        assert!(!err.is_transport());

        let err = ApiError::Decode("bad json".to_string());
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_unknown_page_message() {
        let err = NavigationError::UnknownPage("fooPage".to_string());
        assert_eq!(err.to_string(), "No URL found for page ID: fooPage");
    }
}
