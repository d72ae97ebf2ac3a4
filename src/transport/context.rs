// ==========================================
// 设备点检管理驾驶舱 - 请求上下文
// ==========================================
// 职责: 后端地址、会话令牌、超时，在构造时一次性注入
// 说明: 令牌由认证协作方提供，此处只负责携带
// ==========================================

use std::fmt;
use std::time::Duration;

/// 请求上下文
#[derive(Clone)]
pub struct RequestContext {
    /// 后端根地址（不含末尾斜杠）
    pub base_url: String,
    /// 会话令牌（Bearer）
    pub bearer_token: Option<String>,
    /// 单次请求超时
    pub timeout: Duration,
}

impl RequestContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token: String = token.into();
        self.bearer_token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 拼接接口地址
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

// 令牌不进日志
impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("base_url", &self.base_url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let ctx = RequestContext::new("http://host:8000/api/");
        assert_eq!(ctx.url("/enterprises"), "http://host:8000/api/enterprises");
        assert_eq!(ctx.url("branches/3/workshops"), "http://host:8000/api/branches/3/workshops");
    }

    #[test]
    fn test_blank_token_is_ignored_and_debug_masks_token() {
        let ctx = RequestContext::new("http://h").with_token("  ");
        assert!(ctx.bearer_token.is_none());

        let ctx = RequestContext::new("http://h").with_token("secret-token");
        let debug = format!("{:?}", ctx);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("***"));
    }
}
