//! HTTP探测执行器实现
//!
//! 对单个目标发起一次HTTP请求，把响应、超时和传输错误统一转换为原始结果

use crate::error::{ProbeError, Result};
use crate::health::result::RawResult;
use crate::health::target::ProbeTarget;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use std::error::Error as _;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// 默认的响应宽限时间，整体请求最多耗时 连接超时 + 宽限时间
pub const DEFAULT_RESPONSE_GRACE: Duration = Duration::from_secs(5);

/// 探测执行器trait，定义单次探测接口
///
/// 实现必须把所有传输层失败转换为 [`RawResult`] 哨兵值，而不是返回错误。
#[async_trait]
pub trait ProbeExecutor: Send + Sync {
    /// 执行一次探测
    ///
    /// # 参数
    /// * `target` - 探测目标
    ///
    /// # 返回
    /// * `RawResult` - 响应、超时或错误结果
    async fn execute(&self, target: &ProbeTarget) -> RawResult;
}

/// 基于reqwest的HTTP探测执行器
pub struct HttpProbeExecutor {
    /// HTTP客户端
    client: Client,
    /// HTTP方法
    method: Method,
    /// 所有请求共享的请求头
    headers: HeaderMap,
    /// 整体请求的截止时间
    deadline: Duration,
}

impl HttpProbeExecutor {
    /// 创建新的HTTP探测执行器
    ///
    /// # 参数
    /// * `method` - HTTP方法
    /// * `headers` - 已拆分的请求头
    /// * `connect_timeout` - 连接超时时间
    /// * `response_grace` - 连接建立后等待响应的额外时间
    /// * `verify_tls` - 是否校验TLS证书
    ///
    /// # 返回
    /// * `Result<Self>` - 执行器实例
    pub fn new(
        method: &str,
        headers: &[(String, String)],
        connect_timeout: Duration,
        response_grace: Duration,
        verify_tls: bool,
    ) -> Result<Self> {
        let method = Method::from_str(&method.to_uppercase())
            .map_err(|_| ProbeError::InvalidMethod(method.to_string()))?;

        let headers = Self::build_headers(headers)?;

        if !verify_tls {
            tracing::debug!("TLS证书校验已关闭");
        }

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(ProbeError::ClientBuild)?;

        Ok(Self {
            client,
            method,
            headers,
            deadline: connect_timeout + response_grace,
        })
    }

    /// 构建请求头
    fn build_headers(headers: &[(String, String)]) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ProbeError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ProbeError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            map.append(header_name, header_value);
        }
        Ok(map)
    }

    /// 格式化传输错误信息，使其更加清晰易读
    fn format_request_error(error: &reqwest::Error) -> String {
        let mut chain = String::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push_str(&cause.to_string().to_lowercase());
            chain.push(' ');
            source = cause.source();
        }

        if chain.contains("dns") || chain.contains("failed to lookup") {
            "DNS resolution failed".to_string()
        } else if chain.contains("certificate") || chain.contains("tls") || chain.contains("ssl")
        {
            "SSL/TLS certificate error".to_string()
        } else if error.is_connect() {
            "Connection refused".to_string()
        } else if error.is_request() {
            "Invalid request".to_string()
        } else {
            format!("Request failed: {}", error)
        }
    }
}

#[async_trait]
impl ProbeExecutor for HttpProbeExecutor {
    async fn execute(&self, target: &ProbeTarget) -> RawResult {
        let request = self
            .client
            .request(self.method.clone(), &target.url)
            .headers(self.headers.clone());

        let start_time = Instant::now();
        let response_result = timeout(self.deadline, request.send()).await;
        let elapsed = start_time.elapsed();

        match response_result {
            Ok(Ok(response)) => {
                let status_code = response.status().as_u16();
                tracing::debug!(
                    "探测完成: {} -> {} ({}ms)",
                    target.url,
                    status_code,
                    elapsed.as_millis()
                );
                RawResult::response(&target.url, status_code, elapsed)
            }
            Ok(Err(e)) if e.is_timeout() => {
                tracing::warn!("探测超时: {}", target.url);
                RawResult::timeout(&target.url)
            }
            Ok(Err(e)) => {
                let message = Self::format_request_error(&e);
                tracing::warn!("探测失败: {} - {} ({})", target.url, message, e);
                RawResult::error(&target.url, message)
            }
            Err(_) => {
                tracing::warn!(
                    "探测超过截止时间 {}ms: {}",
                    self.deadline.as_millis(),
                    target.url
                );
                RawResult::timeout(&target.url)
            }
        }
    }
}
