//! 探测目标展开
//!
//! 将 schema × 基础域名 × 页面 展开为有序的探测目标列表

use crate::config::CheckerConfig;
use crate::error::ConfigError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 一个具体的探测目标，以解析后的URL作为标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProbeTarget {
    /// schema（http/https）
    pub schema: String,
    /// 基础域名
    pub base_domain: String,
    /// 页面路径，原样使用
    pub page: String,
    /// 解析后的完整URL
    pub url: String,
}

impl ProbeTarget {
    /// 拼接 schema、域名、页面和查询字符串
    ///
    /// # 参数
    /// * `schema` - schema
    /// * `base_domain` - 基础域名
    /// * `page` - 页面路径
    /// * `query` - 查询字符串（可选），追加在页面自带的查询之后
    ///
    /// # 返回
    /// * `Result<Self, ConfigError>` - 无法构造合法URL时返回配置错误
    pub fn new(
        schema: &str,
        base_domain: &str,
        page: &str,
        query: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let base = format!("{schema}://{base_domain}");
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: format!("{base}{page}"),
            reason,
        };

        let mut url = Url::parse(&base)
            .and_then(|base_url| base_url.join(page))
            .map_err(|e| invalid(e.to_string()))?;

        if url.host_str().is_none() {
            return Err(invalid("缺少主机名".to_string()));
        }

        // 追加到页面自带的查询字符串之后
        if let Some(query) = query.map(|q| q.trim_start_matches('?')).filter(|q| !q.is_empty()) {
            let merged = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
                _ => query.to_string(),
            };
            url.set_query(Some(&merged));
        }

        Ok(Self {
            schema: schema.to_string(),
            base_domain: base_domain.to_string(),
            page: page.to_string(),
            url: url.to_string(),
        })
    }

    /// 是否使用TLS
    pub fn is_tls(&self) -> bool {
        self.schema == "https"
    }
}

/// 按 schema（最外层）、域名、页面（最内层）的顺序展开全部目标
///
/// 不做任何网络或IO操作；任一维度为空时返回配置错误。
/// URL是目标的标识，解析后相同的组合（如页面 `/a` 与 `a`）只保留第一次出现。
pub fn expand_targets(config: &CheckerConfig) -> Result<Vec<ProbeTarget>, ConfigError> {
    if config.schemas.is_empty() || config.base_domains.is_empty() || config.pages.is_empty() {
        return Err(ConfigError::ValidationError(
            "schema、基础域名和页面均不能为空".to_string(),
        ));
    }

    let mut targets = Vec::with_capacity(config.target_count());
    let mut seen_urls = HashSet::with_capacity(config.target_count());
    for schema in &config.schemas {
        for base_domain in &config.base_domains {
            for page in &config.pages {
                let target = ProbeTarget::new(schema, base_domain, page, config.query.as_deref())?;
                if seen_urls.insert(target.url.clone()) {
                    targets.push(target);
                } else {
                    tracing::debug!("跳过重复的探测目标: {}", target.url);
                }
            }
        }
    }

    tracing::debug!("展开探测目标 {} 个", targets.len());
    Ok(targets)
}
