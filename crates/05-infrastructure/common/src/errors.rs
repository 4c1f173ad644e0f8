//! 错误类型定义

use crate::token::Token;
use thiserror::Error;

/// 任意提供者构造错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 提供者声明中允许出现的 use* 键
pub const VALID_USE_KEYS: [&str; 4] = ["useValue", "useClass", "useFactory", "useExisting"];

/// 服务容器错误类型
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(
        "[service-container] 提供者缺少 \"provide\" 键，实际包含的键: {}。每个提供者都必须指定 \"provide\" 键以及一个正确的 use* 值",
        quote_keys(.keys)
    )]
    MalformedProvider { keys: Vec<String> },

    #[error(
        "[service-container] 令牌 {token} 的提供者缺少正确的 use* 值，实际包含的键: {}。可选值为: {}",
        quote_keys(.keys),
        valid_use_keys()
    )]
    MissingUseKey { token: Token, keys: Vec<String> },

    #[error(
        "[service-container] 令牌 {token} 的提供者同时指定了多个 use* 值: {}。每个提供者只能指定 {} 中的一个",
        quote_keys(.keys),
        valid_use_keys()
    )]
    ConflictingUseKeys { token: Token, keys: Vec<String> },

    #[error(
        "[service-container] 找不到令牌 {token} 的提供者。可以把它理解为\"变量未定义\"错误: 请确认在某个上层服务容器的 providers 中为该令牌配置了提供者"
    )]
    ProviderNotFound { token: Token },

    #[error("[service-container] 令牌 {token} 的提供者抛出错误: {source}")]
    ProviderConstruction {
        token: Token,
        #[source]
        source: BoxError,
    },

    #[error(
        "[service-container] useExisting 提供者 {alias} 的别名查找失败: 目标令牌 {target} 没有注册为提供者。请确保目标令牌在别名被引用之前已经注册；如果目标与别名位于同一个 providers 列表中，目标必须排在别名之前"
    )]
    AliasResolution { alias: Token, target: Token },

    #[error("[service-container] 检测到循环依赖: {dependency_chain}")]
    CyclicDependency { dependency_chain: String },

    #[error("[service-container] 解析令牌 {token} 时超过最大解析深度 {depth}")]
    ResolutionDepthExceeded { token: Token, depth: usize },

    #[error("[service-container] 令牌 {token} 的服务实例不是 {expected} 类型")]
    TypeMismatch { token: Token, expected: &'static str },

    #[error(
        "[service-container] 找不到服务容器上下文。看起来 use_service() 是在任何服务容器作用域之外调用的: 请确认调用链上层已经通过 with_services(...) 发布了服务容器"
    )]
    MissingContext,
}

impl ProviderError {
    /// 创建提供者未找到错误
    pub fn not_found(token: &Token) -> Self {
        Self::ProviderNotFound {
            token: token.clone(),
        }
    }

    /// 创建提供者构造失败错误
    pub fn construction(token: &Token, source: impl Into<BoxError>) -> Self {
        Self::ProviderConstruction {
            token: token.clone(),
            source: source.into(),
        }
    }

    /// 是否为畸形提供者声明错误
    ///
    /// 缺少 `provide`、缺少 use* 值以及同时指定多个 use* 值都属于此类。
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedProvider { .. }
                | Self::MissingUseKey { .. }
                | Self::ConflictingUseKeys { .. }
        )
    }

    /// 是否为提供者未找到错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProviderNotFound { .. })
    }
}

/// 结果类型别名
pub type ProviderResult<T> = Result<T, ProviderError>;

fn quote_keys(keys: &[String]) -> String {
    if keys.is_empty() {
        return "(无)".to_string();
    }
    keys.iter()
        .map(|key| format!("\"{key}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn valid_use_keys() -> String {
    let keys = VALID_USE_KEYS
        .iter()
        .map(|key| format!("\"{key}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{keys}]")
}
