//! 组合层错误类型

use di_common::ProviderError;
use thiserror::Error;

/// 容器组合错误类型
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("容器配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("容器配置文件读取失败: {path}, 原因: {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("容器配置解析失败: {path}, 原因: {source}")]
    ParseError {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("服务容器错误: {source}")]
    Provider {
        #[from]
        source: ProviderError,
    },

    #[error("日志初始化失败: {message}")]
    LoggingInit { message: String },
}

/// 结果类型别名
pub type ContainerResult<T> = Result<T, ContainerError>;
