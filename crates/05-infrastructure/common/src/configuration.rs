//! 注册表配置

use serde::{Deserialize, Serialize};

/// 注册表配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// 是否启用循环依赖检测
    pub enable_circular_dependency_detection: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 同一注册表内重复注册令牌时是否输出警告
    pub warn_on_override: bool,
    /// 提供者失败时是否输出错误诊断
    pub log_provider_failures: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enable_circular_dependency_detection: true,
            max_resolution_depth: 100,
            warn_on_override: true,
            log_provider_failures: true,
        }
    }
}

impl RegistryConfig {
    /// 设置是否启用循环依赖检测
    pub fn with_circular_dependency_detection(mut self, enabled: bool) -> Self {
        self.enable_circular_dependency_detection = enabled;
        self
    }

    /// 设置最大解析深度
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// 设置是否在覆盖注册时输出警告
    pub fn with_warn_on_override(mut self, enabled: bool) -> Self {
        self.warn_on_override = enabled;
        self
    }
}
