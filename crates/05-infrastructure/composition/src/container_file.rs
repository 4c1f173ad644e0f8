//! 声明式容器配置文件
//!
//! 支持 TOML 与 JSON 两种格式：
//!
//! ```toml
//! scope_name = "app"
//!
//! [registry]
//! warn_on_override = false
//!
//! [[providers]]
//! provide = "api.base_url"
//! useValue = "https://example.test"
//!
//! [[providers]]
//! provide = "api.url"
//! useExisting = "api.base_url"
//! ```
//!
//! `provide` 与 `useExisting` 的取值是符号令牌名称，通过 [`Token::named`] 驻留；
//! `useValue` 以 [`serde_json::Value`] 的形式保存。文件中无法表达构造器和工厂，
//! 出现的其他键会原样带入声明，由注册表报告。

use crate::error::{ContainerError, ContainerResult};
use di_abstractions::{ProviderDecl, RawProvider};
use di_common::{RegistryConfig, Token};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// 容器配置文件
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerFile {
    /// 作用域名称
    #[serde(default)]
    pub scope_name: Option<String>,
    /// 注册表配置，缺省时不覆盖构建器已有的配置
    #[serde(default)]
    pub registry: Option<RegistryConfig>,
    /// 提供者列表
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,
}

/// 配置文件中的提供者条目
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEntry {
    #[serde(default)]
    pub provide: Option<String>,
    /// 出现即为 `Some`，包括 JSON 中的 `null`
    #[serde(rename = "useValue", default, deserialize_with = "present_value")]
    pub use_value: Option<serde_json::Value>,
    #[serde(rename = "useExisting", default)]
    pub use_existing: Option<String>,
    /// 其他无法识别的键
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl ProviderEntry {
    /// 转换为提供者声明
    pub fn into_decl(self) -> ProviderDecl {
        let Self {
            provide,
            use_value,
            use_existing,
            other,
        } = self;

        let mut decl = ProviderDecl::new();
        if let Some(provide) = provide {
            decl = decl.provide(Token::named(&provide));
        }
        if let Some(value) = use_value {
            decl = decl.use_value(value);
        }
        if let Some(target) = use_existing {
            decl = decl.use_existing(Token::named(&target));
        }
        other.into_keys().fold(decl, |decl, key| decl.with_key(key))
    }
}

impl ContainerFile {
    /// 解析 TOML 文本
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 解析 JSON 文本
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// 加载 TOML 配置文件
    pub fn load_toml<P: AsRef<Path>>(path: P) -> ContainerResult<Self> {
        let path = path.as_ref();
        let content = read_file(path)?;
        Self::from_toml_str(&content).map_err(|e| ContainerError::ParseError {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    }

    /// 加载 JSON 配置文件
    pub fn load_json<P: AsRef<Path>>(path: P) -> ContainerResult<Self> {
        let path = path.as_ref();
        let content = read_file(path)?;
        Self::from_json_str(&content).map_err(|e| ContainerError::ParseError {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    }

    /// 转换为提供者声明列表
    pub fn raw_providers(&self) -> Vec<RawProvider> {
        self.providers
            .iter()
            .cloned()
            .map(|entry| entry.into_decl().into())
            .collect()
    }
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

fn read_file(path: &Path) -> ContainerResult<String> {
    if !path.exists() {
        return Err(ContainerError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    debug!("加载容器配置文件: {}", path.display());
    std::fs::read_to_string(path).map_err(|e| ContainerError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}
