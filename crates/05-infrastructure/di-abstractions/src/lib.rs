//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义提供者声明和注册表的核心接口。
//!
//! ## 核心接口
//!
//! - [`Provider`] / [`ProviderDecl`] / [`RawProvider`] - 提供者声明
//! - [`normalize`] - 提供者规范化
//! - [`ServiceResolver`] / [`RegistryHandle`] - 只读解析能力
//! - [`ServiceRegistry`] - 注册表接口

pub mod normalizer;
pub mod provider;
pub mod registry;
pub mod resolver;

pub use normalizer::*;
pub use provider::*;
pub use registry::*;
pub use resolver::*;
