//! # DI Common
//!
//! 服务容器各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`Token`] - 按身份比较的服务令牌
//! - [`ProviderError`] - 服务容器错误类型
//! - [`Scope`] - 注册表作用域
//! - [`RegistryConfig`] - 注册表配置

pub mod configuration;
pub mod errors;
pub mod scope;
pub mod token;

pub use configuration::*;
pub use errors::*;
pub use scope::*;
pub use token::*;
