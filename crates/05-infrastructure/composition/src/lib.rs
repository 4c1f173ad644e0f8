//! # 服务容器组合层
//!
//! 负责把注册表、提供者声明和日志系统组合成一个可用的服务容器。
//!
//! ## 主要功能
//!
//! - **服务容器构建器**: 使用构建者模式组装注册表
//! - **声明式配置**: 从 TOML / JSON 文件加载值提供者与别名
//! - **日志初始化**: 基于 tracing-subscriber 的开发/生产预设
//!
//! ## 基本使用
//!
//! ```rust
//! use di_common::Token;
//! use di_composition::ContainerBuilder;
//!
//! let port = Token::named("composition.doc.port");
//! let root = ContainerBuilder::new()
//!     .scope_name("app")
//!     .provide_value(port.clone(), 8080_u16)
//!     .build_handle()
//!     .unwrap();
//!
//! let child = ContainerBuilder::new().parent(root).build().unwrap();
//! assert_eq!(*child.get_as::<u16>(&port).unwrap(), 8080);
//! ```

pub mod builder;
pub mod container_file;
pub mod error;


// 重新导出主要类型
pub use builder::{ContainerBuilder, LoggingConfig};
pub use container_file::{ContainerFile, ProviderEntry};
pub use error::{ContainerError, ContainerResult};
