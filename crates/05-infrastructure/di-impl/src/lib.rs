//! # 依赖注入具体实现
//!
//! 提供分层服务容器注册表、循环依赖检测和服务容器上下文。
//!
//! ```rust
//! use di_abstractions::{Constructor, Provider};
//! use di_common::Token;
//! use di_impl::build_registry;
//!
//! #[derive(Debug, Default)]
//! struct Greeter;
//!
//! let greeting = Token::named("doc.greeting");
//! let root = build_registry(
//!     &[
//!         Constructor::from_default::<Greeter>().into(),
//!         Provider::value(greeting.clone(), "hello").into(),
//!     ],
//!     None,
//! )
//! .unwrap()
//! .into_handle();
//!
//! let child = build_registry(&[], Some(root.clone())).unwrap();
//! assert_eq!(*child.get_as::<&'static str>(&greeting).unwrap(), "hello");
//! assert!(child.resolve::<Greeter>().is_ok());
//! ```

pub mod context;
pub mod registry;
mod resolution;
mod slot;

pub use context::{
    current_handle, use_service, use_service_as, with_handle, with_handle_async, with_services,
    with_services_async,
};
pub use registry::{build_registry, RegistryStats, ServiceContainerRegistry};
