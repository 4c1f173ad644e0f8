//! 服务解析接口
//!
//! [`ServiceResolver`] 是只读能力：下游消费者只能解析服务，不能注册提供者。

use crate::provider::{downcast_service, Service};
use di_common::{ProviderResult, Scope, Token};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 服务解析器 trait
pub trait ServiceResolver: Send + Sync {
    /// 解析令牌对应的服务实例
    fn get(&self, token: &Token) -> ProviderResult<Service>;

    /// 检查令牌能否在当前解析链上找到提供者
    fn can_resolve(&self, token: &Token) -> bool;

    /// 解析器所属的作用域
    fn scope(&self) -> Option<Scope> {
        None
    }
}

/// 注册表的只读句柄
///
/// 克隆开销很小，可以安全地沿任意深度的嵌套向下传递。子注册表通过它引用父级，
/// 上下文层通过它发布当前注册表。
#[derive(Clone)]
pub struct RegistryHandle {
    inner: Arc<dyn ServiceResolver>,
}

impl RegistryHandle {
    /// 从解析器创建句柄
    pub fn new(resolver: Arc<dyn ServiceResolver>) -> Self {
        Self { inner: resolver }
    }

    /// 解析服务实例
    pub fn get(&self, token: &Token) -> ProviderResult<Service> {
        self.inner.get(token)
    }

    /// 解析并转换为具体类型
    pub fn get_as<T: Any + Send + Sync>(&self, token: &Token) -> ProviderResult<Arc<T>> {
        downcast_service(token, self.inner.get(token)?)
    }

    /// 解析以类型 `T` 为令牌的服务
    pub fn resolve<T: Any + Send + Sync>(&self) -> ProviderResult<Arc<T>> {
        self.get_as(&Token::of::<T>())
    }

    /// 检查令牌能否被解析
    pub fn can_resolve(&self, token: &Token) -> bool {
        self.inner.can_resolve(token)
    }

    /// 两个句柄是否指向同一个注册表
    pub fn ptr_eq(&self, other: &Self) -> bool {
        // 只比较数据指针
        std::ptr::eq(
            Arc::as_ptr(&self.inner).cast::<()>(),
            Arc::as_ptr(&other.inner).cast::<()>(),
        )
    }

    /// 注册表作用域
    pub fn scope(&self) -> Option<Scope> {
        self.inner.scope()
    }
}

impl ServiceResolver for RegistryHandle {
    fn get(&self, token: &Token) -> ProviderResult<Service> {
        self.inner.get(token)
    }

    fn can_resolve(&self, token: &Token) -> bool {
        self.inner.can_resolve(token)
    }

    fn scope(&self) -> Option<Scope> {
        self.inner.scope()
    }
}

impl fmt::Debug for RegistryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryHandle")
            .field("resolver", &"<resolver>")
            .finish()
    }
}
