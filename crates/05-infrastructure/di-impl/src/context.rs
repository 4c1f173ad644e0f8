//! 服务容器上下文
//!
//! 把最近的注册表句柄发布给调用链下游：同步代码使用线程局部槽位，异步代码
//! 使用 tokio 任务局部槽位。没有任何句柄与"句柄存在但没有提供者"是两种
//! 不同的情况，前者由 [`use_service`] 报告为 [`ProviderError::MissingContext`]。

use crate::registry::build_registry;
use di_abstractions::{downcast_service, RawProvider, RegistryHandle, Service};
use di_common::{ProviderError, ProviderResult, Token};
use std::any::Any;
use std::cell::RefCell;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

thread_local! {
    static CURRENT_CONTAINER: RefCell<Option<RegistryHandle>> = const { RefCell::new(None) };
}

tokio::task_local! {
    static TASK_CONTAINER: RegistryHandle;
}

/// 获取最近的注册表句柄
pub fn current_handle() -> Option<RegistryHandle> {
    TASK_CONTAINER
        .try_with(RegistryHandle::clone)
        .ok()
        .or_else(|| CURRENT_CONTAINER.with(|current| current.borrow().clone()))
}

/// 在发布了 `handle` 的作用域内运行 `f`
///
/// 离开作用域时（包括 panic）恢复之前的句柄。
pub fn with_handle<R>(handle: RegistryHandle, f: impl FnOnce(&RegistryHandle) -> R) -> R {
    if TASK_CONTAINER.try_with(|_| ()).is_ok() {
        return TASK_CONTAINER.sync_scope(handle.clone(), || f(&handle));
    }

    let _restore = ThreadScopeGuard::enter(handle.clone());
    f(&handle)
}

/// 在任务局部槽位发布 `handle` 并执行 `future`
///
/// 用于把一个已经构建好的句柄交给异步代码，`future` 中的每次轮询都能看到它。
pub async fn with_handle_async<F: Future>(handle: RegistryHandle, future: F) -> F::Output {
    TASK_CONTAINER.scope(handle, future).await
}

/// 以当前句柄为父级构建注册表，并在发布它的作用域内运行 `f`
pub fn with_services<R>(
    declarations: &[RawProvider],
    f: impl FnOnce(&RegistryHandle) -> R,
) -> ProviderResult<R> {
    let registry = build_registry(declarations, current_handle())?;
    debug!("进入服务容器作用域: {}", registry.scope());
    Ok(with_handle(registry.into_handle(), f))
}

/// [`with_services`] 的异步版本，句柄通过任务局部槽位发布
pub async fn with_services_async<F: Future>(
    declarations: &[RawProvider],
    future: F,
) -> ProviderResult<F::Output> {
    let registry = build_registry(declarations, current_handle())?;
    debug!("进入异步服务容器作用域: {}", registry.scope());
    Ok(with_handle_async(registry.into_handle(), future).await)
}

/// 通过最近的注册表解析服务
pub fn use_service(token: &Token) -> ProviderResult<Service> {
    let handle = current_handle().ok_or(ProviderError::MissingContext)?;
    handle.get(token)
}

/// 通过最近的注册表解析服务并转换为具体类型
pub fn use_service_as<T: Any + Send + Sync>(token: &Token) -> ProviderResult<Arc<T>> {
    downcast_service(token, use_service(token)?)
}

/// 线程局部句柄守卫
struct ThreadScopeGuard {
    previous: Option<RegistryHandle>,
}

impl ThreadScopeGuard {
    fn enter(handle: RegistryHandle) -> Self {
        let previous = CURRENT_CONTAINER.with(|current| current.borrow_mut().replace(handle));
        Self { previous }
    }
}

impl Drop for ThreadScopeGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_CONTAINER.with(|current| *current.borrow_mut() = previous);
    }
}
