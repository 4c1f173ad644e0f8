//! 提供者槽位
//!
//! 每个注册的令牌对应一个槽位：保存提供者本身以及实例化状态。
//! 槽位锁只保护状态切换，构造器和工厂函数始终在锁外运行。

use di_abstractions::{Provider, Service};
use di_common::ProviderResult;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// 槽位状态
enum SlotState {
    Uninitialized,
    /// 正在由指定线程构造
    Initializing(ThreadId),
    Ready(Service),
}

/// 提供者槽位
pub(crate) struct ProviderSlot {
    provider: Provider,
    state: Mutex<SlotState>,
    settled: Condvar,
}

impl ProviderSlot {
    pub(crate) fn new(provider: Provider) -> Self {
        let state = match &provider {
            Provider::UseValue { value, .. } => SlotState::Ready(Arc::clone(value)),
            _ => SlotState::Uninitialized,
        };

        Self {
            provider,
            state: Mutex::new(state),
            settled: Condvar::new(),
        }
    }

    pub(crate) fn provider(&self) -> &Provider {
        &self.provider
    }

    /// 是否已经持有实例
    pub(crate) fn is_ready(&self) -> bool {
        matches!(*self.state.lock(), SlotState::Ready(_))
    }

    /// 返回缓存的实例，或者运行一次 `init` 并缓存其结果
    ///
    /// 其他线程正在构造时等待其完成。`init` 失败时槽位回到未初始化状态，
    /// 下一次解析会重新尝试。
    pub(crate) fn get_or_init<F>(&self, init: F) -> ProviderResult<Service>
    where
        F: FnOnce() -> ProviderResult<Service>,
    {
        let current = thread::current().id();
        {
            let mut state = self.state.lock();
            loop {
                let waiting = match &*state {
                    SlotState::Ready(instance) => return Ok(Arc::clone(instance)),
                    SlotState::Initializing(owner) => *owner != current,
                    SlotState::Uninitialized => false,
                };
                if !waiting {
                    break;
                }
                self.settled.wait(&mut state);
            }
            *state = SlotState::Initializing(current);
        }

        let mut guard = InitGuard {
            slot: self,
            instance: None,
        };
        let outcome = init();
        if let Ok(instance) = &outcome {
            guard.instance = Some(Arc::clone(instance));
        }
        drop(guard);
        outcome
    }
}

/// 构造守卫
///
/// 无论 `init` 正常返回、失败还是 panic，都会结算槽位状态并唤醒等待的线程。
struct InitGuard<'a> {
    slot: &'a ProviderSlot,
    instance: Option<Service>,
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        let next = match self.instance.take() {
            Some(instance) => SlotState::Ready(instance),
            None => SlotState::Uninitialized,
        };
        *self.slot.state.lock() = next;
        self.slot.settled.notify_all();
    }
}
