//! 解析链
//!
//! 每个线程维护一条正在解析的 (注册表, 令牌) 链，用于检测循环依赖和限制
//! 解析深度。工厂函数通过捕获的句柄再次调用 `get` 时，解析链会跨越这些调用。

use di_common::{ProviderError, ProviderResult, RegistryConfig, Token};
use std::cell::RefCell;
use uuid::Uuid;

thread_local! {
    static RESOLUTION_CHAIN: RefCell<ResolveContext> = RefCell::new(ResolveContext::new());
}

/// 解析链中的一帧
#[derive(Debug, Clone)]
struct ResolutionFrame {
    registry_id: Uuid,
    token: Token,
}

/// 解析上下文
#[derive(Debug, Clone, Default)]
struct ResolveContext {
    /// 当前解析链，用于检测循环依赖
    resolution_chain: Vec<ResolutionFrame>,
}

impl ResolveContext {
    fn new() -> Self {
        Self::default()
    }

    /// 添加一帧到解析链
    fn push_frame(&mut self, frame: ResolutionFrame, config: &RegistryConfig) -> ProviderResult<()> {
        if config.enable_circular_dependency_detection {
            let repeated = self.resolution_chain.iter().position(|existing| {
                existing.registry_id == frame.registry_id && existing.token == frame.token
            });
            if let Some(start) = repeated {
                return Err(ProviderError::CyclicDependency {
                    dependency_chain: self.render_cycle(start, &frame.token),
                });
            }
        }

        if self.resolution_chain.len() >= config.max_resolution_depth {
            return Err(ProviderError::ResolutionDepthExceeded {
                token: frame.token,
                depth: config.max_resolution_depth,
            });
        }

        self.resolution_chain.push(frame);
        Ok(())
    }

    /// 从解析链中移除最后一帧
    fn pop_frame(&mut self) {
        self.resolution_chain.pop();
    }

    fn render_cycle(&self, start: usize, token: &Token) -> String {
        self.resolution_chain[start..]
            .iter()
            .map(|frame| frame.token.to_string())
            .chain(std::iter::once(token.to_string()))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// 解析帧守卫，离开作用域时弹出对应的帧
pub(crate) struct FrameGuard {
    _private: (),
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        RESOLUTION_CHAIN.with(|chain| chain.borrow_mut().pop_frame());
    }
}

/// 进入一个解析帧
pub(crate) fn enter(registry_id: Uuid, token: &Token, config: &RegistryConfig) -> ProviderResult<FrameGuard> {
    let frame = ResolutionFrame {
        registry_id,
        token: token.clone(),
    };
    RESOLUTION_CHAIN.with(|chain| chain.borrow_mut().push_frame(frame, config))?;
    Ok(FrameGuard { _private: () })
}
