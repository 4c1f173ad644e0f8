//! 服务容器注册表实现

use crate::resolution;
use crate::slot::ProviderSlot;
use di_abstractions::{
    downcast_service, Provider, ProviderDecl, ProviderKind, RawProvider, RegistryHandle, Service,
    ServiceRegistry, ServiceResolver,
};
use di_common::{ProviderError, ProviderResult, RegistryConfig, Scope, Token};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 分层服务容器注册表
///
/// 自身的提供者表优先，找不到时委托给父级句柄，直到根注册表。实例在每个
/// 注册表内只创建一次。
pub struct ServiceContainerRegistry {
    /// 作用域
    scope: Scope,
    /// 父级注册表
    parent: Option<RegistryHandle>,
    /// 令牌到提供者槽位的映射
    providers: HashMap<Token, ProviderSlot>,
    /// 注册表配置
    config: RegistryConfig,
}

impl ServiceContainerRegistry {
    /// 创建新的注册表
    pub fn new(parent: Option<RegistryHandle>) -> Self {
        Self::with_config(parent, RegistryConfig::default())
    }

    /// 使用指定配置创建注册表
    pub fn with_config(parent: Option<RegistryHandle>, config: RegistryConfig) -> Self {
        let scope = if parent.is_some() {
            Scope::new("child")
        } else {
            Scope::root()
        };

        Self {
            scope,
            parent,
            providers: HashMap::new(),
            config,
        }
    }

    /// 创建命名的子注册表
    ///
    /// 作用域名称接在父级作用域之后，例如 `root.feature`。
    pub fn child_of(parent: RegistryHandle, name: impl Into<String>) -> Self {
        let scope = match parent.scope() {
            Some(parent_scope) => parent_scope.child(name),
            None => Scope::new(name),
        };
        Self::new(Some(parent)).with_scope(scope)
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// 注册提供者
    ///
    /// 声明畸形时返回错误，已注册的其他提供者不受影响。同一令牌重复注册时
    /// 后者覆盖前者。
    pub fn add(&mut self, declaration: impl Into<ProviderDecl>) -> ProviderResult<()> {
        let provider = Provider::try_from(declaration.into())?;
        let token = provider.provide().clone();
        debug!("注册提供者: {} ({}) -> {}", token, provider.kind(), self.scope);

        let replaced = self
            .providers
            .insert(token.clone(), ProviderSlot::new(provider))
            .is_some();
        if replaced && self.config.warn_on_override {
            warn!("作用域 {} 中令牌 {} 的提供者被重新注册，之前的提供者已被覆盖", self.scope, token);
        }
        Ok(())
    }

    /// 解析服务实例
    pub fn get(&self, token: &Token) -> ProviderResult<Service> {
        if let Some(slot) = self.providers.get(token) {
            return self.resolve_local(token, slot).map_err(|err| {
                if self.config.log_provider_failures {
                    error!(
                        "[service-container] 令牌 {} 的提供者抛出错误 (作用域 {})，请查看返回的错误了解详细信息",
                        token, self.scope
                    );
                }
                err
            });
        }

        if let Some(parent) = &self.parent {
            // 逐级委托给父级注册表，直到根注册表
            return parent.get(token);
        }

        Err(ProviderError::not_found(token))
    }

    /// 解析并转换为具体类型
    pub fn get_as<T: Any + Send + Sync>(&self, token: &Token) -> ProviderResult<Arc<T>> {
        downcast_service(token, self.get(token)?)
    }

    /// 解析以类型 `T` 为令牌的服务
    pub fn resolve<T: Any + Send + Sync>(&self) -> ProviderResult<Arc<T>> {
        self.get_as(&Token::of::<T>())
    }

    /// 本注册表自身是否提供该令牌
    pub fn contains(&self, token: &Token) -> bool {
        self.providers.contains_key(token)
    }

    /// 令牌能否在解析链上找到提供者
    pub fn can_resolve(&self, token: &Token) -> bool {
        self.contains(token)
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.can_resolve(token))
    }

    /// 本注册表自身提供的令牌
    pub fn tokens(&self) -> Vec<Token> {
        self.providers.keys().cloned().collect()
    }

    /// 提供者数量
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// 是否没有任何提供者
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// 作用域
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// 父级句柄
    pub fn parent(&self) -> Option<&RegistryHandle> {
        self.parent.as_ref()
    }

    /// 注册表配置
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// 统计信息
    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats {
            registered_providers: self.providers.len(),
            ..RegistryStats::default()
        };
        for slot in self.providers.values() {
            if slot.provider().kind() == ProviderKind::Existing {
                stats.aliases += 1;
            } else if slot.is_ready() {
                stats.instantiated += 1;
            }
        }
        stats
    }

    /// 冻结为只读句柄
    pub fn into_handle(self) -> RegistryHandle {
        info!("服务容器 {} 就绪，共 {} 个提供者", self.scope, self.providers.len());
        RegistryHandle::new(Arc::new(self))
    }

    fn resolve_local(&self, token: &Token, slot: &ProviderSlot) -> ProviderResult<Service> {
        let _frame = resolution::enter(self.scope.id, token, &self.config)?;

        match slot.provider() {
            Provider::UseValue { value, .. } => Ok(Arc::clone(value)),
            // 别名不单独缓存，每次都从本注册表重新走完整的解析链
            Provider::UseExisting { existing, .. } => self.get(existing).map_err(|err| match err {
                ProviderError::ProviderNotFound { .. } => ProviderError::AliasResolution {
                    alias: token.clone(),
                    target: existing.clone(),
                },
                other => other,
            }),
            Provider::UseClass { ctor, .. } => slot.get_or_init(|| {
                debug!("构造服务: {} ({})", token, ctor.type_name());
                ctor.construct()
                    .map_err(|source| ProviderError::construction(token, source))
            }),
            Provider::UseFactory { factory, .. } => slot.get_or_init(|| {
                debug!("调用工厂: {}", token);
                factory().map_err(|source| ProviderError::construction(token, source))
            }),
        }
    }
}

impl ServiceResolver for ServiceContainerRegistry {
    fn get(&self, token: &Token) -> ProviderResult<Service> {
        Self::get(self, token)
    }

    fn can_resolve(&self, token: &Token) -> bool {
        Self::can_resolve(self, token)
    }

    fn scope(&self) -> Option<Scope> {
        Some(self.scope.clone())
    }
}

impl ServiceRegistry for ServiceContainerRegistry {
    fn add(&mut self, declaration: ProviderDecl) -> ProviderResult<()> {
        Self::add(self, declaration)
    }
}

impl fmt::Debug for ServiceContainerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainerRegistry")
            .field("scope", &self.scope.name)
            .field("tokens", &self.tokens())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// 注册表统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// 已注册提供者数量
    pub registered_providers: usize,
    /// 已持有实例的提供者数量
    pub instantiated: usize,
    /// 别名提供者数量
    pub aliases: usize,
}

/// 构建注册表
///
/// 先规范化声明，再按顺序逐个注册，遇到第一个畸形声明即返回错误。
pub fn build_registry(
    declarations: &[RawProvider],
    parent: Option<RegistryHandle>,
) -> ProviderResult<ServiceContainerRegistry> {
    let mut registry = ServiceContainerRegistry::new(parent);
    registry.add_all(declarations)?;
    debug!("构建注册表完成: {} ({} 个提供者)", registry.scope, registry.len());
    Ok(registry)
}
