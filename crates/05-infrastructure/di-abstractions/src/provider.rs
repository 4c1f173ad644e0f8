//! 提供者声明
//!
//! [`Provider`] 是经过校验的提供者，四种 use* 形式各对应一个变体；
//! [`ProviderDecl`] 是宽松的对象形式，来自配置文件等动态来源的声明可能是畸形的，
//! 由注册表在 `add` 时校验；[`RawProvider`] 是规范化之前的输入，额外支持
//! 裸构造器简写。

use di_common::{BoxError, ProviderError, ProviderResult, Token};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 服务实例
pub type Service = Arc<dyn Any + Send + Sync>;

/// 零参数工厂函数
pub type FactoryFn = Arc<dyn Fn() -> Result<Service, BoxError> + Send + Sync>;

/// 可通过零参数构造器创建的服务
pub trait Injectable: Send + Sync + Sized + 'static {
    /// 构建错误类型
    type Error: std::error::Error + Send + Sync + 'static;

    /// 创建服务实例
    fn construct() -> Result<Self, Self::Error>;
}

/// 零参数构造器
///
/// 相当于类引用：它既是构造实例的方式，也通过 [`Constructor::token`] 提供
/// 以类型本身为身份的令牌。
#[derive(Clone)]
pub struct Constructor {
    token: Token,
    type_name: &'static str,
    construct: fn() -> Result<Service, BoxError>,
}

impl Constructor {
    /// 使用 [`Injectable::construct`] 构造 `T`
    pub fn of<T: Injectable>() -> Self {
        Self {
            token: Token::of::<T>(),
            type_name: std::any::type_name::<T>(),
            construct: construct_injectable::<T>,
        }
    }

    /// 使用 [`Default`] 构造 `T`
    pub fn from_default<T: Default + Send + Sync + 'static>() -> Self {
        Self {
            token: Token::of::<T>(),
            type_name: std::any::type_name::<T>(),
            construct: construct_default::<T>,
        }
    }

    /// 以构造的类型为身份的令牌
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// 构造的类型名称
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 构造一个新实例
    pub fn construct(&self) -> Result<Service, BoxError> {
        (self.construct)()
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn construct_injectable<T: Injectable>() -> Result<Service, BoxError> {
    let instance = T::construct().map_err(BoxError::from)?;
    Ok(Arc::new(instance))
}

fn construct_default<T: Default + Send + Sync + 'static>() -> Result<Service, BoxError> {
    Ok(Arc::new(T::default()))
}

/// 提供者种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Value,
    Class,
    Factory,
    Existing,
}

impl ProviderKind {
    /// 对应的声明键
    pub fn key(self) -> &'static str {
        match self {
            Self::Value => "useValue",
            Self::Class => "useClass",
            Self::Factory => "useFactory",
            Self::Existing => "useExisting",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 经过校验的提供者
#[derive(Clone)]
pub enum Provider {
    /// 预先计算好的实例
    UseValue { provide: Token, value: Service },
    /// 首次解析时通过构造器创建实例
    UseClass { provide: Token, ctor: Constructor },
    /// 首次解析时调用工厂函数
    UseFactory { provide: Token, factory: FactoryFn },
    /// 别名：解析 `provide` 等价于解析 `existing`
    UseExisting { provide: Token, existing: Token },
}

impl Provider {
    /// 以值提供服务
    ///
    /// 已经是 [`Service`] 的实例请使用 [`Provider::shared`]，避免再包装一层 `Arc`。
    pub fn value<V: Any + Send + Sync>(provide: Token, value: V) -> Self {
        Self::UseValue {
            provide,
            value: Arc::new(value),
        }
    }

    /// 以共享实例提供服务
    pub fn shared(provide: Token, value: Service) -> Self {
        Self::UseValue { provide, value }
    }

    /// 以构造器提供服务
    pub fn class(provide: Token, ctor: Constructor) -> Self {
        Self::UseClass { provide, ctor }
    }

    /// 以不会失败的工厂函数提供服务
    pub fn factory<T, F>(provide: Token, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::UseFactory {
            provide,
            factory: Arc::new(move || Ok(Arc::new(factory()) as Service)),
        }
    }

    /// 以可能失败的工厂函数提供服务
    pub fn try_factory<T, E, F>(provide: Token, factory: F) -> Self
    where
        T: Any + Send + Sync,
        E: Into<BoxError>,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self::UseFactory {
            provide,
            factory: Arc::new(move || {
                factory()
                    .map(|instance| Arc::new(instance) as Service)
                    .map_err(Into::into)
            }),
        }
    }

    /// 以别名提供服务
    pub fn existing(provide: Token, target: Token) -> Self {
        Self::UseExisting {
            provide,
            existing: target,
        }
    }

    /// 提供的令牌
    pub fn provide(&self) -> &Token {
        match self {
            Self::UseValue { provide, .. }
            | Self::UseClass { provide, .. }
            | Self::UseFactory { provide, .. }
            | Self::UseExisting { provide, .. } => provide,
        }
    }

    /// 提供者种类
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::UseValue { .. } => ProviderKind::Value,
            Self::UseClass { .. } => ProviderKind::Class,
            Self::UseFactory { .. } => ProviderKind::Factory,
            Self::UseExisting { .. } => ProviderKind::Existing,
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Provider");
        debug.field("provide", self.provide()).field("kind", &self.kind());
        match self {
            Self::UseClass { ctor, .. } => debug.field("ctor", &ctor.type_name()),
            Self::UseExisting { existing, .. } => debug.field("existing", existing),
            Self::UseValue { .. } | Self::UseFactory { .. } => &mut debug,
        };
        debug.finish()
    }
}

/// 宽松的提供者声明
///
/// 字段与对象形式的键一一对应，任何无法识别的键都记录在 `extra_keys` 中，
/// 以便错误信息准确列出声明里实际出现的键。
#[derive(Clone, Default)]
pub struct ProviderDecl {
    pub provide: Option<Token>,
    pub use_value: Option<Service>,
    pub use_class: Option<Constructor>,
    pub use_factory: Option<FactoryFn>,
    pub use_existing: Option<Token>,
    pub extra_keys: Vec<String>,
}

impl ProviderDecl {
    /// 创建空声明
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置 `provide`
    pub fn provide(mut self, token: Token) -> Self {
        self.provide = Some(token);
        self
    }

    /// 设置 `useValue`
    pub fn use_value<V: Any + Send + Sync>(mut self, value: V) -> Self {
        self.use_value = Some(Arc::new(value));
        self
    }

    /// 以共享实例设置 `useValue`
    pub fn use_shared(mut self, value: Service) -> Self {
        self.use_value = Some(value);
        self
    }

    /// 设置 `useClass`
    pub fn use_class(mut self, ctor: Constructor) -> Self {
        self.use_class = Some(ctor);
        self
    }

    /// 设置 `useFactory`
    pub fn use_factory(mut self, factory: FactoryFn) -> Self {
        self.use_factory = Some(factory);
        self
    }

    /// 设置 `useExisting`
    pub fn use_existing(mut self, target: Token) -> Self {
        self.use_existing = Some(target);
        self
    }

    /// 记录一个无法识别的键
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.extra_keys.push(key.into());
        self
    }

    /// 声明中出现的全部键
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if self.provide.is_some() {
            keys.push("provide".to_string());
        }
        keys.extend(self.use_keys());
        keys.extend(self.extra_keys.iter().cloned());
        keys
    }

    /// 声明中出现的 use* 键
    pub fn use_keys(&self) -> Vec<String> {
        [
            (self.use_value.is_some(), ProviderKind::Value),
            (self.use_class.is_some(), ProviderKind::Class),
            (self.use_factory.is_some(), ProviderKind::Factory),
            (self.use_existing.is_some(), ProviderKind::Existing),
        ]
        .into_iter()
        .filter(|(present, _)| *present)
        .map(|(_, kind)| kind.key().to_string())
        .collect()
    }
}

impl fmt::Debug for ProviderDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDecl")
            .field("provide", &self.provide)
            .field("keys", &self.keys())
            .finish()
    }
}

impl From<Provider> for ProviderDecl {
    fn from(provider: Provider) -> Self {
        let decl = Self::new().provide(provider.provide().clone());
        match provider {
            Provider::UseValue { value, .. } => decl.use_shared(value),
            Provider::UseClass { ctor, .. } => decl.use_class(ctor),
            Provider::UseFactory { factory, .. } => decl.use_factory(factory),
            Provider::UseExisting { existing, .. } => decl.use_existing(existing),
        }
    }
}

impl TryFrom<ProviderDecl> for Provider {
    type Error = ProviderError;

    fn try_from(decl: ProviderDecl) -> ProviderResult<Self> {
        let use_keys = decl.use_keys();
        let Some(provide) = decl.provide.clone() else {
            return Err(ProviderError::MalformedProvider { keys: decl.keys() });
        };

        let ProviderDecl {
            use_value,
            use_class,
            use_factory,
            use_existing,
            extra_keys,
            ..
        } = decl;

        match (use_value, use_class, use_factory, use_existing) {
            (Some(value), None, None, None) => Ok(Self::UseValue { provide, value }),
            (None, Some(ctor), None, None) => Ok(Self::UseClass { provide, ctor }),
            (None, None, Some(factory), None) => Ok(Self::UseFactory { provide, factory }),
            (None, None, None, Some(existing)) => Ok(Self::UseExisting { provide, existing }),
            (None, None, None, None) => Err(ProviderError::MissingUseKey {
                token: provide,
                keys: extra_keys,
            }),
            _ => Err(ProviderError::ConflictingUseKeys {
                token: provide,
                keys: use_keys,
            }),
        }
    }
}

/// 规范化之前的提供者声明
#[derive(Debug, Clone)]
pub enum RawProvider {
    /// 裸构造器简写，等价于 `{ provide: C, useClass: C }`
    Class(Constructor),
    /// 对象形式的声明
    Declaration(ProviderDecl),
}

impl From<Constructor> for RawProvider {
    fn from(ctor: Constructor) -> Self {
        Self::Class(ctor)
    }
}

impl From<ProviderDecl> for RawProvider {
    fn from(decl: ProviderDecl) -> Self {
        Self::Declaration(decl)
    }
}

impl From<Provider> for RawProvider {
    fn from(provider: Provider) -> Self {
        Self::Declaration(provider.into())
    }
}

/// 将服务实例向下转换为具体类型
pub fn downcast_service<T: Any + Send + Sync>(token: &Token, service: Service) -> ProviderResult<Arc<T>> {
    service
        .downcast::<T>()
        .map_err(|_| ProviderError::TypeMismatch {
            token: token.clone(),
            expected: std::any::type_name::<T>(),
        })
}
