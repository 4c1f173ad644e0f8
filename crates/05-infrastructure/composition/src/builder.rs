//! 服务容器构建器

use crate::container_file::ContainerFile;
use crate::error::{ContainerError, ContainerResult};
use di_abstractions::{Constructor, Provider, RawProvider, RegistryHandle, ServiceRegistry};
use di_common::{RegistryConfig, Scope, Token};
use di_impl::ServiceContainerRegistry;
use std::any::Any;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// 服务容器构建器
///
/// 使用建造者模式组装一个注册表：代码中声明的提供者与配置文件中的提供者
/// 按添加顺序注册，后注册者覆盖同一令牌的先注册者。
pub struct ContainerBuilder {
    /// 父级注册表
    parent: Option<RegistryHandle>,
    /// 作用域名称
    scope_name: Option<String>,
    /// 注册表配置
    config: RegistryConfig,
    /// 提供者列表
    providers: Vec<RawProvider>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ContainerBuilder {
    /// 创建新的服务容器构建器
    pub fn new() -> Self {
        Self {
            parent: None,
            scope_name: None,
            config: RegistryConfig::default(),
            providers: Vec::new(),
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 设置父级注册表
    pub fn parent(mut self, parent: RegistryHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    /// 设置作用域名称
    pub fn scope_name(mut self, name: impl Into<String>) -> Self {
        self.scope_name = Some(name.into());
        self
    }

    /// 设置注册表配置
    pub fn with_config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// 添加 TOML 容器配置文件
    pub fn load_config_toml<P: AsRef<Path>>(self, path: P) -> ContainerResult<Self> {
        info!("添加 TOML 容器配置文件: {}", path.as_ref().display());
        Ok(self.with_container_file(ContainerFile::load_toml(path)?))
    }

    /// 添加 JSON 容器配置文件
    pub fn load_config_json<P: AsRef<Path>>(self, path: P) -> ContainerResult<Self> {
        info!("添加 JSON 容器配置文件: {}", path.as_ref().display());
        Ok(self.with_container_file(ContainerFile::load_json(path)?))
    }

    /// 合并已解析的容器配置文件
    ///
    /// 文件中出现 `[registry]` 时整体替换当前的注册表配置，没有时保留原配置。
    pub fn with_container_file(mut self, file: ContainerFile) -> Self {
        let providers = file.raw_providers();
        debug!("容器配置文件包含 {} 个提供者", providers.len());

        if let Some(name) = file.scope_name {
            self.scope_name = Some(name);
        }
        if let Some(config) = file.registry {
            self.config = config;
        }
        self.providers.extend(providers);
        self
    }

    /// 添加提供者
    pub fn provide(mut self, provider: impl Into<RawProvider>) -> Self {
        self.providers.push(provider.into());
        self
    }

    /// 以构造器自身的类型为令牌注册
    pub fn provide_class(self, ctor: Constructor) -> Self {
        self.provide(ctor)
    }

    /// 注册 useValue 提供者
    pub fn provide_value<V: Any + Send + Sync>(self, token: Token, value: V) -> Self {
        self.provide(Provider::value(token, value))
    }

    /// 注册 useFactory 提供者
    pub fn provide_factory<T, F>(self, token: Token, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.provide(Provider::factory(token, factory))
    }

    /// 注册 useExisting 提供者
    pub fn provide_existing(self, alias: Token, target: Token) -> Self {
        self.provide(Provider::existing(alias, target))
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true; // 启用日志初始化
        self
    }

    /// 构建注册表
    pub fn build(self) -> ContainerResult<ServiceContainerRegistry> {
        // 只有在明确配置了日志时才初始化日志，避免在测试环境中重复初始化
        if self.logging_enabled {
            self.logging_config.initialize()?;
        }

        info!("开始构建服务容器");
        let mut registry = ServiceContainerRegistry::with_config(self.parent, self.config);
        if let Some(name) = self.scope_name {
            registry = registry.with_scope(Scope::new(name));
        }
        registry.add_all(&self.providers)?;

        info!("服务容器构建完成: {} ({} 个提供者)", registry.scope(), registry.len());
        Ok(registry)
    }

    /// 构建并冻结为只读句柄
    pub fn build_handle(self) -> ContainerResult<RegistryHandle> {
        Ok(self.build()?.into_handle())
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别，设置了 `RUST_LOG` 时以环境变量为准
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 初始化全局日志系统
    ///
    /// 全局订阅者只能设置一次，重复调用返回 [`ContainerError::LoggingInit`]。
    pub fn initialize(&self) -> ContainerResult<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_ascii_lowercase()));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| ContainerError::LoggingInit {
            message: e.to_string(),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}
