//! 服务令牌
//!
//! 令牌是注册表中的键，按身份比较而不是按结构比较：
//!
//! - [`Token::of`] - 以类型本身作为令牌（相当于类引用）
//! - [`Token::named`] - 全局驻留的符号令牌，相同名称总是得到同一个令牌
//! - [`Token::unique`] - 每次调用都生成一个全新的符号令牌

use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 下一个符号令牌的标识
static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// 符号令牌驻留表
static SYMBOL_REGISTRY: Lazy<DashMap<String, Token>> = Lazy::new(DashMap::new);

/// 令牌身份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TokenKey {
    Type(TypeId),
    Symbol(u64),
}

/// 服务令牌
///
/// 克隆开销很小。相等性与哈希只取决于令牌身份，描述文本仅用于诊断输出。
#[derive(Clone)]
pub struct Token {
    key: TokenKey,
    description: Arc<str>,
}

impl Token {
    /// 以类型 `T` 作为令牌
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            key: TokenKey::Type(TypeId::of::<T>()),
            description: short_type_name(std::any::type_name::<T>()).into(),
        }
    }

    /// 获取驻留的符号令牌
    ///
    /// 同一个名称在整个进程内总是对应同一个令牌。
    pub fn named(key: &str) -> Self {
        SYMBOL_REGISTRY
            .entry(key.to_string())
            .or_insert_with(|| Self::unique(key))
            .value()
            .clone()
    }

    /// 创建一个全新的符号令牌
    ///
    /// 即使描述相同，两次调用得到的令牌也互不相等。
    pub fn unique(description: &str) -> Self {
        Self {
            key: TokenKey::Symbol(NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed)),
            description: description.into(),
        }
    }

    /// 令牌描述
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 是否为符号令牌
    pub fn is_symbol(&self) -> bool {
        matches!(self.key, TokenKey::Symbol(_))
    }

    /// 是否为类型 `T` 的令牌
    pub fn is_type<T: ?Sized + 'static>(&self) -> bool {
        self.key == TokenKey::Type(TypeId::of::<T>())
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key {
            TokenKey::Type(_) => f.write_str(&self.description),
            TokenKey::Symbol(_) => write!(f, "Symbol({})", self.description),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({self})")
    }
}

/// 去掉类型名称中每一段的模块路径
///
/// `alloc::vec::Vec<alloc::string::String>` 会变成 `Vec<String>`。
fn short_type_name(full: &str) -> String {
    let mut short = String::with_capacity(full.len());
    let mut segment = String::new();

    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
            continue;
        }
        short.push_str(last_path_segment(&segment));
        segment.clear();
        short.push(ch);
    }
    short.push_str(last_path_segment(&segment));
    short
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
