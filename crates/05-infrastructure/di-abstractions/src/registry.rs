//! 服务注册表接口

use crate::normalizer::normalize;
use crate::provider::{ProviderDecl, RawProvider};
use crate::resolver::ServiceResolver;
use di_common::ProviderResult;

/// 服务注册表 trait
///
/// 在只读的 [`ServiceResolver`] 之上增加注册能力。注册需要 `&mut self`，
/// 一旦注册表被冻结为共享句柄就无法再注册。
pub trait ServiceRegistry: ServiceResolver {
    /// 注册提供者
    ///
    /// 同一令牌重复注册时后者覆盖前者。
    fn add(&mut self, declaration: ProviderDecl) -> ProviderResult<()>;

    /// 规范化并按顺序注册一组提供者，遇到第一个错误即停止
    fn add_all(&mut self, declarations: &[RawProvider]) -> ProviderResult<()> {
        for declaration in normalize(declarations) {
            self.add(declaration)?;
        }
        Ok(())
    }
}
