//! 提供者规范化
//!
//! 在注册之前把简写形式展开为规范的 `{ provide, use* }` 形式。

use crate::provider::{Provider, ProviderDecl, RawProvider};

/// 规范化提供者声明列表
///
/// 裸构造器被改写为 `{ provide: C, useClass: C }`，其余声明原样传递，形状校验
/// 留给注册表的 `add`。顺序保持不变，输入不会被修改。
pub fn normalize(declarations: &[RawProvider]) -> Vec<ProviderDecl> {
    declarations
        .iter()
        .map(|declaration| match declaration {
            RawProvider::Class(ctor) => {
                Provider::class(ctor.token().clone(), ctor.clone()).into()
            }
            RawProvider::Declaration(decl) => decl.clone(),
        })
        .collect()
}
