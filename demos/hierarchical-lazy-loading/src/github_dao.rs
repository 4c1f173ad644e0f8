//! 仓库列表 DAO
//!
//! 不访问网络，返回内置的仓库数据并模拟请求延迟。

use di_abstractions::Injectable;
use di_common::{ProviderError, Token};
use di_impl::use_service_as;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// API 根地址令牌名称
pub const API_BASE_URL: &str = "github.api_base_url";

/// 分页大小令牌名称
pub const PAGE_SIZE: &str = "github.page_size";

static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

const CANNED_REPOS: [(u64, &str); 5] = [
    (1, "mojombo/grit"),
    (26, "wycats/merb-core"),
    (27, "rubinius/rubinius"),
    (28, "mojombo/god"),
    (29, "vanpelt/jsawesome"),
];

/// 仓库摘要
#[derive(Debug, Clone, Serialize)]
pub struct Repo {
    pub id: u64,
    pub name: String,
    pub link: String,
}

/// 仓库列表 DAO
#[derive(Debug)]
pub struct GithubDao {
    base_url: String,
}

impl GithubDao {
    /// 已构造的实例数量
    pub fn constructions() -> usize {
        CONSTRUCTIONS.load(Ordering::SeqCst)
    }

    /// 列出仓库
    pub async fn list_repos(&self, limit: usize) -> anyhow::Result<Vec<Repo>> {
        debug!("请求 {}/repositories", self.base_url);
        tokio::time::sleep(Duration::from_millis(50)).await;

        Ok(CANNED_REPOS
            .iter()
            .take(limit)
            .map(|(id, name)| Repo {
                id: *id,
                name: (*name).to_string(),
                link: format!("https://github.com/{name}"),
            })
            .collect())
    }
}

impl Injectable for GithubDao {
    type Error = ProviderError;

    /// 通过当前最近的作用域读取 API 根地址
    ///
    /// 实例缓存在注册 DAO 的作用域中，但根地址取自首次解析时最近的作用域。
    /// 子作用域覆盖了 [`API_BASE_URL`] 时，先在子作用域中解析会让缓存的实例
    /// 带上子作用域的地址，所以根地址只应在注册 DAO 的作用域中提供。
    fn construct() -> Result<Self, Self::Error> {
        let base_url = use_service_as::<String>(&Token::named(API_BASE_URL))?;
        CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
        info!("构造 GithubDao: {}", base_url);

        Ok(Self {
            base_url: base_url.as_ref().clone(),
        })
    }
}
