//! 分页合并：沿续读令牌拉取全部分页，按存储顺序拼接。

use ems_storage::{ContinuationToken, ResultPage, StorageError};
use ems_telemetry::record_page_fetched;
use std::future::Future;
use tracing::debug;

/// 反复调用 `fetch` 直到不再返回续读令牌。
///
/// 任一页失败即返回该错误，已拉取的分页全部丢弃。
pub async fn merge_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, StorageError>
where
    F: FnMut(Option<ContinuationToken>) -> Fut,
    Fut: Future<Output = Result<ResultPage<T>, StorageError>>,
{
    let mut items = Vec::new();
    let mut token = None;
    let mut pages = 0u32;
    loop {
        let page = fetch(token.take()).await?;
        pages += 1;
        record_page_fetched();
        debug!(
            target: "ems.query",
            page = pages,
            items = page.items.len(),
            has_next = page.next.is_some(),
            "query_page_fetched"
        );
        items.extend(page.items);
        match page.next {
            Some(next) => token = Some(next),
            None => return Ok(items),
        }
    }
}
