use crate::domain::value_objects::BookId;
use crate::ports::book_service::{BookService as BookServiceTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// BookServiceのモック実装
///
/// カタログコンテキストが未実装の間の代替。
/// 登録された書籍のみ貸出可能で、タイトルも登録時のものを返す。
pub struct BookService {
    titles: Mutex<HashMap<BookId, String>>,
    /// 登録がない書籍も貸出可能として扱うか
    allow_unregistered: bool,
    /// タイトル取得を失敗させるか（カタログ障害の再現用）
    fail_title_lookups: AtomicBool,
}

impl BookService {
    pub fn new() -> Self {
        Self {
            titles: Mutex::new(HashMap::new()),
            allow_unregistered: false,
            fail_title_lookups: AtomicBool::new(false),
        }
    }

    /// 未登録の書籍もすべて貸出可能とするモック
    ///
    /// カタログ連携なしでサーバーを起動する場合に使う。
    pub fn permissive() -> Self {
        Self {
            titles: Mutex::new(HashMap::new()),
            allow_unregistered: true,
            fail_title_lookups: AtomicBool::new(false),
        }
    }

    /// 貸出可能な書籍を登録
    pub fn add_available_book(&self, book_id: BookId) {
        self.add_book(book_id, "Mock Book Title");
    }

    /// タイトル付きで貸出可能な書籍を登録
    pub fn add_book(&self, book_id: BookId, title: &str) {
        self.titles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(book_id, title.to_string());
    }

    /// タイトル取得の失敗を切り替える
    pub fn set_fail_title_lookups(&self, fail: bool) {
        self.fail_title_lookups.store(fail, Ordering::SeqCst);
    }

    /// 書籍を貸出不可にする
    pub fn remove_book(&self, book_id: BookId) {
        self.titles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&book_id);
    }
}

impl Default for BookService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookServiceTrait for BookService {
    async fn is_available_for_loan(&self, book_id: BookId) -> Result<bool> {
        let titles = self.titles.lock().map_err(|e| e.to_string())?;
        Ok(self.allow_unregistered || titles.contains_key(&book_id))
    }

    async fn get_book_title(&self, book_id: BookId) -> Result<String> {
        if self.fail_title_lookups.load(Ordering::SeqCst) {
            return Err(format!("Catalog unavailable for book {}", book_id.value()).into());
        }
        let titles = self.titles.lock().map_err(|e| e.to_string())?;
        Ok(titles
            .get(&book_id)
            .cloned()
            .unwrap_or_else(|| format!("Book {}", book_id.value())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registered_book_is_available() {
        let service = BookService::new();
        let book_id = BookId::new();
        assert!(!service.is_available_for_loan(book_id).await.unwrap());

        service.add_book(book_id, "Dune");
        assert!(service.is_available_for_loan(book_id).await.unwrap());
        assert_eq!(service.get_book_title(book_id).await.unwrap(), "Dune");

        service.remove_book(book_id);
        assert!(!service.is_available_for_loan(book_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_failing_title_lookup() {
        let service = BookService::new();
        let book_id = BookId::new();
        service.add_book(book_id, "Dune");

        service.set_fail_title_lookups(true);
        assert!(service.get_book_title(book_id).await.is_err());
        assert!(service.is_available_for_loan(book_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_permissive_allows_any_book() {
        let service = BookService::permissive();
        assert!(service.is_available_for_loan(BookId::new()).await.unwrap());
    }
}
