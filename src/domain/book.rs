use serde::{Deserialize, Serialize};

use super::{BookId, MemberId};

/// 書籍の貸出状態
///
/// 書籍は常にいずれか1つの状態にある。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BookStatus {
    /// 貸出可能
    #[default]
    Available,
    /// 予約中（予約者のみ貸出可能）
    Reserved,
    /// 貸出中
    Borrowed,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Reserved => "Reserved",
            BookStatus::Borrowed => "Borrowed",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, BookStatus::Available)
    }

    pub fn is_reserved(&self) -> bool {
        matches!(self, BookStatus::Reserved)
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self, BookStatus::Borrowed)
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 書籍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub status: BookStatus,
}

impl Book {
    /// 貸出可能な状態の書籍を作成する
    pub fn new(id: u32, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: BookId::new(id),
            title: title.into(),
            author: author.into(),
            status: BookStatus::Available,
        }
    }
}

/// 会員
///
/// `borrowed_books`は貸出順に並び、同じ書籍IDは重複しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub borrowed_books: Vec<Book>,
}

impl Member {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: MemberId::new(id),
            name: name.into(),
            borrowed_books: Vec::new(),
        }
    }

    /// 書籍を借りているか
    pub fn holds(&self, book_id: BookId) -> bool {
        self.borrowed_books.iter().any(|b| b.id == book_id)
    }

    /// 貸出リストから書籍を取り除く（借りていなければ何もしない）
    ///
    /// 取り除いた場合は`true`を返す。
    pub fn release(&mut self, book_id: BookId) -> bool {
        let before = self.borrowed_books.len();
        self.borrowed_books.retain(|b| b.id != book_id);
        self.borrowed_books.len() != before
    }
}
