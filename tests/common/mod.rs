#![allow(dead_code)]

use rusty_library_lending::application::lending::Library;
use rusty_library_lending::config::LendingConfig;
use rusty_library_lending::domain::{Book, BookId, BookStatus, Member, MemberId};
use rusty_library_lending::ports::LibraryManager;
use std::sync::Arc;
use std::time::Duration;

pub const GO_BOOK: BookId = BookId::new(1);
pub const CLEAN_CODE: BookId = BookId::new(2);
pub const ALICE: MemberId = MemberId::new(1);
pub const BOB: MemberId = MemberId::new(2);

/// テスト用の図書館を作成し、書籍2冊と会員2人を登録する
///
/// 書籍: 1 "The Go Programming Language", 2 "Clean Code"
/// 会員: 1 Alice, 2 Bob
pub async fn seeded_library(ttl: Duration) -> Arc<Library> {
    let library = Arc::new(Library::new(LendingConfig::new(ttl)));
    library
        .add_book(Book::new(1, "The Go Programming Language", "Donovan & Kernighan"))
        .await;
    library
        .add_book(Book::new(2, "Clean Code", "Robert C. Martin"))
        .await;
    library.add_member(Member::new(1, "Alice")).await;
    library.add_member(Member::new(2, "Bob")).await;
    library
}

/// 書籍の現在の状態
pub fn status_of(library: &Library, book_id: BookId) -> BookStatus {
    library
        .snapshot()
        .book(book_id)
        .map(|b| b.status)
        .expect("book should exist")
}

/// 不変条件が保たれていることを確認する
pub fn assert_consistent(library: &Library) {
    let violations = library.snapshot().invariant_violations();
    assert!(violations.is_empty(), "invariant violations: {:?}", violations);
}
