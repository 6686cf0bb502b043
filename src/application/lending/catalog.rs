use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::{
    self, Book, BookId, BookStatus, Member, MemberId, Reservation, ReservationGeneration,
    lending::BorrowOutcome,
};

use super::errors::{LendingError, Result};

/// カタログストア
///
/// 書籍・会員・予約の唯一の状態。`Library`のミューテックスの内側にのみ存在し、
/// 外部から直接参照されることはない。
///
/// 各メソッドは判定をすべて終えてから変更を行うため、
/// エラー時に状態が中途半端に書き換わることはない。
#[derive(Debug, Default)]
pub(crate) struct CatalogStore {
    books: BTreeMap<BookId, Book>,
    members: BTreeMap<MemberId, Member>,
    reservations: HashMap<BookId, Reservation>,
    last_generation: Option<ReservationGeneration>,
}

impl CatalogStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 書籍を登録または上書きする
    ///
    /// 新規の書籍は貸出可能として登録する。既存の書籍はタイトルと著者のみ
    /// 更新し、現在の貸出状態（予約・貸出）は維持する。
    pub(crate) fn upsert_book(&mut self, book: Book) {
        match self.books.get_mut(&book.id) {
            Some(existing) => {
                existing.title = book.title;
                existing.author = book.author;
            }
            None => {
                self.books.insert(
                    book.id,
                    Book {
                        status: BookStatus::Available,
                        ..book
                    },
                );
            }
        }
    }

    /// 書籍を削除する（存在しなければ何もしない）
    ///
    /// 予約と会員の貸出リストからも取り除く。
    pub(crate) fn remove_book(&mut self, book_id: BookId) -> bool {
        let removed = self.books.remove(&book_id).is_some();
        self.reservations.remove(&book_id);
        for member in self.members.values_mut() {
            member.release(book_id);
        }
        removed
    }

    /// 会員を登録または上書きする
    ///
    /// 新規の会員は貸出リストを空にして登録する（貸出リストは`borrow`だけが増やす）。
    /// 既存の会員は名前のみ更新し、貸出リストは維持する。
    pub(crate) fn upsert_member(&mut self, member: Member) {
        match self.members.get_mut(&member.id) {
            Some(existing) => existing.name = member.name,
            None => {
                self.members.insert(
                    member.id,
                    Member {
                        borrowed_books: Vec::new(),
                        ..member
                    },
                );
            }
        }
    }

    /// 書籍を貸し出す
    ///
    /// 判定順序：書籍の存在 → 貸出状態・予約者 → 会員の存在
    pub(crate) fn borrow(&mut self, book_id: BookId, member_id: MemberId) -> Result<BorrowOutcome> {
        // 1. 書籍の存在確認
        let book = self.books.get(&book_id).ok_or(LendingError::BookNotFound)?;

        // 2. 貸出可否の判定（ドメイン層の純粋関数）
        let outcome =
            domain::lending::check_borrow(book, self.reservations.get(&book_id), member_id)?;

        // 3. 会員の存在確認
        if !self.members.contains_key(&member_id) {
            return Err(LendingError::MemberNotFound);
        }

        // 4. 状態の変更
        if outcome == BorrowOutcome::ClaimsReservation {
            self.reservations.remove(&book_id);
        }
        let book = self.books.get_mut(&book_id).ok_or(LendingError::BookNotFound)?;
        book.status = BookStatus::Borrowed;
        let borrowed = book.clone();

        let member = self
            .members
            .get_mut(&member_id)
            .ok_or(LendingError::MemberNotFound)?;
        member.borrowed_books.push(borrowed);

        Ok(outcome)
    }

    /// 書籍を返却する
    ///
    /// 会員が実際に借りている場合のみ状態を戻す。借りていなければ何もしない
    /// （二重返却や他人の書籍の返却で予約・貸出状態を壊さない）。
    /// 状態を変更した場合は`true`を返す。
    pub(crate) fn return_book(&mut self, book_id: BookId, member_id: MemberId) -> Result<bool> {
        if !self.books.contains_key(&book_id) {
            return Err(LendingError::BookNotFound);
        }
        let member = self
            .members
            .get_mut(&member_id)
            .ok_or(LendingError::MemberNotFound)?;

        if !member.release(book_id) {
            return Ok(false);
        }

        if let Some(book) = self.books.get_mut(&book_id) {
            book.status = BookStatus::Available;
        }
        Ok(true)
    }

    /// 書籍を予約する
    ///
    /// 成功時は新しい予約の世代を返す。期限切れタイマーはこの世代に紐づける。
    pub(crate) fn reserve(
        &mut self,
        book_id: BookId,
        member_id: MemberId,
        reserved_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<ReservationGeneration> {
        let book = self.books.get(&book_id).ok_or(LendingError::BookNotFound)?;
        domain::lending::check_reserve(book)?;

        if !self.members.contains_key(&member_id) {
            return Err(LendingError::MemberNotFound);
        }

        let generation = self
            .last_generation
            .map_or_else(ReservationGeneration::first, ReservationGeneration::next);
        self.last_generation = Some(generation);

        self.reservations.insert(
            book_id,
            Reservation::new(member_id, generation, reserved_at, ttl),
        );
        if let Some(book) = self.books.get_mut(&book_id) {
            book.status = BookStatus::Reserved;
        }

        Ok(generation)
    }

    /// 期限切れの予約を取り消す
    ///
    /// 指定した世代の予約がまだ残っている場合のみ取り消し、書籍を貸出可能に戻す。
    /// 取り消した場合は`true`を返す。
    pub(crate) fn expire(&mut self, book_id: BookId, generation: ReservationGeneration) -> bool {
        if !domain::lending::is_expiry_current(self.reservations.get(&book_id), generation) {
            return false;
        }

        self.reservations.remove(&book_id);
        if let Some(book) = self.books.get_mut(&book_id) {
            if book.status.is_reserved() {
                book.status = BookStatus::Available;
            }
        }
        true
    }

    pub(crate) fn available_books(&self) -> Vec<Book> {
        self.books
            .values()
            .filter(|b| b.status.is_available())
            .cloned()
            .collect()
    }

    pub(crate) fn borrowed_books(&self, member_id: MemberId) -> Vec<Book> {
        self.members
            .get(&member_id)
            .map(|m| m.borrowed_books.clone())
            .unwrap_or_default()
    }

    pub(crate) fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            books: self.books.values().cloned().collect(),
            members: self.members.values().cloned().collect(),
            reservations: self
                .reservations
                .iter()
                .map(|(id, r)| (*id, r.clone()))
                .collect(),
        }
    }
}

/// カタログのロックを取得する
///
/// 各操作は判定後にのみ変更を行うため、ポイズニングされても状態は整合している。
pub(crate) fn lock(catalog: &Mutex<CatalogStore>) -> MutexGuard<'_, CatalogStore> {
    catalog.lock().unwrap_or_else(PoisonError::into_inner)
}

/// カタログの読み取り専用コピー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub books: Vec<Book>,
    pub members: Vec<Member>,
    pub reservations: BTreeMap<BookId, Reservation>,
}

impl CatalogSnapshot {
    pub fn book(&self, book_id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id == book_id)
    }

    pub fn member(&self, member_id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// 不変条件の違反を列挙する（空なら整合している）
    ///
    /// - 予約が存在する ⇔ 書籍が`Reserved`
    /// - `Borrowed`の書籍はちょうど1人の会員の貸出リストにある
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for book in &self.books {
            let reserved = self.reservations.contains_key(&book.id);
            if reserved != book.status.is_reserved() {
                violations.push(format!(
                    "book {} is {} but reservation present = {}",
                    book.id, book.status, reserved
                ));
            }

            let holders = self.members.iter().filter(|m| m.holds(book.id)).count();
            let expected = usize::from(book.status.is_borrowed());
            if holders != expected {
                violations.push(format!(
                    "book {} is {} but held by {} members",
                    book.id, book.status, holders
                ));
            }
        }

        for book_id in self.reservations.keys() {
            if self.book(*book_id).is_none() {
                violations.push(format!("reservation for unknown book {}", book_id));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(5);

    fn seeded() -> CatalogStore {
        let mut store = CatalogStore::new();
        store.upsert_book(Book::new(1, "The Go Programming Language", "Donovan & Kernighan"));
        store.upsert_book(Book::new(2, "Clean Code", "Robert C. Martin"));
        store.upsert_member(Member::new(1, "Alice"));
        store.upsert_member(Member::new(2, "Bob"));
        store
    }

    fn status_of(store: &CatalogStore, id: u32) -> BookStatus {
        store.snapshot().book(BookId::new(id)).unwrap().status
    }

    #[test]
    fn test_upsert_new_book_forces_available() {
        let mut store = CatalogStore::new();
        store.upsert_book(Book {
            status: BookStatus::Borrowed,
            ..Book::new(5, "Title", "Author")
        });
        assert_eq!(status_of(&store, 5), BookStatus::Available);
    }

    #[test]
    fn test_upsert_new_member_starts_with_no_borrowed_books() {
        let mut store = seeded();
        let go_book = Book::new(1, "The Go Programming Language", "Donovan & Kernighan");
        store.upsert_member(Member {
            borrowed_books: vec![go_book],
            ..Member::new(3, "Carol")
        });

        assert!(store.borrowed_books(MemberId::new(3)).is_empty());
        assert!(store.snapshot().invariant_violations().is_empty());

        // 他の会員が借りても貸出者は1人だけ
        store.borrow(BookId::new(1), MemberId::new(1)).unwrap();
        assert!(store.snapshot().invariant_violations().is_empty());
    }

    #[test]
    fn test_upsert_existing_book_keeps_status() {
        let mut store = seeded();
        store.borrow(BookId::new(1), MemberId::new(1)).unwrap();

        store.upsert_book(Book::new(1, "The Go Programming Language (2nd)", "D & K"));

        let snapshot = store.snapshot();
        let book = snapshot.book(BookId::new(1)).unwrap();
        assert_eq!(book.status, BookStatus::Borrowed);
        assert_eq!(book.title, "The Go Programming Language (2nd)");
        assert!(snapshot.invariant_violations().is_empty());
    }

    #[test]
    fn test_borrow_checks_member_before_mutating() {
        let mut store = seeded();
        let result = store.borrow(BookId::new(1), MemberId::new(99));
        assert_eq!(result, Err(LendingError::MemberNotFound));
        assert_eq!(status_of(&store, 1), BookStatus::Available);
    }

    #[test]
    fn test_borrow_claims_reservation() {
        let mut store = seeded();
        store.reserve(BookId::new(1), MemberId::new(1), Utc::now(), TTL).unwrap();

        let outcome = store.borrow(BookId::new(1), MemberId::new(1)).unwrap();

        assert_eq!(outcome, BorrowOutcome::ClaimsReservation);
        let snapshot = store.snapshot();
        assert!(snapshot.reservations.is_empty());
        assert_eq!(snapshot.book(BookId::new(1)).unwrap().status, BookStatus::Borrowed);
        assert!(snapshot.invariant_violations().is_empty());
    }

    #[test]
    fn test_return_by_non_holder_is_noop() {
        let mut store = seeded();
        store.borrow(BookId::new(1), MemberId::new(1)).unwrap();

        let changed = store.return_book(BookId::new(1), MemberId::new(2)).unwrap();

        assert!(!changed);
        assert_eq!(status_of(&store, 1), BookStatus::Borrowed);
        assert!(store.snapshot().invariant_violations().is_empty());
    }

    #[test]
    fn test_return_does_not_clear_reservation() {
        let mut store = seeded();
        store.reserve(BookId::new(1), MemberId::new(1), Utc::now(), TTL).unwrap();

        let changed = store.return_book(BookId::new(1), MemberId::new(2)).unwrap();

        assert!(!changed);
        assert_eq!(status_of(&store, 1), BookStatus::Reserved);
        assert!(store.snapshot().invariant_violations().is_empty());
    }

    #[test]
    fn test_reserve_unknown_member() {
        let mut store = seeded();
        let result = store.reserve(BookId::new(1), MemberId::new(99), Utc::now(), TTL);
        assert_eq!(result, Err(LendingError::MemberNotFound));
        assert_eq!(status_of(&store, 1), BookStatus::Available);
    }

    #[test]
    fn test_reserve_issues_increasing_generations() {
        let mut store = seeded();
        let first = store.reserve(BookId::new(1), MemberId::new(1), Utc::now(), TTL).unwrap();
        let second = store.reserve(BookId::new(2), MemberId::new(2), Utc::now(), TTL).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_expire_current_generation() {
        let mut store = seeded();
        let generation = store.reserve(BookId::new(1), MemberId::new(1), Utc::now(), TTL).unwrap();

        assert!(store.expire(BookId::new(1), generation));
        assert_eq!(status_of(&store, 1), BookStatus::Available);
        assert!(store.snapshot().reservations.is_empty());
    }

    #[test]
    fn test_expire_stale_generation_is_noop() {
        let mut store = seeded();
        let stale = store.reserve(BookId::new(1), MemberId::new(1), Utc::now(), TTL).unwrap();
        store.borrow(BookId::new(1), MemberId::new(1)).unwrap();
        store.return_book(BookId::new(1), MemberId::new(1)).unwrap();
        store.reserve(BookId::new(1), MemberId::new(2), Utc::now(), TTL).unwrap();

        assert!(!store.expire(BookId::new(1), stale));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.book(BookId::new(1)).unwrap().status, BookStatus::Reserved);
        assert_eq!(
            snapshot.reservations.get(&BookId::new(1)).map(|r| r.member_id),
            Some(MemberId::new(2))
        );
    }

    #[test]
    fn test_remove_book_clears_reservation_and_borrowers() {
        let mut store = seeded();
        store.reserve(BookId::new(1), MemberId::new(1), Utc::now(), TTL).unwrap();
        store.borrow(BookId::new(2), MemberId::new(2)).unwrap();

        assert!(store.remove_book(BookId::new(1)));
        assert!(store.remove_book(BookId::new(2)));
        assert!(!store.remove_book(BookId::new(2)));

        let snapshot = store.snapshot();
        assert!(snapshot.reservations.is_empty());
        assert!(store.borrowed_books(MemberId::new(2)).is_empty());
        assert!(snapshot.invariant_violations().is_empty());
    }

    #[test]
    fn test_upsert_member_keeps_borrowed_books() {
        let mut store = seeded();
        store.borrow(BookId::new(1), MemberId::new(1)).unwrap();

        store.upsert_member(Member::new(1, "Alice Liddell"));

        let snapshot = store.snapshot();
        let member = snapshot.member(MemberId::new(1)).unwrap();
        assert_eq!(member.name, "Alice Liddell");
        assert_eq!(member.borrowed_books.len(), 1);
    }
}
