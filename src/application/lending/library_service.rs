use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};

use crate::config::LendingConfig;
use crate::domain::{Book, BookId, Member, MemberId, lending::BorrowOutcome};
use crate::ports::LibraryManager;

use super::catalog::{self, CatalogSnapshot, CatalogStore};
use super::errors::Result;
use super::reservation_expiry::schedule_expiry;

/// 貸出サービス
///
/// カタログストアを単一のミューテックスで所有する。
/// すべての状態遷移（追加・削除・貸出・返却・予約・期限切れ）は
/// 1回のロック取得の中で判定と変更を行うため、線形化可能である。
///
/// ロックは`.await`をまたいで保持しない。
pub struct Library {
    catalog: Arc<Mutex<CatalogStore>>,
    config: LendingConfig,
}

impl Library {
    pub fn new(config: LendingConfig) -> Self {
        Self {
            catalog: Arc::new(Mutex::new(CatalogStore::new())),
            config,
        }
    }

    pub fn config(&self) -> &LendingConfig {
        &self.config
    }

    /// カタログ全体の読み取り専用コピー
    pub fn snapshot(&self) -> CatalogSnapshot {
        catalog::lock(&self.catalog).snapshot()
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new(LendingConfig::default())
    }
}

#[async_trait]
impl LibraryManager for Library {
    async fn add_book(&self, book: Book) {
        let book_id = book.id;
        catalog::lock(&self.catalog).upsert_book(book);
        tracing::debug!("Book {} added", book_id);
    }

    async fn remove_book(&self, book_id: BookId) {
        let removed = catalog::lock(&self.catalog).remove_book(book_id);
        if removed {
            tracing::debug!("Book {} removed", book_id);
        }
    }

    async fn add_member(&self, member: Member) {
        let member_id = member.id;
        catalog::lock(&self.catalog).upsert_member(member);
        tracing::debug!("Member {} added", member_id);
    }

    async fn borrow_book(&self, book_id: BookId, member_id: MemberId) -> Result<()> {
        let outcome = catalog::lock(&self.catalog).borrow(book_id, member_id)?;

        match outcome {
            BorrowOutcome::Direct => {
                tracing::debug!("Book {} borrowed by member {}", book_id, member_id);
            }
            BorrowOutcome::ClaimsReservation => {
                tracing::debug!(
                    "Book {} borrowed by member {} (reservation claimed)",
                    book_id,
                    member_id
                );
            }
        }
        Ok(())
    }

    async fn return_book(&self, book_id: BookId, member_id: MemberId) -> Result<()> {
        let returned = catalog::lock(&self.catalog).return_book(book_id, member_id)?;

        if returned {
            tracing::debug!("Book {} returned by member {}", book_id, member_id);
        } else {
            tracing::debug!(
                "Return of book {} by member {} ignored: not borrowed by this member",
                book_id,
                member_id
            );
        }
        Ok(())
    }

    async fn reserve_book(&self, book_id: BookId, member_id: MemberId) -> Result<()> {
        // 1. ロック内で判定と予約の記録を行う
        let ttl = self.config.reservation_ttl;
        let generation =
            catalog::lock(&self.catalog).reserve(book_id, member_id, Utc::now(), ttl)?;

        // 2. この予約の世代に紐づいた期限切れタイマーを起動
        schedule_expiry(
            Arc::downgrade(&self.catalog),
            book_id,
            generation,
            ttl,
        );

        tracing::debug!(
            "Book {} reserved by member {} for {:?}",
            book_id,
            member_id,
            ttl
        );
        Ok(())
    }

    async fn list_available_books(&self) -> Vec<Book> {
        catalog::lock(&self.catalog).available_books()
    }

    async fn list_borrowed_books(&self, member_id: MemberId) -> Vec<Book> {
        catalog::lock(&self.catalog).borrowed_books(member_id)
    }
}
