use thiserror::Error;

use crate::domain::{BorrowBookError, ReserveBookError};

/// 貸出・予約アプリケーション層のエラー
///
/// 呼び出し元にそのまま返され、自動リトライは行わない。
/// いずれのエラーもエンジンを使用不能にはしない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LendingError {
    /// 書籍が存在しない
    #[error("book not found")]
    BookNotFound,

    /// 会員が存在しない
    #[error("member not found")]
    MemberNotFound,

    /// 既に貸出中
    #[error("book is already borrowed")]
    AlreadyBorrowed,

    /// 既に予約済み
    #[error("book is already reserved")]
    AlreadyReserved,

    /// 他の会員が予約中
    #[error("book is reserved by another member")]
    ReservedByOther,

    /// 予約ワーカーが停止している
    #[error("reservation worker is not running")]
    WorkerUnavailable,
}

impl From<BorrowBookError> for LendingError {
    fn from(err: BorrowBookError) -> Self {
        match err {
            BorrowBookError::AlreadyBorrowed => LendingError::AlreadyBorrowed,
            BorrowBookError::ReservedByOther => LendingError::ReservedByOther,
        }
    }
}

impl From<ReserveBookError> for LendingError {
    fn from(err: ReserveBookError) -> Self {
        match err {
            ReserveBookError::AlreadyBorrowed => LendingError::AlreadyBorrowed,
            ReserveBookError::AlreadyReserved => LendingError::AlreadyReserved,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LendingError>;
