use super::{
    Book, BookStatus, BorrowBookError, MemberId, Reservation, ReservationGeneration,
    ReserveBookError,
};

/// 貸出判定の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowOutcome {
    /// 貸出可能な書籍をそのまま貸し出す
    Direct,
    /// 予約者本人が予約を消化して借りる
    ClaimsReservation,
}

/// 純粋関数：貸出可否を判定する
///
/// ビジネスルール：
/// - 貸出中の書籍は借りられない
/// - 予約中の書籍は予約者本人のみ借りられる
///
/// 副作用なし。状態の変更は呼び出し側がロック内で行う。
pub fn check_borrow(
    book: &Book,
    reservation: Option<&Reservation>,
    member_id: MemberId,
) -> Result<BorrowOutcome, BorrowBookError> {
    match book.status {
        BookStatus::Available => Ok(BorrowOutcome::Direct),
        BookStatus::Borrowed => Err(BorrowBookError::AlreadyBorrowed),
        BookStatus::Reserved => match reservation {
            Some(r) if r.is_held_by(member_id) => Ok(BorrowOutcome::ClaimsReservation),
            _ => Err(BorrowBookError::ReservedByOther),
        },
    }
}

/// 純粋関数：予約可否を判定する
///
/// ビジネスルール：
/// - 貸出中の書籍は予約できない
/// - 予約は1冊につき1件まで（先着優先、順番待ちなし）
pub fn check_reserve(book: &Book) -> Result<(), ReserveBookError> {
    match book.status {
        BookStatus::Available => Ok(()),
        BookStatus::Borrowed => Err(ReserveBookError::AlreadyBorrowed),
        BookStatus::Reserved => Err(ReserveBookError::AlreadyReserved),
    }
}

/// 純粋関数：期限切れ処理が対象の予約にまだ有効か
///
/// タイマー作成時の世代と現在の予約の世代が一致する場合のみ`true`。
/// 予約が消化済み、または別の予約に置き換わっていれば`false`。
pub fn is_expiry_current(
    reservation: Option<&Reservation>,
    generation: ReservationGeneration,
) -> bool {
    reservation.is_some_and(|r| r.generation == generation)
}
