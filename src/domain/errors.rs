/// 貸出ルール違反
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowBookError {
    /// 既に貸出中
    AlreadyBorrowed,
    /// 他の会員が予約中
    ReservedByOther,
}

/// 予約ルール違反
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveBookError {
    /// 既に貸出中
    AlreadyBorrowed,
    /// 既に予約済み（順番待ちはしない）
    AlreadyReserved,
}
