use serde::{Deserialize, Serialize};
use std::fmt;

/// 書籍ID - カタログ内の書籍の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookId(u32);

impl BookId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for BookId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 会員ID - 会員の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(u32);

impl MemberId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for MemberId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 予約世代
///
/// 予約1件ごとに払い出される単調増加の番号。
/// 期限切れタイマーは作成時の世代を保持し、同じ書籍に対する
/// 後続の予約を誤って取り消さないようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReservationGeneration(u64);

impl ReservationGeneration {
    /// 最初の世代
    pub fn first() -> Self {
        Self(1)
    }

    /// 次の世代
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for ReservationGeneration {
    fn default() -> Self {
        Self::first()
    }
}
