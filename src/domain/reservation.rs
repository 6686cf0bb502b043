use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{MemberId, ReservationGeneration};

/// 予約
///
/// 書籍が`Reserved`状態の間だけ存在する。1冊につき最大1件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub member_id: MemberId,
    pub generation: ReservationGeneration,
    pub reserved_at: DateTime<Utc>,
    /// 期限切れタイマーの発火予定時刻（`reserved_at + ttl`）
    pub expires_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        member_id: MemberId,
        generation: ReservationGeneration,
        reserved_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            member_id,
            generation,
            reserved_at,
            expires_at: expiry_deadline(reserved_at, ttl),
        }
    }

    /// 指定した会員の予約か
    pub fn is_held_by(&self, member_id: MemberId) -> bool {
        self.member_id == member_id
    }
}

/// 表現できない期間は上限時刻に丸める
fn expiry_deadline(reserved_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|ttl| reserved_at.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_at_is_reserved_at_plus_ttl() {
        let reserved_at = Utc::now();
        let reservation = Reservation::new(
            MemberId::new(1),
            ReservationGeneration::first(),
            reserved_at,
            Duration::from_secs(5),
        );
        assert_eq!(reservation.expires_at - reserved_at, TimeDelta::seconds(5));
        assert!(reservation.is_held_by(MemberId::new(1)));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let reservation = Reservation::new(
            MemberId::new(1),
            ReservationGeneration::first(),
            Utc::now(),
            Duration::MAX,
        );
        assert_eq!(reservation.expires_at, DateTime::<Utc>::MAX_UTC);
    }
}
