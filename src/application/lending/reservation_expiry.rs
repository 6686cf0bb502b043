use std::sync::{Mutex, Weak};
use std::time::Duration;

use crate::domain::{BookId, ReservationGeneration};

use super::catalog::{self, CatalogStore};

/// 予約の期限切れタイマーを起動する
///
/// `ttl`経過後にロックを取得し、`generation`の予約がまだ残っていれば取り消す。
/// 予約が既に借りられた、または新しい予約に置き換わった場合は何もしない。
/// 取り消しの手段は公開しない（常に発火し、発火時に有効性を確認する）。
///
/// カタログは弱参照で保持する。`Library`が破棄された後の発火は何もしない。
pub(crate) fn schedule_expiry(
    store: Weak<Mutex<CatalogStore>>,
    book_id: BookId,
    generation: ReservationGeneration,
    ttl: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        expire_reservation(&store, book_id, generation);
    });
}

/// 期限切れ処理の本体（タイマー発火時に呼ばれる）
fn expire_reservation(
    store: &Weak<Mutex<CatalogStore>>,
    book_id: BookId,
    generation: ReservationGeneration,
) {
    let Some(store) = store.upgrade() else {
        tracing::debug!("Catalog dropped before reservation for book {} expired", book_id);
        return;
    };

    let expired = catalog::lock(&store).expire(book_id, generation);
    if expired {
        tracing::info!(
            "Reservation for book {} expired (generation {})",
            book_id,
            generation.value()
        );
    } else {
        tracing::debug!(
            "Expiry for book {} skipped: reservation generation {} no longer active",
            book_id,
            generation.value()
        );
    }
}
