use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::domain::{BookId, MemberId};
use crate::ports::LibraryManager;

use super::errors::{LendingError, Result};

/// 予約リクエスト受付キューの容量
pub const RESERVATION_QUEUE_CAPACITY: usize = 64;

/// ワーカーに送る予約リクエスト
///
/// ちょうど1回だけ処理される。ワーカーは予約を実行し、結果を`resp`で返す。
#[derive(Debug)]
pub struct ReservationRequest {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub resp: oneshot::Sender<Result<()>>,
}

impl ReservationRequest {
    /// リクエストと、結果を受け取るレシーバーを作成する
    pub fn new(book_id: BookId, member_id: MemberId) -> (Self, oneshot::Receiver<Result<()>>) {
        let (resp, rx) = oneshot::channel();
        let request = Self {
            book_id,
            member_id,
            resp,
        };
        (request, rx)
    }
}

/// 予約ワーカーを起動する
///
/// ビジネスルール：
/// - リクエストは到着順に取り出し、1件ごとに別タスクで処理する（完了順は保証しない）
/// - 競合する予約のどちらが勝つかは`Library`のロックが決める
/// - すべての送信側が破棄されるとワーカーは終了する
pub fn start_reservation_worker(
    library: Arc<dyn LibraryManager>,
    mut requests: mpsc::Receiver<ReservationRequest>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Reservation worker started");

        while let Some(request) = requests.recv().await {
            let library = Arc::clone(&library);
            tokio::spawn(async move {
                let ReservationRequest {
                    book_id,
                    member_id,
                    resp,
                } = request;

                let result = library.reserve_book(book_id, member_id).await;
                if resp.send(result).is_err() {
                    tracing::warn!(
                        "Reservation result for book {} (member {}) dropped: caller went away",
                        book_id,
                        member_id
                    );
                }
            });
        }

        tracing::info!("Reservation worker stopped");
    })
}

/// ワーカーに予約を送るためのハンドル（複製可能）
#[derive(Debug, Clone)]
pub struct ReservationClient {
    sender: mpsc::Sender<ReservationRequest>,
}

impl ReservationClient {
    pub fn new(sender: mpsc::Sender<ReservationRequest>) -> Self {
        Self { sender }
    }

    /// キューを作成してワーカーを起動し、そのクライアントを返す
    pub fn spawn(library: Arc<dyn LibraryManager>) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(RESERVATION_QUEUE_CAPACITY);
        let handle = start_reservation_worker(library, receiver);
        (Self::new(sender), handle)
    }

    /// リクエストをキューに入れ、結果のレシーバーを返す
    pub async fn submit(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<oneshot::Receiver<Result<()>>> {
        let (request, rx) = ReservationRequest::new(book_id, member_id);
        self.sender
            .send(request)
            .await
            .map_err(|_| LendingError::WorkerUnavailable)?;
        Ok(rx)
    }

    /// リクエストをキューに入れ、結果を待つ
    pub async fn reserve(&self, book_id: BookId, member_id: MemberId) -> Result<()> {
        let rx = self.submit(book_id, member_id).await?;
        rx.await.map_err(|_| LendingError::WorkerUnavailable)?
    }
}
