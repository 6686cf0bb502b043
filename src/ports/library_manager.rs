use crate::application::lending::Result;
use crate::domain::{Book, BookId, Member, MemberId};
use async_trait::async_trait;

/// 貸出管理ポート
///
/// 貸出・返却・予約・一覧の操作を抽象化する。
/// コンソールや予約ワーカーはこのトレイト越しに操作するため、
/// テストではカタログを持たないテストダブルに差し替えられる。
///
/// 返される書籍・会員はすべてコピーであり、内部状態への参照ではない。
#[async_trait]
pub trait LibraryManager: Send + Sync {
    /// 書籍を登録する（同じIDは上書き）
    async fn add_book(&self, book: Book);

    /// 書籍を削除する
    ///
    /// 存在しない場合もエラーにしない。
    async fn remove_book(&self, book_id: BookId);

    /// 会員を登録する（同じIDは上書き）
    async fn add_member(&self, member: Member);

    /// 書籍を借りる
    ///
    /// ビジネスルール: 予約中の書籍は予約者本人のみ借りられる。
    async fn borrow_book(&self, book_id: BookId, member_id: MemberId) -> Result<()>;

    /// 書籍を返却する
    ///
    /// 借りていない書籍の返却は何もせず成功する。
    async fn return_book(&self, book_id: BookId, member_id: MemberId) -> Result<()>;

    /// 書籍を予約する
    ///
    /// 予約は一定時間内に借りられなければ自動的に取り消される。
    async fn reserve_book(&self, book_id: BookId, member_id: MemberId) -> Result<()>;

    /// 貸出可能な書籍の一覧
    async fn list_available_books(&self) -> Vec<Book>;

    /// 会員が借りている書籍の一覧（会員が存在しなければ空）
    async fn list_borrowed_books(&self, member_id: MemberId) -> Vec<Book>;
}
