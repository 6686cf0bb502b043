use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::application::lending::{LendingError, ReservationClient};
use crate::domain::{Book, BookId, MemberId};
use crate::ports::LibraryManager;

use super::{error::ConsoleError, types::MenuChoice};

/// 同時予約デモで使う書籍と会員
const DEMO_BOOK: u32 = 1;
const DEMO_MEMBERS: (u32, u32) = (1, 2);

// ============================================================================
// 状態
// ============================================================================

/// 貸出エンジンのテキストフロントエンド
///
/// 入力の解析と出力の整形はすべてここで行う。
/// エンジンには型付きのIDだけを渡し、結果と`LendingError`を表示する。
pub struct Console<R, W> {
    input: R,
    output: W,
    library: Arc<dyn LibraryManager>,
    reservations: ReservationClient,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        input: R,
        output: W,
        library: Arc<dyn LibraryManager>,
        reservations: ReservationClient,
    ) -> Self {
        Self {
            input,
            output,
            library,
            reservations,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// 「Exit」が選ばれるか入力が終わるまでメニューを繰り返す
    pub async fn run(&mut self) -> Result<(), ConsoleError> {
        loop {
            self.print_menu().await?;

            let line = match self.read_line().await {
                Ok(line) => line,
                Err(ConsoleError::InvalidInput) => {
                    self.say("Invalid input").await?;
                    continue;
                }
                Err(ConsoleError::InputClosed) => return Ok(()),
                Err(e) => return Err(e),
            };

            let choice = match line.parse::<MenuChoice>() {
                Ok(choice) => choice,
                Err(_) => {
                    self.say("Invalid choice").await?;
                    continue;
                }
            };

            if choice == MenuChoice::Exit {
                return Ok(());
            }

            match self.dispatch(choice).await {
                Ok(()) => {}
                Err(ConsoleError::InvalidNumber(raw)) => {
                    self.say(&format!("Invalid number: {}", raw)).await?;
                }
                Err(ConsoleError::InvalidInput) => self.say("Invalid input").await?,
                Err(ConsoleError::InputClosed) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    async fn dispatch(&mut self, choice: MenuChoice) -> Result<(), ConsoleError> {
        match choice {
            MenuChoice::AddBook => self.add_book().await,
            MenuChoice::RemoveBook => self.remove_book().await,
            MenuChoice::BorrowBook => self.borrow_book().await,
            MenuChoice::ReturnBook => self.return_book().await,
            MenuChoice::ListAvailableBooks => self.list_available_books().await,
            MenuChoice::ListBorrowedBooks => self.list_borrowed_books().await,
            MenuChoice::ReserveSync => self.reserve_book().await,
            MenuChoice::ReserveAsync => self.reserve_book_async().await,
            MenuChoice::SimulateConcurrentReservations => {
                self.simulate_concurrent_reservations().await
            }
            MenuChoice::Exit => Ok(()),
        }
    }

    // ========================================================================
    // 各メニューの処理
    // ========================================================================

    async fn add_book(&mut self) -> Result<(), ConsoleError> {
        let id = self.prompt_id("Enter book ID: ").await?;
        let title = self.prompt("Enter book title: ").await?;
        let author = self.prompt("Enter book author: ").await?;

        self.library.add_book(Book::new(id, title, author)).await;
        self.say("Book added successfully.").await
    }

    async fn remove_book(&mut self) -> Result<(), ConsoleError> {
        let id = self.prompt_id("Enter book ID to remove: ").await?;

        self.library.remove_book(BookId::new(id)).await;
        self.say("Book removed successfully.").await
    }

    async fn borrow_book(&mut self) -> Result<(), ConsoleError> {
        let (book_id, member_id) = self.prompt_book_and_member("borrow").await?;

        let result = self.library.borrow_book(book_id, member_id).await;
        self.report(result, "Book borrowed successfully.").await
    }

    async fn return_book(&mut self) -> Result<(), ConsoleError> {
        let (book_id, member_id) = self.prompt_book_and_member("return").await?;

        let result = self.library.return_book(book_id, member_id).await;
        self.report(result, "Book returned successfully.").await
    }

    async fn list_available_books(&mut self) -> Result<(), ConsoleError> {
        let books = self.library.list_available_books().await;
        self.print_books("Available Books:", &books).await
    }

    async fn list_borrowed_books(&mut self) -> Result<(), ConsoleError> {
        let member_id = MemberId::new(self.prompt_id("Enter member ID: ").await?);

        let books = self.library.list_borrowed_books(member_id).await;
        self.print_books("Borrowed Books:", &books).await
    }

    async fn reserve_book(&mut self) -> Result<(), ConsoleError> {
        let (book_id, member_id) = self.prompt_book_and_member("reserve").await?;

        let result = self.library.reserve_book(book_id, member_id).await;
        self.report(result, "Book reserved successfully (sync).").await
    }

    async fn reserve_book_async(&mut self) -> Result<(), ConsoleError> {
        let (book_id, member_id) = self.prompt_book_and_member("reserve").await?;

        let result = self.reservations.reserve(book_id, member_id).await;
        self.report(result, "Book reserved successfully (async).").await
    }

    /// 2人の会員がワーカー経由で同じ書籍を同時に予約する
    async fn simulate_concurrent_reservations(&mut self) -> Result<(), ConsoleError> {
        let book_id = BookId::new(DEMO_BOOK);
        let (member_a, member_b) = (MemberId::new(DEMO_MEMBERS.0), MemberId::new(DEMO_MEMBERS.1));

        let (result_a, result_b) = futures::future::join(
            self.reservations.reserve(book_id, member_a),
            self.reservations.reserve(book_id, member_b),
        )
        .await;

        self.say(&format!(
            "Member {} reservation result: {}",
            member_a,
            describe(&result_a)
        ))
        .await?;
        self.say(&format!(
            "Member {} reservation result: {}",
            member_b,
            describe(&result_b)
        ))
        .await
    }

    // ========================================================================
    // 入出力
    // ========================================================================

    async fn print_menu(&mut self) -> Result<(), ConsoleError> {
        let mut menu = String::from("\nLibrary Management System\n");
        for choice in MenuChoice::ALL {
            menu.push_str(&format!("{}. {}\n", choice.number(), choice.label()));
        }
        menu.push_str("Enter choice: ");
        self.write(&menu).await
    }

    async fn print_books(&mut self, heading: &str, books: &[Book]) -> Result<(), ConsoleError> {
        let mut text = format!("\n{}\n", heading);
        for book in books {
            text.push_str(&format!(
                "ID: {}, Title: {}, Author: {}\n",
                book.id, book.title, book.author
            ));
        }
        self.write(&text).await
    }

    async fn report(
        &mut self,
        result: Result<(), LendingError>,
        success: &str,
    ) -> Result<(), ConsoleError> {
        match result {
            Ok(()) => self.say(success).await,
            Err(e) => self.say(&format!("Error: {}", e)).await,
        }
    }

    async fn prompt_book_and_member(
        &mut self,
        action: &str,
    ) -> Result<(BookId, MemberId), ConsoleError> {
        let book_id = self
            .prompt_id(&format!("Enter book ID to {}: ", action))
            .await?;
        let member_id = self.prompt_id("Enter member ID: ").await?;
        Ok((BookId::new(book_id), MemberId::new(member_id)))
    }

    async fn prompt_id(&mut self, label: &str) -> Result<u32, ConsoleError> {
        let raw = self.prompt(label).await?;
        raw.parse::<u32>().map_err(|_| ConsoleError::InvalidNumber(raw))
    }

    async fn prompt(&mut self, label: &str) -> Result<String, ConsoleError> {
        self.write(label).await?;
        self.read_line().await
    }

    /// 1行読み込む（不正なバイト列の行は読み捨てて`InvalidInput`）
    async fn read_line(&mut self) -> Result<String, ConsoleError> {
        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw).await? == 0 {
            return Err(ConsoleError::InputClosed);
        }
        let line = String::from_utf8(raw).map_err(|_| ConsoleError::InvalidInput)?;
        Ok(line.trim().to_string())
    }

    async fn say(&mut self, line: &str) -> Result<(), ConsoleError> {
        self.write(&format!("{}\n", line)).await
    }

    async fn write(&mut self, text: &str) -> Result<(), ConsoleError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}

fn describe(result: &Result<(), LendingError>) -> String {
    match result {
        Ok(()) => "ok".to_string(),
        Err(e) => e.to_string(),
    }
}
