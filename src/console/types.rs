use std::str::FromStr;

/// メニュー項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddBook,
    RemoveBook,
    BorrowBook,
    ReturnBook,
    ListAvailableBooks,
    ListBorrowedBooks,
    ReserveSync,
    ReserveAsync,
    SimulateConcurrentReservations,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 10] = [
        MenuChoice::AddBook,
        MenuChoice::RemoveBook,
        MenuChoice::BorrowBook,
        MenuChoice::ReturnBook,
        MenuChoice::ListAvailableBooks,
        MenuChoice::ListBorrowedBooks,
        MenuChoice::ReserveSync,
        MenuChoice::ReserveAsync,
        MenuChoice::SimulateConcurrentReservations,
        MenuChoice::Exit,
    ];

    /// メニュー番号（1始まり）
    pub fn number(&self) -> usize {
        Self::ALL
            .iter()
            .position(|c| c == self)
            .map_or(0, |i| i + 1)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::AddBook => "Add Book",
            MenuChoice::RemoveBook => "Remove Book",
            MenuChoice::BorrowBook => "Borrow Book",
            MenuChoice::ReturnBook => "Return Book",
            MenuChoice::ListAvailableBooks => "List Available Books",
            MenuChoice::ListBorrowedBooks => "List Borrowed Books",
            MenuChoice::ReserveSync => "Reserve Book (sync)",
            MenuChoice::ReserveAsync => "Reserve Book (async)",
            MenuChoice::SimulateConcurrentReservations => "Simulate concurrent reservations",
            MenuChoice::Exit => "Exit",
        }
    }
}

impl FromStr for MenuChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| format!("Invalid choice: {}", s.trim()))
    }
}
