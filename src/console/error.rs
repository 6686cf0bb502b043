use thiserror::Error;

/// コンソール層のエラー
///
/// 貸出のエラーは画面に表示して処理を続けるため、ここには含めない。
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// 数値として解釈できない入力（メニューに戻る）
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    /// UTF-8として解釈できない入力行（メニューに戻る）
    #[error("Invalid input")]
    InvalidInput,

    /// 入力の終端（コンソールを終了する）
    #[error("Input closed")]
    InputClosed,

    /// 入出力エラー
    #[error("Console I/O error")]
    Io(#[from] std::io::Error),
}
