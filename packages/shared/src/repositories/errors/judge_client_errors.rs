#[derive(Debug)]
pub enum JudgeClientError {
    Unreachable(String),
    Timeout,
    InvalidResponse(String),
}

impl std::fmt::Display for JudgeClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JudgeClientError::Unreachable(msg) => write!(f, "Judge unreachable: {}", msg),
            JudgeClientError::Timeout => write!(f, "Judge timed out"),
            JudgeClientError::InvalidResponse(msg) => {
                write!(f, "Invalid judge response: {}", msg)
            }
        }
    }
}

impl std::error::Error for JudgeClientError {}
