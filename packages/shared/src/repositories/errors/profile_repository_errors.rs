#[derive(Debug)]
pub enum ProfileRepositoryError {
    NotFound(String),
    Storage(String),
}

impl std::fmt::Display for ProfileRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileRepositoryError::NotFound(user_id) => {
                write!(f, "Profile not found for user: {}", user_id)
            }
            ProfileRepositoryError::Storage(msg) => write!(f, "Profile storage error: {}", msg),
        }
    }
}

impl std::error::Error for ProfileRepositoryError {}
