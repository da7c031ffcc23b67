use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Empty task description")]
    EmptyDescription,

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CoreError::UnknownDomain("fullstack".to_string());
        assert!(error.to_string().contains("fullstack"));
    }
}
