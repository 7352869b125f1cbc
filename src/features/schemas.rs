use serde::{Deserialize, Serialize};

use crate::utilities::errors::AppError;

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug)]
pub struct Pagination {
    #[serde(default = "default_offset")]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: default_offset(),
            limit: default_limit(),
        }
    }
}

fn default_offset() -> i64 {
    0
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.offset < 0 {
            return Err(AppError::ValidationError(
                "Offset must be positive".to_string(),
            ));
        }

        if self.limit < 0 {
            return Err(AppError::ValidationError("Limit must be positive".to_string()));
        } else if self.limit == 0 {
            return Err(AppError::ValidationError(
                "Limit must not be zero!".to_string(),
            ));
        }

        if self.limit > 100 {
            return Err(AppError::ValidationError(
                "Limit cannot exceed 100".to_string(),
            ));
        }

        Ok(())
    }

    pub fn page<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_bounded() {
        assert!(Pagination { offset: 0, limit: 100 }.validate().is_ok());
        assert!(Pagination { offset: 0, limit: 0 }.validate().is_err());
        assert!(Pagination { offset: 0, limit: 101 }.validate().is_err());
        assert!(Pagination { offset: -1, limit: 10 }.validate().is_err());

        match (Pagination { offset: 0, limit: -5 }).validate() {
            Err(AppError::ValidationError(msg)) => assert_eq!(msg, "Limit must be positive"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn page_skips_and_takes() {
        let page = Pagination { offset: 2, limit: 2 }.page(vec![1, 2, 3, 4, 5]);
        assert_eq!(page, vec![3, 4]);
    }
}
