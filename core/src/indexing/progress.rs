use serde::{Deserialize, Serialize};

/// State machine for one project's indexing run (§4.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexProgress {
    Idle,
    Indexing {
        files_total: usize,
        files_done: usize,
        chunks_indexed: usize,
    },
    Completed {
        files_indexed: usize,
        chunks_indexed: usize,
        files_deleted: usize,
    },
    Error {
        message: String,
    },
}

impl IndexProgress {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, IndexProgress::Indexing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_indexing_state_is_active() {
        assert!(!IndexProgress::Idle.is_active());
        assert!(IndexProgress::Indexing {
            files_total: 10,
            files_done: 1,
            chunks_indexed: 4,
        }
        .is_active());
        assert!(!IndexProgress::Completed {
            files_indexed: 10,
            chunks_indexed: 40,
            files_deleted: 0,
        }
        .is_active());
    }
}
