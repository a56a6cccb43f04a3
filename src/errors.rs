use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid argument: {message}")]
    InvalidArgument {
        message: String,
    },

    #[error("invalid range: end {end} before start {start}")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("validation failed for record {record_id}: {message}")]
    Validation {
        record_id: Uuid,
        message: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound {
        entity: &'static str,
        id: Uuid,
    },

    #[error("conflict on {entity}: {message}")]
    Conflict {
        entity: &'static str,
        message: String,
    },

    #[error("backend query failed: {message}")]
    Backend {
        message: String,
    },

    #[error("access denied for tenant {tenant_id}")]
    PermissionDenied {
        tenant_id: Uuid,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
