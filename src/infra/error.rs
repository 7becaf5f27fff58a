use std::fmt;

use thiserror::Error;

/// Start-up step that touched the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseStage {
    Connect,
    Migrate,
}

impl fmt::Display for DatabaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DatabaseStage::Connect => "connect",
            DatabaseStage::Migrate => "migrate",
        })
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("failed to bind the public listener")]
    Listener(#[from] std::io::Error),
    #[error("database {stage} failed")]
    Database {
        stage: DatabaseStage,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to build the object store client for bucket `{bucket}`")]
    ObjectStore {
        bucket: String,
        #[source]
        source: object_store::Error,
    },
    #[error("`{key}` is not configured")]
    MissingSetting { key: &'static str },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

impl InfraError {
    pub fn database(stage: DatabaseStage, source: sqlx::Error) -> Self {
        Self::Database { stage, source }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn database_errors_name_the_stage_and_keep_the_cause() {
        let err = InfraError::database(DatabaseStage::Migrate, sqlx::Error::PoolTimedOut);

        assert_eq!(err.to_string(), "database migrate failed");
        let cause = err.source().expect("sqlx cause");
        assert_eq!(cause.to_string(), sqlx::Error::PoolTimedOut.to_string());
    }

    #[test]
    fn missing_setting_names_the_key() {
        let err = InfraError::MissingSetting { key: "database.url" };
        assert_eq!(err.to_string(), "`database.url` is not configured");
    }
}
