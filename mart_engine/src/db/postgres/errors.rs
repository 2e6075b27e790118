//! SQLSTATE-based classification of Postgres failures.
//!
//! The store surfaces every failure identically today; the classification
//! exists so retry wiring can be added without re-deriving which codes are
//! worth retrying, and it is exercised directly by tests.

/// Whether retrying the failed statement can reasonably succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Retriable,
    NonRetriable,
}

/// Classify a sqlx error. Anything that is not a database-reported error
/// (decode failures, pool timeouts handled elsewhere, ...) is non-retriable.
pub fn classify(err: &sqlx::Error) -> ErrorClass {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => classify_sqlstate(&code),
            None => ErrorClass::NonRetriable,
        },
        _ => ErrorClass::NonRetriable,
    }
}

/// Class 08 covers every connection exception; the rest are the transient
/// server-side conditions worth a retry.
fn classify_sqlstate(code: &str) -> ErrorClass {
    if code.starts_with("08") {
        return ErrorClass::Retriable;
    }
    match code {
        // serialization_failure, deadlock_detected
        "40001" | "40P01" => ErrorClass::Retriable,
        // admin_shutdown, crash_shutdown, cannot_connect_now
        "57P01" | "57P02" | "57P03" => ErrorClass::Retriable,
        _ => ErrorClass::NonRetriable,
    }
}
