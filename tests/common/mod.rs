use budgetwise_core::ServiceContext;
use tempfile::TempDir;

/// Builds a service graph over a throwaway SQLite database. The TempDir must
/// stay alive for the duration of the test. Call from inside a Tokio runtime.
pub fn test_context() -> (TempDir, ServiceContext) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir for test database");
    let ctx = ServiceContext::new(dir.path().to_str().unwrap())
        .expect("Failed to initialize test database");
    (dir, ctx)
}
