//! attendance-engine HTTP server.
//!
//! Environment:
//! - `ATTENDANCE_SETTINGS`: settings YAML; built-in defaults when unset
//! - `ATTENDANCE_EMPLOYEES`: employee master data YAML; empty when unset
//! - `ATTENDANCE_BIND`: listen address, default `0.0.0.0:8080`
//! - `RUST_LOG`: log filter, default `attendance_engine=info`

use std::sync::Arc;

use attendance_engine::api::{AppState, create_router};
use attendance_engine::collaborators::InMemoryDirectory;
use attendance_engine::config::{SettingsLoader, SettingsStore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attendance_engine=info,audit=info".into()),
        )
        .init();

    let settings = match std::env::var("ATTENDANCE_SETTINGS") {
        Ok(path) => {
            tracing::info!(path = %path, "Loading settings");
            SettingsLoader::load(&path)?
        }
        Err(_) => {
            tracing::info!("ATTENDANCE_SETTINGS not set, using built-in defaults");
            SettingsStore::with_defaults()
        }
    };

    let directory = match std::env::var("ATTENDANCE_EMPLOYEES") {
        Ok(path) => {
            let employees = SettingsLoader::load_employees(&path)?;
            tracing::info!(path = %path, count = employees.len(), "Loaded employees");
            InMemoryDirectory::with_employees(employees)
        }
        Err(_) => InMemoryDirectory::new(),
    };

    let state = AppState::in_memory(Arc::new(settings), Arc::new(directory));
    let app = create_router(state);

    let bind = std::env::var("ATTENDANCE_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("attendance-engine listening on {bind}");

    axum::serve(listener, app).await?;
    Ok(())
}
