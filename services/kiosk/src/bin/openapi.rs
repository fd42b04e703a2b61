//! services/kiosk/src/bin/openapi.rs
//!
//! Writes the OpenAPI document of the kiosk's REST surface (today's records,
//! records by date, recording an action, the roster) to disk, so clients can be
//! generated without starting the server.
//!
//! Usage: `openapi [OUTPUT]`, where `OUTPUT` defaults to `openapi.json`.

use kiosk_lib::web::rest::ApiDoc;
use std::path::{Path, PathBuf};
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn output_path(arg: Option<String>) -> PathBuf {
    arg.map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

fn write_document(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let document = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(path, document)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = output_path(std::env::args().nth(1));
    write_document(&path)?;
    println!("Wrote the kiosk API document to {}", path.display());
    Ok(())
}
