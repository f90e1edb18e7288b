use serde_json::json;

use crate::app::build_store;
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::services::{AuthorizationChecker, Verification};

/// Same lookup the verification endpoint performs, without the HTTP layer
pub async fn handle(config: &AppConfig, telefone: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let checker = AuthorizationChecker::new(store.clone());

    let result = checker.check_technician(telefone).await;
    store.close().await;
    let verification = result?;

    let details = match &verification {
        Verification::Authorized(tecnico) => json!({ "autorizado": true, "tecnico": tecnico }),
        Verification::Denied => json!({ "autorizado": false }),
    };

    utils::output_message(&output_format, &verification.message(), Some(details))
}
