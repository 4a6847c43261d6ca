//! Secret Manager operations

use super::{version_path, KeyVerifier, SecretsApi, ServiceAccountKey};
use crate::config::mask;
use crate::resource::{require, OpError, OpResult, ProjectContext, ResourceRef};
use crate::ui::console::MENU_WIDTH;
use crate::ui::{Console, ErrorReport};
use std::io::Write;

/// Fetch a secret version as UTF-8 text. Only a masked preview is printed.
pub async fn access_secret<W: Write>(
    api: &dyn SecretsApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    secret: &str,
    version: &str,
) -> OpResult<String> {
    let secret = require(console, "Secret name", secret)?;
    let version = require(console, "Secret version", version)?;
    let path = version_path(ctx, secret, version);

    console.line(format!("📥 Fetching secret from Secret Manager: {}", path));

    let payload = match api.access_secret_version(&path).await {
        Ok(payload) => payload,
        Err(e) => {
            ErrorReport::new("accessing secret")
                .permission("secretmanager.versions.access")
                .not_found("Secret", secret)
                .render(console, &e);
            return Err(e.into());
        }
    };

    let text = String::from_utf8(payload).map_err(|_| {
        let error = OpError::Local(format!("Secret '{}' is not valid UTF-8", secret));
        console.failure(&error);
        error
    })?;

    tracing::info!(secret = %path, bytes = text.len(), "Secret accessed");
    console.success("Successfully retrieved secret from Secret Manager");
    console.line(format!("Value: {} ({} bytes)", mask(&text), text.len()));
    Ok(text)
}

/// Fetch a service account key from a secret and prove it works by reading
/// the project with it. Returns whether the whole check passed.
pub async fn check_service_account<W: Write>(
    secrets: &dyn SecretsApi,
    verifier: &dyn KeyVerifier,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    secret: &str,
) -> bool {
    console.banner("🔐 Service Account Key Test (from Secret Manager)", MENU_WIDTH);

    let key_json = match fetch_key(secrets, ctx, console, secret).await {
        Ok(key_json) => key_json,
        Err(e) => {
            tracing::error!(error = %e, "Could not load service account key");
            console.failure(format!("Error: {}", e));
            console.line("Make sure:");
            console.line("  1. You're authenticated: gcloud auth application-default login");
            console.line("  2. Secret Manager API is enabled");
            console.line("  3. Your user has permission to read secrets");
            return false;
        }
    };

    console.notice("🧪 Testing credentials by reading the project...");
    let project = ResourceRef::project(ctx.project_id());
    let passed = match verifier.verify_key(&key_json, &project).await {
        Ok(found) => {
            tracing::info!(project = %found.project_id, "Service account key verified");
            console.success("Credentials are valid! Successfully authenticated.");
            console.line(format!("📊 Service account can read project {}", found.project_id));
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "Service account key rejected");
            console.failure(format!("Credential test failed: {}", e));
            console.line("This might mean:");
            console.line("  - The service account doesn't have necessary permissions");
            console.line("  - The key is invalid or expired");
            false
        }
    };

    if passed {
        console.banner("✅ Test Complete!", MENU_WIDTH);
    }
    passed
}

async fn fetch_key<W: Write>(
    secrets: &dyn SecretsApi,
    ctx: &ProjectContext,
    console: &mut Console<W>,
    secret: &str,
) -> OpResult<String> {
    let secret = crate::resource::required("Secret name", secret)?;
    let path = version_path(ctx, secret, super::LATEST_VERSION);
    console.line(format!("📥 Fetching secret from Secret Manager: {}", path));

    let payload = secrets.access_secret_version(&path).await?;
    let key_json = String::from_utf8(payload)
        .map_err(|_| OpError::Local("Secret payload is not valid UTF-8".into()))?;
    let key: ServiceAccountKey = serde_json::from_str(&key_json)
        .map_err(|e| OpError::Local(format!("Secret is not a service account key: {}", e)))?;

    console.success("Successfully retrieved secret from Secret Manager");
    console.line(format!("🔑 Service Account: {}", key.client_email));
    console.line(format!("🆔 Private Key ID: {}", key.private_key_id));
    Ok(key_json)
}
