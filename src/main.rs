//! SB PoL Verifier
//!
//! Verifies a user's liabilities against a published audit, both read from
//! local JSON files.
//!
//! ```text
//! sb-pol-verify <credential> <audit-root.json> <user-liabilities.json>
//! ```

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sb_pol::{AuditRoot, UserLiabilities, Verifier, VerifierConfig, VERSION};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [credential, audit_path, user_path] = args.as_slice() else {
        bail!("usage: sb-pol-verify <credential> <audit-root.json> <user-liabilities.json>");
    };

    info!("SB PoL Verifier v{}", VERSION);

    let config = VerifierConfig::from_env().context("reading configuration")?;
    let audit: AuditRoot = read_json(Path::new(audit_path))?;
    let user: UserLiabilities = read_json(Path::new(user_path))?;

    info!(
        "Audit {}: {} partitions, {} liabilities for user {}",
        audit.audit_id(),
        audit.partitions().len(),
        user.liabilities.len(),
        user.user_id
    );

    let verifier = Verifier::new(config);
    let (valid, totals) = verifier.validate_user_liabilities(credential, &audit, &user);

    match totals {
        Some(totals) if valid => {
            info!("=== Verified Liabilities ===");
            for (currency, amount) in &totals {
                info!("{}: {}", currency, config.format_amount(amount));
            }
            Ok(true)
        }
        _ => {
            error!("Liabilities could not be verified against audit {}", audit.audit_id());
            Ok(false)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
