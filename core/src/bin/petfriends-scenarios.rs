use std::process::ExitCode;

use petfriends_core::{PetFriends, ReqwestTransport, Runner, Settings, Summary};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "invalid settings");
            return ExitCode::FAILURE;
        }
    };
    let transport = match ReqwestTransport::new() {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!(error = %e, "cannot create HTTP transport");
            return ExitCode::FAILURE;
        }
    };

    let client = PetFriends::new(&settings.base_url, transport);
    tracing::info!(base_url = client.base_url(), "running scenarios");
    let reports = Runner::new(&client, &settings).run_all();
    let summary = Summary::of(&reports);
    tracing::info!(
        passed = summary.passed,
        known_discrepancies = summary.known_discrepancies,
        failed = summary.failed,
        "done"
    );

    if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
