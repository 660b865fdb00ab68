//! Session scope and exit-code mapping shared by both binaries.

use std::future::Future;
use std::process::ExitCode;

use crate::cli::ConnectionArgs;
use crate::reports::Report;
use vsr_vmware::{VmwareError, VmwareErrorKind, VmwareResult, VsphereClient};

/// `-1` as the shell sees it.
pub const EXIT_FAILURE: u8 = 255;

/// Log in, run `report`, and log out again whether the report succeeded,
/// failed, or was cancelled with Ctrl-C.
pub async fn run_in_session<R: Report + ?Sized>(
    client: VsphereClient,
    report: &R,
) -> VmwareResult<String> {
    run_until_shutdown(client, report, ctrl_c()).await
}

/// Resolves on Ctrl-C. If the handler cannot be installed it never resolves,
/// so the run is not mistaken for an interrupted one.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

/// [`run_in_session`] with the interrupt source supplied by the caller.
///
/// A shutdown that fires while logging in lets the login finish, so a session
/// the server has already created is logged out before returning
/// [`VmwareErrorKind::Interrupted`].
pub async fn run_until_shutdown<R, S>(
    mut client: VsphereClient,
    report: &R,
    shutdown: S,
) -> VmwareResult<String>
where
    R: Report + ?Sized,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let interrupted = {
        let login = client.login();
        tokio::pin!(login);
        let interrupted = tokio::select! {
            result = &mut login => {
                result?;
                false
            }
            _ = &mut shutdown => true,
        };
        if interrupted {
            login.await?;
        }
        interrupted
    };
    if interrupted {
        tracing::debug!("interrupted while logging in");
        client.logout().await?;
        return Err(VmwareError::interrupted());
    }
    tracing::debug!("session established against {}", client.base_url());

    let outcome = tokio::select! {
        result = report.run(&client) => result,
        _ = &mut shutdown => Err(VmwareError::interrupted()),
    };

    client.logout().await?;
    outcome
}

/// The line printed for a failed run.
pub fn failure_message(err: &VmwareError) -> String {
    match &err.kind {
        VmwareErrorKind::AuthenticationError => {
            "Could not connect to the specified host using specified username and password".to_string()
        }
        VmwareErrorKind::Fault(_) => format!("Caught vmodl fault : {}", err.message),
        _ => format!("Caught exception : {err}"),
    }
}

/// Resolve credentials, run `report` in a session, print the result or the
/// failure line on stdout, and map the outcome to the process exit code.
pub async fn run<R: Report + ?Sized>(conn: &ConnectionArgs, report: &R) -> ExitCode {
    let password = match conn.resolve_password() {
        Ok(p) => p,
        Err(e) => {
            println!("Caught exception : failed to read password: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    let config = conn.to_config(password);

    let outcome = match VsphereClient::new(&config) {
        Ok(client) => run_in_session(client, report).await,
        Err(e) => Err(VmwareError::auth(e.message)),
    };

    match outcome {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!("report failed: {e}");
            println!("{}", failure_message(&e));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
