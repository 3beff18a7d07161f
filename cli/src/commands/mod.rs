//! Subcommand handlers

mod chat;
mod config;
mod run;
mod servers;

pub use chat::chat;
pub use config::show_config;
pub use run::run;
pub use servers::servers;

use tokio_util::sync::CancellationToken;

/// A token cancelled on Ctrl-C. Cancel it once the turn is over to
/// release the listener.
pub(crate) fn ctrl_c_token() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if signal.is_ok() {
                    child.cancel();
                }
            }
            _ = child.cancelled() => {}
        }
    });
    token
}
