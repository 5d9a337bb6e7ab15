//! Data bridge: forwards controller state into the TUI action loop.
//!
//! Subscribes to the product cache and the connection state, then makes
//! the first connection attempt. Every cache replacement (initial load,
//! periodic refresh, re-fetch after a write) arrives as
//! [`Action::ProductsUpdated`]. Retries go through the app, not here.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use finprod_core::{ConnectionState, Controller};

use crate::action::Action;

pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    // Subscribe before connecting so the initial load is not missed
    let mut products = controller.subscribe();
    let mut conn_state = controller.connection_state();

    let _ = action_tx.send(Action::ProductsLoading);
    if let Err(e) = controller.connect().await {
        warn!(error = %e, "initial load failed");
        let _ = action_tx.send(Action::ProductsLoadFailed(e.user_message()));
    }

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(snapshot) = products.changed() => {
                debug!(count = snapshot.len(), "dispatching ProductsUpdated");
                let _ = action_tx.send(Action::ProductsUpdated(snapshot));
            }

            Ok(()) = conn_state.changed() => {
                let state = conn_state.borrow_and_update().clone();
                if let Some(action) = connection_action(&state) {
                    let _ = action_tx.send(action);
                }
            }
        }
    }

    controller.disconnect().await;
    debug!("data bridge shut down");
}

fn connection_action(state: &ConnectionState) -> Option<Action> {
    match state {
        ConnectionState::Connecting => Some(Action::Connecting),
        ConnectionState::Connected => Some(Action::Connected),
        ConnectionState::Failed => Some(Action::Disconnected("sin conexión".into())),
        // Only seen during teardown
        ConnectionState::Disconnected => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_states_map_to_actions() {
        assert!(matches!(
            connection_action(&ConnectionState::Connected),
            Some(Action::Connected)
        ));
        assert!(matches!(
            connection_action(&ConnectionState::Connecting),
            Some(Action::Connecting)
        ));
        assert!(matches!(
            connection_action(&ConnectionState::Failed),
            Some(Action::Disconnected(_))
        ));
        assert!(connection_action(&ConnectionState::Disconnected).is_none());
    }
}
