use crate::state::State;
use crate::sync::SyncEventReceiver;
use log::*;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Apply sync notifications to the state in delivery order until every
/// sender is gone.
///
pub async fn forward(mut events: SyncEventReceiver, state: Arc<Mutex<State>>) {
    while let Some(event) = events.recv().await {
        state.lock().await.apply_sync_event(event);
    }
    debug!("Sync event channel closed.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;
    use crate::sync::{SyncEvent, SyncStatus};
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn applies_events_until_closed() {
        let state = Arc::new(Mutex::new(State::default()));
        let (tx, rx) = unbounded_channel();
        tx.send(SyncEvent::Status {
            key: "b1".to_string(),
            status: SyncStatus::Saving,
        })
        .unwrap();
        tx.send(SyncEvent::Query {
            kind: ItemKind::Note,
            documents: vec![],
        })
        .unwrap();
        tx.send(SyncEvent::Status {
            key: "b1".to_string(),
            status: SyncStatus::Saved,
        })
        .unwrap();
        drop(tx);

        forward(rx, Arc::clone(&state)).await;
        assert_eq!(state.lock().await.sync_status("b1"), Some(SyncStatus::Saved));
    }
}
