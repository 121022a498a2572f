//! Server-sent event stream of timer snapshots and tones

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::{
    services::ToneEvent,
    state::{AppState, TimerState},
};

/// One item pushed to a subscribed client
#[derive(Debug, Clone)]
pub enum Update {
    Timer(TimerState),
    Tone(ToneEvent),
}

impl Update {
    fn into_event(self) -> Event {
        let event = match &self {
            Update::Timer(timer) => Event::default().event("timer").json_data(timer),
            Update::Tone(tone) => Event::default().event("tone").json_data(tone),
        };
        event.unwrap_or_else(|e| {
            warn!("Failed to serialize event: {}", e);
            Event::default().comment("serialization failed")
        })
    }
}

/// Current snapshot followed by every change and every emitted tone
pub fn updates(state: &AppState) -> impl Stream<Item = Update> + Send + 'static {
    let mut timer_rx = state.timer_update_tx.subscribe();
    let tone_rx = state.tone_tx.subscribe();

    let current = timer_rx.borrow_and_update().clone();
    let timers = stream::once(async move { Update::Timer(current) }).chain(stream::unfold(
        timer_rx,
        |mut rx| async move {
            rx.changed().await.ok()?;
            let snapshot = rx.borrow_and_update().clone();
            Some((Update::Timer(snapshot), rx))
        },
    ));

    let tones = stream::unfold(tone_rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(tone) => return Some((Update::Tone(tone), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Event subscriber lagged, skipped {} tones", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    stream::select(timers, tones)
}

/// Handle GET /events - Stream timer snapshots and tones
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Event stream subscriber connected");
    let events = updates(&state).map(|update| Ok(update.into_event()));
    Sse::new(events).keep_alive(KeepAlive::default())
}
