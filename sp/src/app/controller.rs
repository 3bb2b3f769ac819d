//! Controller - runs reducer effects against the session client

use std::collections::VecDeque;
use std::path::Path;

use tracing::{debug, info, warn};

use super::reducer::{Effect, Event, reduce};
use super::state::{AppState, REFINE_FAILED};
use crate::document;
use crate::prompts::PlanMode;
use crate::session::{PlanningSession, SessionClient};

/// Owns the application state and the single live planning session
pub struct Controller {
    state: AppState,
    session: Option<PlanningSession>,
    client: SessionClient,
}

impl Controller {
    pub fn new(client: SessionClient) -> Self {
        debug!("Controller::new: called");
        Self {
            state: AppState::new(),
            session: None,
            client,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn session(&self) -> Option<&PlanningSession> {
        self.session.as_ref()
    }

    /// Reduce an event, then run its effects until nothing is left to do
    pub async fn dispatch(&mut self, event: Event) {
        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            for effect in reduce(&mut self.state, event) {
                if let Some(follow_up) = self.execute(effect).await {
                    pending.push_back(follow_up);
                }
            }
        }
    }

    pub async fn select_mode(&mut self, mode: PlanMode) {
        self.dispatch(Event::SelectMode(mode)).await;
    }

    pub async fn set_input(&mut self, text: impl Into<String>) {
        self.dispatch(Event::InputChanged(text.into())).await;
    }

    /// Load a document into the input buffer
    ///
    /// Without a declared MIME type one is sniffed from the file contents.
    pub async fn load_file(&mut self, path: &Path, mime: Option<&str>) {
        debug!(?path, ?mime, "load_file: called");
        self.dispatch(Event::FileParsing).await;

        let mime = mime.map(str::to_string).or_else(|| document::sniff_mime(path));
        let event = match document::extract(path, mime.as_deref()).await {
            Ok(text) => {
                info!(?path, chars = text.len(), "Loaded document");
                Event::FileLoaded(text)
            }
            Err(e) => Event::FileFailed(e.to_string()),
        };
        self.dispatch(event).await;
    }

    pub async fn submit(&mut self) {
        self.dispatch(Event::Submit).await;
    }

    pub async fn refine(&mut self, message: impl Into<String>) {
        self.dispatch(Event::Refine(message.into())).await;
    }

    pub async fn reset(&mut self) {
        self.dispatch(Event::Reset).await;
    }

    async fn execute(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::DiscardSession => {
                if let Some(session) = self.session.take() {
                    info!(session = %session.id(), turns = session.turn_count(), "Discarded planning session");
                }
                None
            }
            Effect::StartSession { generation, context } => {
                match self.client.start_session(&context, generation).await {
                    Ok((session, text)) => {
                        if self.state.is_current(generation) {
                            self.session = Some(session);
                        }
                        Some(Event::SessionStarted { generation, text })
                    }
                    Err(e) => {
                        warn!(error = ?e, "start_session failed");
                        Some(Event::SessionFailed {
                            generation,
                            message: e.to_string(),
                        })
                    }
                }
            }
            Effect::ContinueSession { generation, message } => {
                let Some(session) = self.session.as_mut() else {
                    warn!("ContinueSession requested with no live session");
                    return Some(Event::RefineFailed {
                        generation,
                        message: REFINE_FAILED.to_string(),
                    });
                };
                match self.client.continue_session(session, &message).await {
                    Ok(text) => Some(Event::Refined { generation, text }),
                    Err(e) => {
                        warn!(error = ?e, "continue_session failed");
                        Some(Event::RefineFailed {
                            generation,
                            message: REFINE_FAILED.to_string(),
                        })
                    }
                }
            }
        }
    }
}
