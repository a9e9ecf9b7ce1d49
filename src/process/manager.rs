//! Session Manager
//!
//! Keeps one interpreter session per language, creates sessions on first use,
//! and replaces sessions whose process died.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::session::{InterpreterSession, ProcessKiller};
use super::streams::SharedTranscript;
use super::turn::ExecutionTurn;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::languages::adapter_for;
use crate::models::{CodeRequest, Language};

/// A live session plus the handles that stay usable while a turn holds it
#[derive(Clone)]
struct SessionSlot {
    session: Arc<Mutex<InterpreterSession>>,
    killer: ProcessKiller,
    transcript: SharedTranscript,
}

impl SessionSlot {
    fn new(session: InterpreterSession) -> Self {
        Self {
            killer: session.kill_handle(),
            transcript: session.shared_transcript(),
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Stop the process, killing it out of band if a turn holds the session
    async fn stop(self) -> Result<()> {
        match self.session.try_lock_owned() {
            Ok(mut session) => session.terminate().await,
            Err(_) => self.killer.kill().await,
        }
    }
}

/// Per-language registry of persistent interpreter sessions
pub struct SessionManager {
    config: Arc<Config>,
    sessions: Arc<RwLock<HashMap<Language, SessionSlot>>>,
}

impl SessionManager {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Submit code to the session of its language.
    ///
    /// Fails with `ExecutionInProgress` while another turn holds that
    /// session, and with `InstrumentationFailed` before anything is written
    /// when the code cannot be instrumented.
    pub async fn execute(&self, request: CodeRequest) -> Result<ExecutionTurn> {
        let language = request.language;

        // A session found dead on lock gets replaced once
        for _ in 0..2 {
            let slot = self.slot_for(language).await?;
            let mut session = slot.session.clone().try_lock_owned().map_err(|_| {
                Error::ExecutionInProgress {
                    language: language.to_string(),
                }
            })?;

            if !session.is_alive() {
                info!("{} session is gone, starting a new one", language);
                drop(session);
                self.discard_slot(language, &slot).await;
                continue;
            }

            return ExecutionTurn::begin(session, &request.code);
        }

        Err(Error::SessionTerminated {
            language: language.to_string(),
        })
    }

    /// Terminate the session of a language; the next submission starts a new one
    pub async fn reset(&self, language: Language) -> Result<()> {
        let slot = self.sessions.write().await.remove(&language);
        match slot {
            Some(slot) => {
                info!("Resetting {} session", language);
                slot.stop().await
            }
            None => Ok(()),
        }
    }

    /// Terminate every session
    pub async fn shutdown(&self) -> Result<()> {
        let slots: Vec<(Language, SessionSlot)> = self.sessions.write().await.drain().collect();
        let mut first_error = None;

        for (language, slot) in slots {
            if let Err(e) = slot.stop().await {
                warn!("Failed to stop {} session: {}", language, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Start the sessions configured as eager; returns the languages that
    /// came up. Failures are logged and skipped.
    pub async fn start_eager(&self) -> Vec<Language> {
        let mut started = Vec::new();
        for language in self.config.eager_languages() {
            match self.slot_for(language).await {
                Ok(_) => started.push(language),
                Err(e) => warn!("Could not start {} session eagerly: {}", language, e),
            }
        }
        started
    }

    /// Languages with a live session, in canonical order
    pub async fn active_languages(&self) -> Vec<Language> {
        let sessions = self.sessions.read().await;
        Language::ALL
            .into_iter()
            .filter(|language| {
                sessions
                    .get(language)
                    .is_some_and(|slot| slot.killer.is_alive())
            })
            .collect()
    }

    /// Transcript of a language's session, readable during a turn
    pub async fn transcript(&self, language: Language) -> Option<String> {
        let sessions = self.sessions.read().await;
        let slot = sessions.get(&language)?;
        let transcript = slot.transcript.lock().ok()?;
        Some(transcript.as_str().to_string())
    }

    /// Kill handle for a language's session
    pub async fn killer(&self, language: Language) -> Option<ProcessKiller> {
        self.sessions
            .read()
            .await
            .get(&language)
            .map(|slot| slot.killer.clone())
    }

    /// Existing usable slot, or a freshly started one
    async fn slot_for(&self, language: Language) -> Result<SessionSlot> {
        if let Some(slot) = self.sessions.read().await.get(&language) {
            if slot.killer.is_alive() {
                return Ok(slot.clone());
            }
        }

        let mut sessions = self.sessions.write().await;
        // Another caller may have replaced it in the meantime
        if let Some(slot) = sessions.get(&language) {
            if slot.killer.is_alive() {
                return Ok(slot.clone());
            }
        }

        let adapter = adapter_for(language, &self.config)?;
        let session = InterpreterSession::start(adapter, &self.config.session)?;
        let slot = SessionSlot::new(session);
        sessions.insert(language, slot.clone());
        Ok(slot)
    }

    /// Remove `slot` if it is still the registered one
    async fn discard_slot(&self, language: Language, slot: &SessionSlot) {
        let mut sessions = self.sessions.write().await;
        if sessions
            .get(&language)
            .is_some_and(|current| Arc::ptr_eq(&current.session, &slot.session))
        {
            sessions.remove(&language);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
