use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::pipeline::{
    ApiRequest, Dispatcher, RawResponse, ReqwestTransport, SessionEvents, TracingEvents, Transport,
};
use crate::session::Session;
use automl_types::models::{SignupRequest, TokenResponse};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

/// Client for the AutoML backend.
///
/// Holds the shared [`Session`] and a [`Dispatcher`] built for the session's
/// current token. Whenever the token changes (login, logout, rejection by the
/// server) the next call builds a fresh dispatcher instead of mutating the old
/// one, so a dispatcher never sends a token other than the one it was built with.
pub struct AutoMlClient {
    config: ClientConfig,
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
    events: Arc<dyn SessionEvents>,
    dispatcher: RwLock<Arc<Dispatcher>>,
}

impl AutoMlClient {
    /// Client over `reqwest` that reports events to the log.
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Result<Self, ClientError> {
        let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
        Ok(Self::with_parts(config, session, transport, Arc::new(TracingEvents)))
    }

    /// Client with an explicit transport and events sink.
    pub fn with_parts(
        config: ClientConfig,
        session: Arc<Session>,
        transport: Arc<dyn Transport>,
        events: Arc<dyn SessionEvents>,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(
            config.base_url.clone(),
            Arc::clone(&transport),
            Arc::clone(&session),
            Arc::clone(&events),
        ));
        Self { config, session, transport, events, dispatcher: RwLock::new(dispatcher) }
    }

    /// Replaces the events sink.
    pub fn with_events(self, events: Arc<dyn SessionEvents>) -> Self {
        Self::with_parts(self.config, self.session, self.transport, events)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Dispatcher for the session's current token, rebuilt if the token changed.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        let generation = self.session.generation();
        {
            let current = self.dispatcher.read();
            if current.generation() == generation {
                return Arc::clone(&current);
            }
        }

        let fresh = Arc::new(Dispatcher::new(
            self.config.base_url.clone(),
            Arc::clone(&self.transport),
            Arc::clone(&self.session),
            Arc::clone(&self.events),
        ));
        debug!("Rebuilt dispatcher for session generation {}", fresh.generation());
        *self.dispatcher.write() = Arc::clone(&fresh);
        fresh
    }

    /// Sends `request` through the session pipeline.
    pub async fn send(&self, request: ApiRequest) -> Result<RawResponse, ClientError> {
        self.dispatcher().dispatch(request).await
    }

    /// Sends `request` and decodes the JSON response.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        self.send(request).await?.json()
    }

    /// Authenticates with form-encoded credentials and stores the token.
    ///
    /// The request carries no bearer header and is not retried; failures are
    /// returned without notices or session changes.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<(), ClientError> {
        let request = ApiRequest::post("/login")
            .form([("username", identifier), ("password", secret)])
            .bare();
        let token: TokenResponse = self.send_json(request).await?;

        self.session.set_token(token.access_token)?;
        info!("Logged in as {}", identifier);
        Ok(())
    }

    /// Registers an account, then logs in with the same credentials.
    pub async fn signup(&self, email: &str, identifier: &str, secret: &str) -> Result<(), ClientError> {
        let body = SignupRequest {
            email: email.to_string(),
            username: identifier.to_string(),
            password: secret.to_string(),
        };
        self.send(ApiRequest::post("/signup").json(&body)?.bare()).await?;
        info!("Registered account {}", identifier);

        self.login(identifier, secret).await
    }

    /// Client-side logout; no request is made.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.clear()?;
        info!("Logged out");
        Ok(())
    }
}
