//! The session state machine for the admin console.
//!
//! One `SessionManager` owns the credential lifecycle: recovering a session
//! from the token store at startup, exchanging credentials at login, keeping
//! the access token fresh in the background, and tearing everything down at
//! logout. Consumers read the current identity through [`SessionSnapshot`]
//! and mutate it only through the operations here, so the store and the
//! in-memory state never disagree about whether a credential pair exists.
//!
//! The manager is `Clone` (Arc-backed) and meant to be constructed once and
//! handed to whatever serves requests or renders views; there is no global
//! singleton.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{AuthClient, AuthError};
use crate::config::Config;
use crate::models::{User, UserUpdate};

use super::bypass::BypassProfile;
use super::scheduler::{renewal_interval, RenewalScheduler};
use super::store::TokenStore;

/// Credential state of an authenticated session.
///
/// Bypass sessions run entirely off fixed local identities and never touch
/// the backend; backed sessions hold a real token pair and are the only ones
/// the renewal timer works on. Classifying once here replaces scattered
/// string comparisons against the reserved token values.
#[derive(Debug, Clone)]
pub enum SessionTokens {
    Bypass(BypassProfile),
    Backed {
        access_token: String,
        refresh_token: String,
    },
}

impl SessionTokens {
    /// Classify a stored pair: reserved access-token values resolve to the
    /// corresponding bypass profile, anything else is a backed session.
    fn from_stored(access_token: String, refresh_token: String) -> Self {
        match BypassProfile::from_access_token(&access_token) {
            Some(profile) => SessionTokens::Bypass(profile),
            None => SessionTokens::Backed {
                access_token,
                refresh_token,
            },
        }
    }

    pub fn access_token(&self) -> &str {
        match self {
            SessionTokens::Bypass(profile) => profile.access_token(),
            SessionTokens::Backed { access_token, .. } => access_token,
        }
    }

    fn backed_refresh_token(&self) -> Option<&str> {
        match self {
            SessionTokens::Bypass(_) => None,
            SessionTokens::Backed { refresh_token, .. } => Some(refresh_token),
        }
    }

    fn is_bypass(&self) -> bool {
        matches!(self, SessionTokens::Bypass(_))
    }
}

/// In-memory session fields, guarded by the state mutex.
#[derive(Debug)]
struct SessionState {
    user: Option<User>,
    tokens: Option<SessionTokens>,
    is_loading: bool,
}

/// Read-only projection handed to consumers.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

struct SessionInner {
    client: AuthClient,
    store: TokenStore,
    state: Mutex<SessionState>,
    scheduler: StdMutex<RenewalScheduler>,
    /// Bumped on every login and logout. A renewal records the epoch before
    /// its network call and writes nothing if it changed underneath - a
    /// refresh resolving after logout must not resurrect cleared state.
    epoch: AtomicU64,
    initialized: AtomicBool,
}

#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl SessionManager {
    /// A fresh session is unauthenticated and loading until `initialize`
    /// settles it.
    pub fn new(client: AuthClient, store: TokenStore) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                client,
                store,
                state: Mutex::new(SessionState {
                    user: None,
                    tokens: None,
                    is_loading: true,
                }),
                scheduler: StdMutex::new(RenewalScheduler::default()),
                epoch: AtomicU64::new(0),
                initialized: AtomicBool::new(false),
            }),
        }
    }

    /// Build from configuration: client against the configured backend,
    /// token store in the default directory.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = AuthClient::new(config.base_url(), config.request_timeout())?;
        let store = TokenStore::open_default()?;
        Ok(Self::new(client, store))
    }

    // =========================================================================
    // Session operations
    // =========================================================================

    /// Recover a session from the token store.
    ///
    /// Runs at most once per process; later calls are no-ops. Backend
    /// failures never surface here - every path settles into either a live
    /// session or a clean anonymous state with the store cleared.
    pub async fn initialize(&self) {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            debug!("session already initialized");
            return;
        }

        let stored = match self.inner.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "token store unreadable, starting anonymous");
                None
            }
        };

        let Some(stored) = stored else {
            debug!("no stored tokens, starting anonymous");
            self.settle(None, None).await;
            return;
        };

        match SessionTokens::from_stored(stored.access_token, stored.refresh_token) {
            SessionTokens::Bypass(profile) => {
                info!(email = profile.email(), "restored bypass session");
                self.settle(Some(profile.identity()), Some(SessionTokens::Bypass(profile)))
                    .await;
            }
            SessionTokens::Backed {
                access_token,
                refresh_token,
            } => {
                if !self.inner.client.verify(&access_token).await {
                    info!("stored access token rejected, starting anonymous");
                    self.clear_store();
                    self.settle(None, None).await;
                    return;
                }

                match self.inner.client.fetch_profile(&access_token).await {
                    Ok(user) => {
                        info!(email = user.email.as_str(), "session restored from stored tokens");
                        self.settle(
                            Some(user),
                            Some(SessionTokens::Backed {
                                access_token,
                                refresh_token,
                            }),
                        )
                        .await;
                        self.arm_renewal();
                    }
                    Err(e) => {
                        warn!(error = %e, "profile hydration failed, starting anonymous");
                        self.clear_store();
                        self.settle(None, None).await;
                    }
                }
            }
        }
    }

    /// Authenticate with the backend, or locally for a reserved demo pair.
    ///
    /// A login that fails at any step leaves both the store and the session
    /// exactly as they were.
    pub async fn login(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        if let Some(profile) = BypassProfile::from_credentials(email, password) {
            info!(email, "bypass login");
            self.save_tokens(profile.access_token(), profile.refresh_token());
            self.install_session(profile.identity(), SessionTokens::Bypass(profile))
                .await;
            return Ok(true);
        }

        let pair = self.inner.client.exchange_credentials(email, password).await?;
        // Hydrate before persisting anything so a half-done login cannot
        // leave tokens behind without an identity.
        let user = self.inner.client.fetch_profile(&pair.access_token).await?;

        info!(email = user.email.as_str(), "login succeeded");
        self.save_tokens(&pair.access_token, &pair.refresh_token);
        self.install_session(
            user,
            SessionTokens::Backed {
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
        )
        .await;
        Ok(true)
    }

    /// Tear the session down: stop the renewal timer, clear the in-memory
    /// fields, wipe the store. Never fails; store errors are logged and
    /// swallowed.
    pub async fn logout(&self) {
        self.disarm_renewal();
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = self.inner.state.lock().await;
            state.user = None;
            state.tokens = None;
        }
        self.clear_store();
        info!("logged out");
    }

    /// Create a new account. The session is untouched; signing in afterwards
    /// is a separate step.
    pub async fn register(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<bool, AuthError> {
        self.inner.client.register(email, full_name, password).await?;
        info!(email, "registration accepted");
        Ok(true)
    }

    /// Apply a partial profile update.
    ///
    /// Backed sessions round-trip through the backend and adopt the identity
    /// it returns; bypass (and anonymous) sessions merge locally and report
    /// success without any backend call.
    pub async fn update_profile(&self, update: &UserUpdate) -> Result<bool, AuthError> {
        let Some(access_token) = self.backed_access_token().await else {
            let mut state = self.inner.state.lock().await;
            if let Some(user) = state.user.as_mut() {
                update.apply_to(user);
            }
            return Ok(true);
        };

        let user = self.inner.client.update_profile(&access_token, update).await?;
        let mut state = self.inner.state.lock().await;
        // Don't resurrect an identity if the session ended mid-request
        if state.tokens.is_some() {
            state.user = Some(user);
        }
        Ok(true)
    }

    /// Change the account password. Bypass sessions accept the change
    /// locally; backed sessions delegate and propagate failures.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<bool, AuthError> {
        let Some(access_token) = self.backed_access_token().await else {
            return Ok(true);
        };

        self.inner
            .client
            .change_password(&access_token, current_password, new_password)
            .await?;
        Ok(true)
    }

    /// Run one renewal pass immediately. A session without a backed refresh
    /// token resolves at once.
    pub async fn refresh_now(&self) {
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        Self::renewal_tick(&self.inner, epoch).await;
    }

    // =========================================================================
    // Read projections
    // =========================================================================

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.lock().await;
        SessionSnapshot {
            user: state.user.clone(),
            is_authenticated: state.user.is_some(),
            is_loading: state.is_loading,
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.inner.state.lock().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.state.lock().await.user.is_some()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.state.lock().await.is_loading
    }

    /// The access token consumers attach to their own API calls.
    pub async fn access_token(&self) -> Option<String> {
        let state = self.inner.state.lock().await;
        state
            .tokens
            .as_ref()
            .map(|tokens| tokens.access_token().to_string())
    }

    /// Whether the background renewal timer is currently live.
    pub fn renewal_armed(&self) -> bool {
        self.inner
            .scheduler
            .lock()
            .expect("renewal scheduler lock poisoned")
            .is_armed()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Write the initialize outcome and end the loading phase.
    async fn settle(&self, user: Option<User>, tokens: Option<SessionTokens>) {
        let mut state = self.inner.state.lock().await;
        state.user = user;
        state.tokens = tokens;
        state.is_loading = false;
    }

    /// Replace the in-memory session after a successful login and restart
    /// the renewal timer when the new session is a backed one.
    async fn install_session(&self, user: User, tokens: SessionTokens) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        let renew = !tokens.is_bypass();
        {
            let mut state = self.inner.state.lock().await;
            state.user = Some(user);
            state.tokens = Some(tokens);
            state.is_loading = false;
        }
        if renew {
            self.arm_renewal();
        } else {
            self.disarm_renewal();
        }
    }

    /// Start the background renewal timer for the current epoch. Any prior
    /// timer is disarmed first; the task holds only a weak reference so an
    /// abandoned manager shuts its timer down.
    fn arm_renewal(&self) {
        let weak = Arc::downgrade(&self.inner);
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(renewal_interval()).await;
                let Some(inner) = weak.upgrade() else { break };
                if !SessionManager::renewal_tick(&inner, epoch).await {
                    break;
                }
            }
        });
        self.inner
            .scheduler
            .lock()
            .expect("renewal scheduler lock poisoned")
            .arm(handle);
    }

    fn disarm_renewal(&self) {
        self.inner
            .scheduler
            .lock()
            .expect("renewal scheduler lock poisoned")
            .disarm();
    }

    /// One pass of the renewal loop. Returns false when the timer should
    /// stop: nothing to renew, the session was replaced mid-flight, or the
    /// refresh was rejected.
    async fn renewal_tick(inner: &Arc<SessionInner>, epoch: u64) -> bool {
        let refresh_token = {
            let state = inner.state.lock().await;
            match state
                .tokens
                .as_ref()
                .and_then(SessionTokens::backed_refresh_token)
            {
                Some(token) => token.to_string(),
                // Bypass and anonymous sessions have nothing to renew
                None => return false,
            }
        };

        match inner.client.refresh(&refresh_token).await {
            Ok(pair) => {
                let mut state = inner.state.lock().await;
                if inner.epoch.load(Ordering::SeqCst) != epoch {
                    debug!("renewal finished for a stale session, dropping");
                    return false;
                }
                debug!("access token renewed");
                // Memory and store are replaced together, under the lock,
                // so a concurrent logout cannot interleave between them
                state.tokens = Some(SessionTokens::Backed {
                    access_token: pair.access_token.clone(),
                    refresh_token: pair.refresh_token.clone(),
                });
                if let Err(e) = inner.store.save(&pair.access_token, &pair.refresh_token) {
                    warn!(error = %e, "failed to persist renewed tokens");
                }
                true
            }
            Err(e) => {
                if inner.epoch.load(Ordering::SeqCst) != epoch {
                    debug!("stale renewal failure, dropping");
                    return false;
                }
                warn!(error = %e, "token renewal failed, ending session");
                Self::terminate_session(inner).await;
                false
            }
        }
    }

    /// Forced logout from the renewal path. Releases the timer handle
    /// without aborting: the caller is the timer task itself, and the
    /// cleanup below must run to completion.
    async fn terminate_session(inner: &Arc<SessionInner>) {
        inner
            .scheduler
            .lock()
            .expect("renewal scheduler lock poisoned")
            .release();
        inner.epoch.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = inner.state.lock().await;
            state.user = None;
            state.tokens = None;
        }
        if let Err(e) = inner.store.clear() {
            warn!(error = %e, "failed to clear token store");
        }
    }

    /// Access token of the current backed session, or `None` for bypass and
    /// anonymous sessions. Snapshotted so network calls run without the
    /// state lock held.
    async fn backed_access_token(&self) -> Option<String> {
        let state = self.inner.state.lock().await;
        match &state.tokens {
            Some(tokens) if !tokens.is_bypass() => Some(tokens.access_token().to_string()),
            _ => None,
        }
    }

    fn save_tokens(&self, access_token: &str, refresh_token: &str) {
        if let Err(e) = self.inner.store.save(access_token, refresh_token) {
            warn!(error = %e, "failed to persist tokens");
        }
    }

    fn clear_store(&self) {
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "failed to clear token store");
        }
    }
}
