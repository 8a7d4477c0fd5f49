use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_models::auth::{Credential, SIGN_IN_ROUTE};
use shared_utils::IdentityProvider;

/// Moves the user to another page.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, route: &str);
}

#[derive(Default)]
struct NavigatorState {
    pending: RwLock<Option<String>>,
    navigations: AtomicUsize,
}

/// Records the route the browser should move to; the browser picks it up
/// from the session status endpoint.
#[derive(Clone, Default)]
pub struct PortalNavigator {
    state: Arc<NavigatorState>,
}

impl PortalNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_route(&self) -> Option<String> {
        self.state.pending.read().ok().and_then(|route| route.clone())
    }

    pub fn clear(&self) {
        if let Ok(mut route) = self.state.pending.write() {
            *route = None;
        }
    }

    /// Total navigations requested since startup.
    pub fn navigation_count(&self) -> usize {
        self.state.navigations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Navigator for PortalNavigator {
    async fn navigate(&self, route: &str) {
        info!("Navigating to {}", route);
        if let Ok(mut pending) = self.state.pending.write() {
            *pending = Some(route.to_string());
        }
        self.state.navigations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sends a signed-out user to the sign-in page after a short delay.
///
/// Each guard navigates at most once, however many times it is triggered.
pub struct SignInGuard {
    navigator: Arc<dyn Navigator>,
    delay: Duration,
    fired: AtomicBool,
}

impl SignInGuard {
    pub fn new(navigator: Arc<dyn Navigator>, delay: Duration) -> Self {
        Self {
            navigator,
            delay,
            fired: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &AppConfig, navigator: Arc<dyn Navigator>) -> Self {
        Self::new(navigator, config.sign_in_redirect_delay())
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Schedules the navigation. Returns `None` when it was already scheduled.
    pub fn redirect(&self) -> Option<JoinHandle<()>> {
        if self.fired.swap(true, Ordering::SeqCst) {
            debug!("Sign-in redirect already scheduled");
            return None;
        }

        info!("Not signed in, redirecting to {} in {:?}", SIGN_IN_ROUTE, self.delay);
        let navigator = Arc::clone(&self.navigator);
        let delay = self.delay;
        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(SIGN_IN_ROUTE).await;
        }))
    }

    /// Waits for the identity provider, then returns its credential or
    /// schedules the redirect.
    pub async fn require_credential(&self, identity: &dyn IdentityProvider) -> Option<Credential> {
        if identity.is_initializing() {
            identity.wait_initialized().await;
        }

        let credential = identity.credential();
        if credential.is_none() {
            self.redirect();
        }
        credential
    }
}
