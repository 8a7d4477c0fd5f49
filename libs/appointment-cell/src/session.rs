use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info};

use auth_cell::SignInGuard;
use shared_models::auth::Credential;
use shared_utils::IdentityProvider;

use crate::calendar::{CalendarGrid, MonthAnchor};
use crate::models::{AppointmentRequest, ConfirmedSlot};
use crate::selector::{SelectionError, SelectorView, SlotSelector, SubmitError};
use crate::services::BookingBackend;

type TaskList = Arc<StdMutex<Vec<AbortHandle>>>;

fn track(tasks: &TaskList, handle: AbortHandle) {
    if let Ok(mut tasks) = tasks.lock() {
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }
}

/// One open booking page: a selector plus the background work it started.
///
/// Every task checks `mounted` before touching the selector, and `unmount`
/// aborts whatever is still running.
pub struct BookingSession {
    selector: Arc<Mutex<SlotSelector>>,
    backend: Arc<dyn BookingBackend>,
    identity: Arc<dyn IdentityProvider>,
    guard: Arc<SignInGuard>,
    mounted: Arc<AtomicBool>,
    load: StdMutex<Option<JoinHandle<()>>>,
    tasks: TaskList,
}

impl BookingSession {
    pub fn new(
        selector: SlotSelector,
        backend: Arc<dyn BookingBackend>,
        identity: Arc<dyn IdentityProvider>,
        guard: SignInGuard,
    ) -> Self {
        Self {
            selector: Arc::new(Mutex::new(selector)),
            backend,
            identity,
            guard: Arc::new(guard),
            mounted: Arc::new(AtomicBool::new(false)),
            load: StdMutex::new(None),
            tasks: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Waits for the identity provider, then loads availability once or
    /// sends the user to sign in.
    pub fn mount(&self) {
        if self.mounted.swap(true, Ordering::SeqCst) {
            debug!("Booking page already mounted");
            return;
        }

        let selector = Arc::clone(&self.selector);
        let backend = Arc::clone(&self.backend);
        let identity = Arc::clone(&self.identity);
        let guard = Arc::clone(&self.guard);
        let mounted = Arc::clone(&self.mounted);

        let handle = tokio::spawn(async move {
            let Some(credential) = guard.require_credential(identity.as_ref()).await else {
                selector.lock().await.require_sign_in();
                return;
            };

            let doctor_id = {
                let mut selector = selector.lock().await;
                selector.begin_load();
                selector.doctor_id().to_string()
            };

            let result = backend.load_availability(&doctor_id, &credential).await;

            if mounted.load(Ordering::SeqCst) {
                selector.lock().await.finish_load(result);
            } else {
                debug!("Dropping availability for a closed page");
            }
        });

        track(&self.tasks, handle.abort_handle());
        if let Ok(mut load) = self.load.lock() {
            *load = Some(handle);
        }
    }

    /// Resolves once the load started by `mount` is over, returning the
    /// credential the page runs with.
    pub async fn ready(&self) -> Option<Credential> {
        let handle = self.load.lock().ok().and_then(|mut load| load.take());
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        self.identity.credential()
    }

    pub async fn view(&self) -> SelectorView {
        self.selector.lock().await.view(Instant::now())
    }

    pub async fn render_month(&self, anchor: MonthAnchor) -> CalendarGrid {
        self.selector.lock().await.render_month(anchor)
    }

    pub async fn click_date(&self, date: NaiveDate) -> bool {
        self.selector.lock().await.click_date(date)
    }

    pub async fn select_slot(
        &self,
        date: NaiveDate,
        label: &str,
        reason_for_visit: &str,
    ) -> Result<AppointmentRequest, SelectionError> {
        self.selector.lock().await.select_slot(date, label, reason_for_visit)
    }

    /// Sends the pending request; a second call while one is in flight is refused.
    pub async fn submit(&self) -> Result<JoinHandle<Result<ConfirmedSlot, SubmitError>>, SubmitError> {
        let credential = self.identity.credential().ok_or(SubmitError::SignedOut)?;
        let (request, doctor_id) = {
            let mut selector = self.selector.lock().await;
            let request = selector.begin_submit()?;
            (request, selector.doctor_id().to_string())
        };

        let selector = Arc::clone(&self.selector);
        let backend = Arc::clone(&self.backend);
        let mounted = Arc::clone(&self.mounted);
        let tasks = Arc::clone(&self.tasks);

        let handle = tokio::spawn(async move {
            let result = backend.create_appointment(&doctor_id, &request, &credential).await;

            if !mounted.load(Ordering::SeqCst) {
                debug!("Dropping booking result for a closed page");
                return Err(SubmitError::Cancelled);
            }

            let (outcome, ttl) = {
                let mut selector = selector.lock().await;
                let outcome = selector.finish_submit(&request, result, Instant::now());
                (outcome, selector.confirmation_ttl())
            };

            if outcome.is_ok() {
                let dismiss = tokio::spawn(async move {
                    tokio::time::sleep(ttl).await;
                    if mounted.load(Ordering::SeqCst) {
                        selector.lock().await.dismiss_expired_confirmation(Instant::now());
                    }
                });
                track(&tasks, dismiss.abort_handle());
            }
            outcome
        });

        track(&self.tasks, handle.abort_handle());
        Ok(handle)
    }

    /// Selects a slot and submits it straight away, as clicking a slot does.
    pub async fn book(
        &self,
        date: NaiveDate,
        label: &str,
        reason_for_visit: &str,
    ) -> Result<ConfirmedSlot, SubmitError> {
        self.select_slot(date, label, reason_for_visit).await?;
        let handle = self.submit().await?;
        handle.await.unwrap_or(Err(SubmitError::Cancelled))
    }

    /// Closes the page and cancels outstanding work.
    pub fn unmount(&self) {
        if !self.mounted.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut tasks) = self.tasks.lock() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
        info!("Booking page closed");
    }
}

impl Drop for BookingSession {
    fn drop(&mut self) {
        self.unmount();
    }
}
