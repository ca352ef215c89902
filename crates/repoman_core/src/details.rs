//! Controller for the database repository connection details form.
//!
//! The hosting screen owns the [`ConnectionRecord`] and lends it to a
//! [`DetailsController`] for as long as the form is shown. The controller
//! fills in labels, gates the finish button, asks a [`DuplicateChecker`]
//! whether the display name is taken, and tells a [`Navigator`] where to go
//! next. Errors meant for the user are handed to the `on_error` callback:
//! `Some(message)` to show one, `None` to clear it.
//!
//! Finishing a new repository moves through `Idle -> Checking -> Success`
//! (or `Duplicate` / `Failed`). Records that already exist (`edit` or
//! `modify`) skip the check. `finish` borrows the controller mutably, so a
//! second finish cannot start while a check is outstanding.

use crate::error::RepoError;
use crate::models::{ConnectionRecord, NavigationTarget, RepositoryType};
use crate::services::messages::keys;
use crate::services::{DuplicateChecker, Localizer, Navigator};

use std::sync::Arc;
use std::time::Duration;

/// Receives user-visible errors; `None` clears the current one.
pub type ErrorCallback<'a> = Box<dyn FnMut(Option<String>) + Send + 'a>;

/// Display strings shown by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailsLabels {
    pub connection_details: String,
    pub display_name: String,
    pub database_connection: String,
    pub description: String,
    pub launch: String,
    pub finish: String,
    pub back: String,
    /// Shown when the display name is already taken.
    pub exists_message: String,
    /// Shown when the duplicate check itself fails.
    pub check_failed_message: String,
}

impl DetailsLabels {
    /// Look up every label.
    pub fn load(localizer: &dyn Localizer) -> Self {
        Self {
            connection_details: localizer.get(keys::CONNECTION_DETAILS),
            display_name: localizer.get(keys::DISPLAY_NAME),
            database_connection: localizer.get(keys::DATABASE_CONNECTION),
            description: localizer.get(keys::DESCRIPTION),
            launch: localizer.get(keys::LAUNCH),
            finish: localizer.get(keys::FINISH),
            back: localizer.get(keys::BACK),
            exists_message: localizer.get(keys::ERROR_EXISTS),
            check_failed_message: localizer.get(keys::ERROR_CHECK),
        }
    }
}

/// Where the finish flow currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FinishState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Waiting on the duplicate check.
    Checking,
    /// Navigated to the loading state.
    Success,
    /// The display name is taken; the form stays put.
    Duplicate,
    /// The duplicate check failed or timed out; the form stays put.
    Failed,
}

impl FinishState {
    /// Check if the form left for the loading state.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Details form controller.
pub struct DetailsController<'a> {
    connection: &'a mut ConnectionRecord,
    on_error: ErrorCallback<'a>,
    localizer: Arc<dyn Localizer>,
    checker: Arc<dyn DuplicateChecker>,
    navigator: Arc<dyn Navigator>,
    labels: DetailsLabels,
    state: FinishState,
    check_timeout: Option<Duration>,
}

impl<'a> DetailsController<'a> {
    /// Create a controller for `connection`.
    ///
    /// Labels stay empty until [`initialize`](Self::initialize) is called.
    pub fn new(
        connection: &'a mut ConnectionRecord,
        localizer: Arc<dyn Localizer>,
        checker: Arc<dyn DuplicateChecker>,
        navigator: Arc<dyn Navigator>,
        on_error: ErrorCallback<'a>,
    ) -> Self {
        Self {
            connection,
            on_error,
            localizer,
            checker,
            navigator,
            labels: DetailsLabels::default(),
            state: FinishState::Idle,
            check_timeout: None,
        }
    }

    /// Give up on the duplicate check after `timeout`.
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = Some(timeout);
        self
    }

    /// Populate the form labels.
    pub fn initialize(&mut self) {
        self.labels = DetailsLabels::load(self.localizer.as_ref());
        tracing::trace!("Details labels loaded");
    }

    pub fn labels(&self) -> &DetailsLabels {
        &self.labels
    }

    /// Where the finish flow stands.
    ///
    /// Stays `Checking` if a `finish` future is dropped mid-check; the next
    /// `finish` starts over.
    pub fn state(&self) -> FinishState {
        self.state
    }

    /// The record being edited.
    pub fn connection(&self) -> &ConnectionRecord {
        &*self.connection
    }

    /// Mutable access for the form's input fields.
    pub fn connection_mut(&mut self) -> &mut ConnectionRecord {
        &mut *self.connection
    }

    /// Whether the finish button is enabled.
    pub fn can_finish(&self) -> bool {
        self.connection.is_complete()
    }

    /// Mark the connection as the default one.
    pub fn set_default_connection(&mut self, is_default: bool) {
        self.connection.is_default = is_default;
    }

    /// Go pick a database connection.
    pub fn select_database(&self) {
        self.navigator.go(&NavigationTarget::DatabaseSelect);
    }

    /// Leave the form without saving.
    pub fn back(&self) {
        let target = if self.connection.edit {
            NavigationTarget::Manager
        } else {
            NavigationTarget::Other { repository_type: RepositoryType::KettleDatabaseRepository }
        };
        self.navigator.go(&target);
    }

    /// Clear any error the form is showing.
    pub fn reset_error_message(&mut self) {
        (self.on_error)(None);
    }

    /// Submit the form.
    ///
    /// Returns the state the flow ended in. Nothing is navigated unless the
    /// result is [`FinishState::Success`].
    pub async fn finish(&mut self) -> FinishState {
        if self.connection.is_existing() {
            tracing::debug!(
                name = %self.connection.display_name,
                "Existing repository, skipping duplicate check"
            );
            self.navigator.go(&NavigationTarget::DatabaseLoading);
            self.state = FinishState::Success;
            return self.state;
        }

        self.state = FinishState::Checking;
        let result =
            check_with_timeout(self.checker.as_ref(), &*self.connection, self.check_timeout).await;

        self.state = match result {
            Ok(true) => {
                tracing::debug!(name = %self.connection.display_name, "Display name already exists");
                let message = self.labels.exists_message.clone();
                (self.on_error)(Some(message));
                FinishState::Duplicate
            }
            Ok(false) => {
                self.reset_error_message();
                self.navigator.go(&NavigationTarget::DatabaseLoading);
                FinishState::Success
            }
            Err(e) => {
                tracing::warn!(
                    name = %self.connection.display_name,
                    error = %e,
                    timed_out = e.is_timeout(),
                    "Duplicate check failed"
                );
                let message = self.labels.check_failed_message.clone();
                (self.on_error)(Some(message));
                FinishState::Failed
            }
        };
        self.state
    }
}

async fn check_with_timeout(
    checker: &dyn DuplicateChecker,
    connection: &ConnectionRecord,
    timeout: Option<Duration>,
) -> Result<bool, RepoError> {
    let check = checker.check_duplicate(connection);
    match timeout {
        Some(limit) => tokio::time::timeout(limit, check)
            .await
            .map_err(|_| RepoError::timeout("Duplicate check", limit))?,
        None => check.await,
    }
}

impl std::fmt::Debug for DetailsController<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailsController")
            .field("connection", &self.connection)
            .field("state", &self.state)
            .field("check_timeout", &self.check_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NO_DATABASE;
    use crate::services::MessageBundle;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Everything the controller did, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Error(Option<String>),
        Go(NavigationTarget),
    }

    type EventLog = Arc<Mutex<Vec<Event>>>;

    struct LogNavigator(EventLog);

    impl Navigator for LogNavigator {
        fn go(&self, target: &NavigationTarget) {
            self.0.lock().push(Event::Go(target.clone()));
        }
    }

    enum Reply {
        Exists(bool),
        Fail,
        Hang,
    }

    struct StubChecker {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl StubChecker {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self { reply, calls: AtomicUsize::new(0) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DuplicateChecker for StubChecker {
        async fn check_duplicate(&self, _connection: &ConnectionRecord) -> Result<bool, RepoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Exists(exists) => Ok(exists),
                Reply::Fail => Err(RepoError::duplicate_check("service unavailable")),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(false)
                }
            }
        }
    }

    fn controller<'a>(
        record: &'a mut ConnectionRecord,
        checker: Arc<StubChecker>,
        log: &EventLog,
    ) -> DetailsController<'a> {
        let errors = Arc::clone(log);
        let mut controller = DetailsController::new(
            record,
            Arc::new(MessageBundle::english()),
            checker,
            Arc::new(LogNavigator(Arc::clone(log))),
            Box::new(move |message: Option<String>| errors.lock().push(Event::Error(message))),
        );
        controller.initialize();
        controller
    }

    fn exists_message() -> String {
        MessageBundle::english().get(keys::ERROR_EXISTS)
    }

    #[test]
    fn test_initialize_loads_labels() {
        let mut record = ConnectionRecord::default();
        let log = EventLog::default();
        let controller = controller(&mut record, StubChecker::new(Reply::Exists(false)), &log);

        let labels = controller.labels();
        assert_eq!(labels.display_name, "Display Name");
        assert_eq!(labels.finish, "Finish");
        assert_eq!(labels.back, "Back");
        assert_eq!(labels.exists_message, exists_message());
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_labels_fall_back_to_keys() {
        let mut record = ConnectionRecord::default();
        let mut controller = DetailsController::new(
            &mut record,
            Arc::new(MessageBundle::new()),
            StubChecker::new(Reply::Exists(false)),
            Arc::new(LogNavigator(EventLog::default())),
            Box::new(|_: Option<String>| {}),
        );
        assert_eq!(controller.labels(), &DetailsLabels::default());

        controller.initialize();
        assert_eq!(controller.labels().launch, keys::LAUNCH);
    }

    #[test]
    fn test_can_finish() {
        let log = EventLog::default();
        let checker = StubChecker::new(Reply::Exists(false));

        let mut record = ConnectionRecord::new("Sales").with_database("pg");
        assert!(controller(&mut record, checker.clone(), &log).can_finish());

        let mut record = ConnectionRecord::new("").with_database("pg");
        assert!(!controller(&mut record, checker.clone(), &log).can_finish());

        let mut record = ConnectionRecord::new("Sales").with_database(NO_DATABASE);
        assert!(!controller(&mut record, checker.clone(), &log).can_finish());

        let mut record = ConnectionRecord::default();
        let mut form = controller(&mut record, checker, &log);
        assert!(!form.can_finish());
        form.connection_mut().display_name = "Sales".to_string();
        form.connection_mut().database_connection = "pg".to_string();
        assert!(form.can_finish());
    }

    #[test]
    fn test_set_default_connection_is_idempotent() {
        let mut record = ConnectionRecord::new("Sales");
        let log = EventLog::default();
        {
            let mut form = controller(&mut record, StubChecker::new(Reply::Exists(false)), &log);
            form.set_default_connection(true);
            form.set_default_connection(true);
            assert!(form.connection().is_default);
        }
        assert!(record.is_default);

        {
            let mut form = controller(&mut record, StubChecker::new(Reply::Exists(false)), &log);
            form.set_default_connection(false);
        }
        assert!(!record.is_default);
    }

    #[test]
    fn test_select_database() {
        let mut record = ConnectionRecord::default();
        let log = EventLog::default();
        controller(&mut record, StubChecker::new(Reply::Exists(false)), &log).select_database();

        assert_eq!(*log.lock(), vec![Event::Go(NavigationTarget::DatabaseSelect)]);
    }

    #[test]
    fn test_back_when_editing_goes_to_manager() {
        let mut record = ConnectionRecord::new("Sales").editing();
        let log = EventLog::default();
        controller(&mut record, StubChecker::new(Reply::Exists(false)), &log).back();

        assert_eq!(*log.lock(), vec![Event::Go(NavigationTarget::Manager)]);
    }

    #[test]
    fn test_back_when_creating_goes_to_other() {
        let mut record = ConnectionRecord::new("Sales");
        let log = EventLog::default();
        controller(&mut record, StubChecker::new(Reply::Exists(false)), &log).back();

        let expected = NavigationTarget::Other {
            repository_type: RepositoryType::KettleDatabaseRepository,
        };
        assert_eq!(*log.lock(), vec![Event::Go(expected)]);
    }

    #[test]
    fn test_back_when_modifying_goes_to_other() {
        let mut record = ConnectionRecord::new("Sales").modifying();
        let log = EventLog::default();
        controller(&mut record, StubChecker::new(Reply::Exists(false)), &log).back();

        assert_eq!(log.lock()[0], Event::Go(NavigationTarget::Other {
                repository_type: RepositoryType::KettleDatabaseRepository,
            }));
    }

    #[test]
    fn test_reset_error_message() {
        let mut record = ConnectionRecord::default();
        let log = EventLog::default();
        controller(&mut record, StubChecker::new(Reply::Exists(false)), &log)
            .reset_error_message();

        assert_eq!(*log.lock(), vec![Event::Error(None)]);
    }

    #[tokio::test]
    async fn test_finish_when_editing_skips_check() {
        let mut record = ConnectionRecord::new("Sales").with_database("pg").editing();
        let log = EventLog::default();
        let checker = StubChecker::new(Reply::Exists(true));

        let state = controller(&mut record, checker.clone(), &log).finish().await;

        assert_eq!(state, FinishState::Success);
        assert_eq!(checker.calls(), 0);
        assert_eq!(*log.lock(), vec![Event::Go(NavigationTarget::DatabaseLoading)]);
    }

    #[tokio::test]
    async fn test_finish_when_modifying_skips_check() {
        let mut record = ConnectionRecord::new("Sales").with_database("pg").modifying();
        let log = EventLog::default();
        let checker = StubChecker::new(Reply::Exists(true));

        let state = controller(&mut record, checker.clone(), &log).finish().await;

        assert!(state.is_success());
        assert_eq!(checker.calls(), 0);
        assert_eq!(*log.lock(), vec![Event::Go(NavigationTarget::DatabaseLoading)]);
    }

    #[tokio::test]
    async fn test_finish_duplicate_reports_and_stays() {
        let mut record = ConnectionRecord::new("Sales").with_database("pg");
        let log = EventLog::default();
        let checker = StubChecker::new(Reply::Exists(true));

        let mut form = controller(&mut record, checker.clone(), &log);
        let state = form.finish().await;

        assert_eq!(state, FinishState::Duplicate);
        assert_eq!(form.state(), FinishState::Duplicate);
        assert_eq!(checker.calls(), 1);
        assert_eq!(*log.lock(), vec![Event::Error(Some(exists_message()))]);
    }

    #[tokio::test]
    async fn test_finish_unique_clears_error_then_navigates() {
        let mut record = ConnectionRecord::new("Sales").with_database("pg");
        let log = EventLog::default();
        let checker = StubChecker::new(Reply::Exists(false));

        let state = controller(&mut record, checker.clone(), &log).finish().await;

        assert_eq!(state, FinishState::Success);
        assert_eq!(checker.calls(), 1);
        assert_eq!(
            *log.lock(),
            vec![Event::Error(None), Event::Go(NavigationTarget::DatabaseLoading)]
        );
    }

    #[tokio::test]
    async fn test_finish_check_failure_reports_generic_error() {
        let mut record = ConnectionRecord::new("Sales").with_database("pg");
        let log = EventLog::default();

        let state = controller(&mut record, StubChecker::new(Reply::Fail), &log).finish().await;

        assert_eq!(state, FinishState::Failed);
        let expected = MessageBundle::english().get(keys::ERROR_CHECK);
        assert_eq!(*log.lock(), vec![Event::Error(Some(expected))]);
    }

    #[tokio::test]
    async fn test_finish_check_timeout_counts_as_failure() {
        let mut record = ConnectionRecord::new("Sales").with_database("pg");
        let log = EventLog::default();

        let state = controller(&mut record, StubChecker::new(Reply::Hang), &log)
            .with_check_timeout(Duration::from_millis(20))
            .finish()
            .await;

        assert_eq!(state, FinishState::Failed);
        assert_eq!(log.lock().len(), 1);
        assert!(!log.lock().iter().any(|e| matches!(e, Event::Go(_))));
    }

    #[tokio::test]
    async fn test_finish_again_after_duplicate() {
        let mut record = ConnectionRecord::new("Sales").with_database("pg");
        let log = EventLog::default();

        {
            let mut form = controller(&mut record, StubChecker::new(Reply::Exists(true)), &log);
            assert_eq!(form.finish().await, FinishState::Duplicate);
            form.connection_mut().display_name = "Sales 2".to_string();
        }

        let state =
            controller(&mut record, StubChecker::new(Reply::Exists(false)), &log).finish().await;
        assert!(state.is_success());
        assert_eq!(record.display_name, "Sales 2");
        assert_eq!(log.lock().last(), Some(&Event::Go(NavigationTarget::DatabaseLoading)));
    }
}
