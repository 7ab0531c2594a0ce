use std::sync::{Arc, Mutex, RwLock};

use rusqlite::Connection;

use crate::db::queries;
use crate::errors::{ApiError, AppError};
use crate::models::{AuthRequest, RegisterRequest, Role, Session};
use crate::services::backend::ServiceCenter;

pub const TOKEN_KEY: &str = "authToken";
pub const USERNAME_KEY: &str = "authUsername";
pub const ROLE_KEY: &str = "authRole";

/// Roles allowed to book appointments.
pub const BOOKING_ROLES: &[Role] = &[Role::User, Role::Cashier, Role::Admin];

/// Current sign-in state, mirrored into the session database.
pub struct SessionStore {
    backend: Arc<dyn ServiceCenter>,
    db: Arc<Mutex<Connection>>,
    current: RwLock<Session>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn ServiceCenter>, db: Arc<Mutex<Connection>>) -> Self {
        Self {
            backend,
            db,
            current: RwLock::new(Session::guest()),
        }
    }

    pub fn current(&self) -> Session {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_current(&self, session: Session) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = session;
    }

    /// Adopt persisted credentials if all three are present and valid.
    /// Anything unreadable is purged and the session stays guest.
    pub fn restore(&self) -> Session {
        let stored = {
            let db = self.db.lock().unwrap_or_else(|e| e.into_inner());
            read_stored(&db)
        };

        let session = match stored {
            Ok(Some(session)) => {
                tracing::info!(
                    username = session.username().unwrap_or_default(),
                    role = session.role().as_str(),
                    "session restored"
                );
                session
            }
            Ok(None) => {
                tracing::debug!("no stored session");
                Session::guest()
            }
            Err(reason) => {
                tracing::warn!(reason = %reason, "stored session unreadable, clearing");
                self.clear_storage();
                Session::guest()
            }
        };

        self.set_current(session.clone());
        session
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required.".to_string(),
            ));
        }

        tracing::info!(username, "attempting login");
        let req = AuthRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };

        let result = match self.backend.login(&req).await {
            Ok(Some(resp)) => match (resp.token, resp.username, resp.role) {
                (Some(token), Some(username), Some(role)) => {
                    Session::authenticated(token, username, role).ok_or(AppError::Api(
                        ApiError::UnexpectedBody {
                            expected: "an authenticated role and token",
                        },
                    ))
                }
                _ => Err(AppError::Api(ApiError::UnexpectedBody {
                    expected: "token, username and role",
                })),
            },
            Ok(None) => Err(AppError::Api(ApiError::UnexpectedBody {
                expected: "token, username and role",
            })),
            Err(e) => Err(AppError::Api(e)),
        };

        match result {
            Ok(session) => {
                self.persist(&session);
                self.set_current(session.clone());
                tracing::info!(
                    username = session.username().unwrap_or_default(),
                    role = session.role().as_str(),
                    "login successful"
                );
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                self.logout();
                Err(e)
            }
        }
    }

    /// Create an account. The current session is left untouched.
    pub async fn register(&self, username: &str, password: &str, role: Role) -> Result<(), AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required.".to_string(),
            ));
        }
        if role == Role::Guest {
            return Err(AppError::Validation("Cannot register a guest account.".to_string()));
        }

        let req = RegisterRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
            role,
        };
        self.backend.register(&req).await?;
        tracing::info!(username, role = role.as_str(), "registration successful");
        Ok(())
    }

    pub fn logout(&self) {
        self.set_current(Session::guest());
        self.clear_storage();
        tracing::info!("logged out");
    }

    /// Gate for role-restricted operations.
    pub fn require_role(&self, allowed: &[Role]) -> Result<Session, AppError> {
        let session = self.current();
        if session.is_guest() || session.token().is_none() {
            return Err(AppError::Unauthorized(
                "Please log in to continue.".to_string(),
            ));
        }
        if !allowed.contains(&session.role()) {
            return Err(AppError::Unauthorized(format!(
                "Role {} is not allowed here.",
                session.role().as_str()
            )));
        }
        Ok(session)
    }

    fn persist(&self, session: &Session) {
        let (Some(token), Some(username)) = (session.token(), session.username()) else {
            return;
        };
        let mut db = self.db.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = queries::set_session_values(
            &mut db,
            &[
                (TOKEN_KEY, token),
                (USERNAME_KEY, username),
                (ROLE_KEY, session.role().as_str()),
            ],
        ) {
            tracing::error!(error = %e, "failed to persist session");
        }
    }

    fn clear_storage(&self) {
        let db = self.db.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = queries::clear_session(&db) {
            tracing::error!(error = %e, "failed to clear stored session");
        }
    }
}

/// Unreadable storage is `Storage`; readable but unusable contents mean the
/// user has to sign in again.
fn read_stored(conn: &Connection) -> Result<Option<Session>, AppError> {
    let token = queries::get_session_value(conn, TOKEN_KEY)?;
    let username = queries::get_session_value(conn, USERNAME_KEY)?;
    let role = queries::get_session_value(conn, ROLE_KEY)?;

    let stale = AppError::Unauthorized;
    match (token, username, role) {
        (None, None, None) => Ok(None),
        (Some(token), Some(username), Some(role)) => {
            let role =
                Role::parse(&role).ok_or_else(|| stale(format!("unknown stored role: {role}")))?;
            Session::authenticated(token, username, role)
                .map(Some)
                .ok_or_else(|| stale("stored session is not authenticated".to_string()))
        }
        _ => Err(stale("stored session is incomplete".to_string())),
    }
}
