use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "CASHIER")]
    Cashier,
    #[serde(rename = "USER")]
    User,
    #[serde(rename = "guest")]
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Cashier => "CASHIER",
            Role::User => "USER",
            Role::Guest => "guest",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(Role::Admin),
            "CASHIER" => Some(Role::Cashier),
            "USER" => Some(Role::User),
            "guest" => Some(Role::Guest),
            _ => None,
        }
    }

    /// Where a freshly signed-in user lands.
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Cashier => "/cashier",
            Role::User => "/dashboard",
            Role::Guest => "/",
        }
    }
}

/// The signed-in identity. A non-guest session always carries a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    role: Role,
    username: Option<String>,
    token: Option<String>,
}

impl Session {
    pub fn guest() -> Self {
        Self {
            role: Role::Guest,
            username: None,
            token: None,
        }
    }

    pub fn authenticated(token: String, username: String, role: Role) -> Option<Self> {
        if role == Role::Guest || token.is_empty() || username.is_empty() {
            return None;
        }
        Some(Self {
            role,
            username: Some(username),
            token: Some(token),
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_guest(&self) -> bool {
        self.role == Role::Guest
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::guest()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub token: Option<String>,
}
