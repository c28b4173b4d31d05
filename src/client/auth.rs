//! Account endpoints and the session lifecycle built on them.

use super::{ApiClient, ClientError, ClientResult};
use crate::events::{Mutation, ResourceKind};
use crate::model::{
    AuthCheck, LoginRequest, LoginResponse, PasswordChange, PasswordChangeResponse,
    RegisterRequest, User, UserUpdate, UserUpdateResponse,
};
use crate::session::AuthState;
use reqwest::Method;

impl ApiClient {
    /// Resolve the persisted token at startup
    ///
    /// Always leaves the session out of the loading state. A failed check is
    /// not an error here: it just means "logged out".
    pub async fn init_auth(&self) -> AuthState {
        let check = self.check_auth().await;
        match check.user {
            Some(user) if check.is_authenticated => self.session.confirm(user).await,
            _ => self.session.finish_loading().await,
        }
        self.session.snapshot().await
    }

    /// Ask the backend whether the stored token is still valid
    ///
    /// Without a token no request is made. A rejected token, a network
    /// failure, or an unauthenticated answer clears the stored token.
    pub async fn check_auth(&self) -> AuthCheck {
        if self.session.token().await.is_none() {
            return AuthCheck::default();
        }

        let result: ClientResult<AuthCheck> = self
            .get_json("accounts/check/", &[], "Failed to check authentication")
            .await;

        match result {
            Ok(check) if check.is_authenticated => check,
            Ok(_) => {
                self.drop_stale_token().await;
                AuthCheck::default()
            }
            Err(e) => {
                tracing::debug!(error = %e, "Auth check failed");
                self.drop_stale_token().await;
                AuthCheck::default()
            }
        }
    }

    async fn drop_stale_token(&self) {
        if let Err(e) = self.session.clear().await {
            tracing::warn!(error = %e, "Failed to clear stale token");
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<User> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let builder = self.public(Method::POST, "accounts/login/").json(&request);
        let response = self.send(builder, "Login failed").await?;
        let body: LoginResponse = Self::decode(response).await?;

        self.session.establish(&body.token, body.user.clone()).await?;
        self.notify(ResourceKind::Account, Mutation::SessionChanged, Some(body.user.id));

        tracing::info!(user = %body.user.username, "Logged in");
        Ok(body.user)
    }

    /// Log out; the local token is dropped even if the server call fails
    pub async fn logout(&self) -> ClientResult<()> {
        if self.session.token().await.is_some() {
            let builder = self.authed(Method::POST, "accounts/logout/").await;
            if let Err(e) = self.send(builder, "Logout failed").await {
                tracing::debug!(error = %e, "Server-side logout failed, clearing local token anyway");
            }
        }

        self.session.clear().await?;
        self.notify(ResourceKind::Account, Mutation::SessionChanged, None);

        tracing::info!("Logged out");
        Ok(())
    }

    /// Create an account and log straight into it
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<User> {
        if request.password != request.password_confirm {
            return Err(ClientError::InvalidInput("passwords do not match".to_string()));
        }

        let builder = self.public(Method::POST, "accounts/register/").json(request);
        let response = self.send(builder, "Registration failed").await?;
        let body: LoginResponse = Self::decode(response).await?;

        self.session.establish(&body.token, body.user.clone()).await?;
        self.notify(ResourceKind::Account, Mutation::SessionChanged, Some(body.user.id));

        tracing::info!(user = %body.user.username, "Registered");
        Ok(body.user)
    }

    pub async fn current_user(&self) -> ClientResult<User> {
        self.get_json("accounts/me/", &[], "Failed to load user profile")
            .await
    }

    /// Re-read the profile into the session
    pub async fn refresh_user(&self) -> ClientResult<User> {
        let user = self.current_user().await?;
        self.session.set_user(user.clone()).await;
        Ok(user)
    }

    pub async fn update_user(&self, update: &UserUpdate) -> ClientResult<User> {
        let body: UserUpdateResponse = self
            .send_json(Method::PUT, "accounts/me/update/", update, "Failed to update profile")
            .await?;

        self.session.set_user(body.user.clone()).await;
        self.notify(ResourceKind::Account, Mutation::Updated, Some(body.user.id));
        Ok(body.user)
    }

    /// Change the password; the backend rotates the token
    pub async fn change_password(&self, current: &str, new: &str) -> ClientResult<()> {
        let request = PasswordChange {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        let body: PasswordChangeResponse = self
            .send_json(Method::POST, "accounts/me/password/", &request, "Failed to change password")
            .await?;

        self.session.replace_token(&body.token).await?;
        self.notify(ResourceKind::Account, Mutation::SessionChanged, None);
        Ok(())
    }
}
