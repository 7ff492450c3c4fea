use bson::oid::ObjectId;

use barkpark_services::AuthService;
use barkpark_services::dao::user::UserDao;

use super::test_app::TestApp;

/// A seeded user plus a freshly minted access token.
pub struct SeededUser {
    pub id: ObjectId,
    pub username: String,
    pub access_token: String,
}

impl TestApp {
    /// Seed a user directly through the DAO and mint their token via the
    /// auth service. Account management is out of scope for this server, so
    /// there is no register/login surface to go through.
    pub async fn seed_user(&self, username: &str) -> SeededUser {
        let users = UserDao::new(&self.db);
        let user = users
            .create(
                format!("{username}@barkpark.test"),
                username.to_string(),
                format!("{username} Display"),
            )
            .await
            .expect("Failed to seed user");

        let user_id = user.id.expect("Seeded user has no id");
        let auth = AuthService::new(self.settings.jwt.clone());
        let access_token = auth
            .issue_access_token(user_id, username)
            .expect("Failed to mint token");

        SeededUser {
            id: user_id,
            username: username.to_string(),
            access_token,
        }
    }

    /// A syntactically valid token for a user that does not exist.
    pub fn token_for_missing_user(&self) -> String {
        let auth = AuthService::new(self.settings.jwt.clone());
        auth.issue_access_token(ObjectId::new(), "ghost")
            .expect("Failed to mint token")
    }

    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }
}
