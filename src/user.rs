//! The `user.*` family of methods.

use serde::{Deserialize, Serialize};

use crate::client::{RequestParams, ZabbixClient, expect_one};
use crate::error::Error;
use crate::params::Params;
use crate::user_group::UserGroupId;
use crate::{Result, params};

/// A Zabbix user object.
///
/// `passwd` is write-only on the server side; `user.get` never returns
/// it, so a fetched user decodes with an empty password.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(rename = "userid", skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    pub username: String,
    #[serde(rename = "passwd", skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(rename = "roleid")]
    pub role_id: String,
    pub name: String,
    pub surname: String,
    #[serde(rename = "usrgrps")]
    pub groups: Vec<UserGroupId>,
}

#[derive(Deserialize)]
struct UserIds {
    #[serde(rename = "userids")]
    ids: Vec<String>,
}

impl ZabbixClient {
    /// Calls `user.get`, filling `output: "extend"` unless the caller
    /// picked an output mode.
    pub async fn users_get(&self, params: Params) -> Result<Vec<User>> {
        self.call_with_error_parse("user.get", params.with_output_extend())
            .await
    }

    /// Fetches the user with the given id, failing with
    /// [`Error::ExpectedOneResult`] unless exactly one matches.
    pub async fn user_get_by_id(&self, id: &str) -> Result<User> {
        let users = self.users_get(params! { "userids": id }).await?;
        expect_one(users)
    }

    /// Calls `user.create` and writes the returned ids back into
    /// `users`, in order.
    pub async fn users_create(&self, users: &mut [User]) -> Result<()> {
        let params = RequestParams::from_serialize(&*users)?;
        let created: UserIds = self.call_with_error_parse("user.create", params).await?;
        if created.ids.len() != users.len() {
            return Err(Error::CountMismatch {
                expected: users.len(),
                got: created.ids.len(),
            });
        }
        for (user, id) in users.iter_mut().zip(created.ids) {
            user.user_id = id;
        }
        Ok(())
    }

    /// Calls `user.update`.
    pub async fn users_update(&self, users: &[User]) -> Result<()> {
        let params = RequestParams::from_serialize(users)?;
        self.call_with_error("user.update", params).await?;
        Ok(())
    }

    /// Calls `user.delete` with the ids of `users` and clears each id on
    /// success.
    pub async fn users_delete(&self, users: &mut [User]) -> Result<()> {
        let ids: Vec<String> = users.iter().map(|user| user.user_id.clone()).collect();
        self.users_delete_by_ids(&ids).await?;
        for user in users.iter_mut() {
            user.user_id.clear();
        }
        Ok(())
    }

    /// Calls `user.delete`, failing with [`Error::CountMismatch`] when
    /// the server confirms fewer deletions than ids were sent.
    pub async fn users_delete_by_ids(&self, ids: &[String]) -> Result<()> {
        let params = RequestParams::from_serialize(ids)?;
        let deleted: UserIds = self.call_with_error_parse("user.delete", params).await?;
        if deleted.ids.len() != ids.len() {
            return Err(Error::CountMismatch {
                expected: ids.len(),
                got: deleted.ids.len(),
            });
        }
        Ok(())
    }
}
