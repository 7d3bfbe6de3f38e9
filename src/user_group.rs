//! The `usergroup.*` family of methods.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::client::{RequestParams, ZabbixClient, expect_one};
use crate::error::Error;
use crate::params::Params;
use crate::wire::Stringly;
use crate::{Result, params};

/// A Zabbix user group object.
///
/// <https://www.zabbix.com/documentation/current/en/manual/api/reference/usergroup/object>
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserGroup {
    #[serde(rename = "usrgrpid", skip_serializing_if = "String::is_empty")]
    pub user_group_id: String,
    pub name: String,
    #[serde_as(as = "Stringly")]
    pub debug_mode: i32,
    #[serde_as(as = "Stringly")]
    pub gui_access: i32,
    /// 0 enabled, 1 disabled.
    #[serde_as(as = "Stringly")]
    #[serde(rename = "users_status")]
    pub status: i32,
    #[serde(rename = "hostgroup_rights", skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<UserGroupPermission>,
}

/// A reference to a user group, as carried in user memberships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserGroupId {
    #[serde(rename = "usrgrpid")]
    pub user_group_id: String,
}

/// A host group access right. `permission` is 0 denied, 2 read,
/// 3 read-write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserGroupPermission {
    pub id: String,
    pub permission: i32,
}

#[derive(Deserialize)]
struct UserGroupIds {
    #[serde(rename = "usrgrpids")]
    ids: Vec<String>,
}

impl ZabbixClient {
    /// Calls `usergroup.get`, filling `output: "extend"` unless the
    /// caller picked an output mode.
    pub async fn user_groups_get(&self, params: Params) -> Result<Vec<UserGroup>> {
        self.call_with_error_parse("usergroup.get", params.with_output_extend())
            .await
    }

    /// Fetches the user group with the given id, failing with
    /// [`Error::ExpectedOneResult`] unless exactly one matches.
    pub async fn user_group_get_by_id(&self, id: &str) -> Result<UserGroup> {
        let groups = self.user_groups_get(params! { "usrgrpids": id }).await?;
        expect_one(groups)
    }

    /// Calls `usergroup.create` and writes the returned ids back into
    /// `groups`, in order.
    pub async fn user_groups_create(&self, groups: &mut [UserGroup]) -> Result<()> {
        let params = RequestParams::from_serialize(&*groups)?;
        let created: UserGroupIds = self
            .call_with_error_parse("usergroup.create", params)
            .await?;
        if created.ids.len() != groups.len() {
            return Err(Error::CountMismatch {
                expected: groups.len(),
                got: created.ids.len(),
            });
        }
        for (group, id) in groups.iter_mut().zip(created.ids) {
            group.user_group_id = id;
        }
        Ok(())
    }

    /// Calls `usergroup.update`.
    pub async fn user_groups_update(&self, groups: &[UserGroup]) -> Result<()> {
        let params = RequestParams::from_serialize(groups)?;
        self.call_with_error("usergroup.update", params).await?;
        Ok(())
    }

    /// Calls `usergroup.delete` with the ids of `groups` and clears each
    /// id on success.
    pub async fn user_groups_delete(&self, groups: &mut [UserGroup]) -> Result<()> {
        let ids: Vec<String> = groups
            .iter()
            .map(|group| group.user_group_id.clone())
            .collect();
        self.user_groups_delete_by_ids(&ids).await?;
        for group in groups.iter_mut() {
            group.user_group_id.clear();
        }
        Ok(())
    }

    /// Calls `usergroup.delete`, failing with [`Error::CountMismatch`]
    /// when the server confirms fewer deletions than ids were sent.
    pub async fn user_groups_delete_by_ids(&self, ids: &[String]) -> Result<()> {
        let params = RequestParams::from_serialize(ids)?;
        let deleted: UserGroupIds = self
            .call_with_error_parse("usergroup.delete", params)
            .await?;
        if deleted.ids.len() != ids.len() {
            return Err(Error::CountMismatch {
                expected: ids.len(),
                got: deleted.ids.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::{UserGroup, UserGroupPermission};

    #[test]
    fn permissions_keep_bare_integers() {
        let group = UserGroup {
            name: "Ops".to_string(),
            debug_mode: 0,
            gui_access: 1,
            status: 0,
            permissions: vec![UserGroupPermission {
                id: "4".to_string(),
                permission: 3,
            }],
            ..UserGroup::default()
        };
        assert_eq!(
            serde_json::to_value(&group).unwrap(),
            json!({
                "name": "Ops",
                "debug_mode": "0",
                "gui_access": "1",
                "users_status": "0",
                "hostgroup_rights": [{"id": "4", "permission": 3}],
            })
        );
    }

    #[test]
    fn decodes_a_get_extend_row() {
        let group: UserGroup = serde_json::from_value(json!({
            "usrgrpid": "7",
            "name": "Zabbix administrators",
            "gui_access": "0",
            "users_status": "0",
            "debug_mode": "1",
        }))
        .unwrap();
        assert_eq!(group.user_group_id, "7");
        assert_eq!(group.debug_mode, 1);
        assert!(group.permissions.is_empty());
    }
}
