//! The `application.*` family of methods.
//!
//! Applications were folded into item tags in Zabbix 5.4; these calls
//! target servers up to 5.2.

use serde::{Deserialize, Serialize};

use crate::client::{RequestParams, ZabbixClient, expect_one};
use crate::error::Error;
use crate::params::Params;
use crate::{Result, params};

/// A Zabbix application object.
///
/// <https://www.zabbix.com/documentation/3.2/manual/api/reference/application/object>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    #[serde(rename = "applicationid", skip_serializing_if = "String::is_empty")]
    pub application_id: String,
    #[serde(rename = "hostid")]
    pub host_id: String,
    pub name: String,
    #[serde(rename = "templateid", skip_serializing_if = "String::is_empty")]
    pub template_id: String,
}

#[derive(Deserialize)]
struct ApplicationIds {
    #[serde(rename = "applicationids")]
    ids: Vec<String>,
}

impl ZabbixClient {
    /// Calls `application.get`, filling `output: "extend"` unless the
    /// caller picked an output mode.
    ///
    /// # Errors
    ///
    /// Call and decode failures as in
    /// [`call_with_error_parse`](Self::call_with_error_parse).
    pub async fn applications_get(&self, params: Params) -> Result<Vec<Application>> {
        self.call_with_error_parse("application.get", params.with_output_extend())
            .await
    }

    /// Fetches the application with the given id, failing with
    /// [`Error::ExpectedOneResult`] unless exactly one matches.
    pub async fn application_get_by_id(&self, id: &str) -> Result<Application> {
        let apps = self
            .applications_get(params! { "applicationids": id })
            .await?;
        expect_one(apps)
    }

    /// Fetches the application with the given host id and name, failing
    /// with [`Error::ExpectedOneResult`] unless exactly one matches.
    pub async fn application_get_by_host_and_name(
        &self,
        host_id: &str,
        name: &str,
    ) -> Result<Application> {
        let apps = self
            .applications_get(params! {
                "hostids": host_id,
                "filter": { "name": name },
            })
            .await?;
        expect_one(apps)
    }

    /// Calls `application.create` and writes the returned ids back into
    /// `apps`, in order.
    ///
    /// # Errors
    ///
    /// [`Error::CountMismatch`] when the server returns a different
    /// number of ids than objects were sent; nothing is written back in
    /// that case.
    pub async fn applications_create(&self, apps: &mut [Application]) -> Result<()> {
        let params = RequestParams::from_serialize(&*apps)?;
        let created: ApplicationIds = self
            .call_with_error_parse("application.create", params)
            .await?;
        if created.ids.len() != apps.len() {
            return Err(Error::CountMismatch {
                expected: apps.len(),
                got: created.ids.len(),
            });
        }
        for (app, id) in apps.iter_mut().zip(created.ids) {
            app.application_id = id;
        }
        Ok(())
    }

    /// Calls `application.delete` with the ids of `apps` and clears each
    /// id on success.
    pub async fn applications_delete(&self, apps: &mut [Application]) -> Result<()> {
        let ids: Vec<String> = apps.iter().map(|app| app.application_id.clone()).collect();
        self.applications_delete_by_ids(&ids).await?;
        for app in apps.iter_mut() {
            app.application_id.clear();
        }
        Ok(())
    }

    /// Calls `application.delete`.
    ///
    /// # Errors
    ///
    /// [`Error::CountMismatch`] when the server confirms fewer deletions
    /// than ids were sent.
    pub async fn applications_delete_by_ids(&self, ids: &[String]) -> Result<()> {
        let params = RequestParams::from_serialize(ids)?;
        let deleted: ApplicationIds = self
            .call_with_error_parse("application.delete", params)
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

    use super::Application;

    #[test]
    fn unsaved_application_omits_generated_ids() {
        let app = Application {
            host_id: "10050".to_string(),
            name: "CPU".to_string(),
            ..Application::default()
        };
        assert_eq!(
            serde_json::to_value(&app).unwrap(),
            json!({"hostid": "10050", "name": "CPU"})
        );
    }

    #[test]
    fn decodes_server_fields() {
        let app: Application = serde_json::from_value(json!({
            "applicationid": "1206",
            "hostid": "10050",
            "name": "Memory",
            "templateid": "543",
            "flags": "0",
        }))
        .unwrap();
        assert_eq!(app.application_id, "1206");
        assert_eq!(app.template_id, "543");
    }
}
