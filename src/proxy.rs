//! The `proxy.*` family of methods.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::client::{RequestParams, ZabbixClient, expect_one};
use crate::error::Error;
use crate::params::Params;
use crate::wire::Stringly;
use crate::{Result, params};

/// A Zabbix proxy object.
///
/// <https://www.zabbix.com/documentation/current/en/manual/api/reference/proxy/object>
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Proxy {
    #[serde(rename = "proxyid", skip_serializing_if = "String::is_empty")]
    pub proxy_id: String,
    pub host: String,
    /// 5 for an active proxy, 6 for a passive one.
    #[serde_as(as = "Stringly")]
    pub status: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde_as(as = "Option<Stringly>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_connect: Option<i32>,
    #[serde_as(as = "Option<Stringly>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_accept: Option<i32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_issuer: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_subject: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_psk_identity: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tls_psk: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub proxy_address: String,
}

#[derive(Deserialize)]
struct ProxyIds {
    #[serde(rename = "proxyids")]
    ids: Vec<String>,
}

impl ZabbixClient {
    /// Calls `proxy.get`, filling `output: "extend"` unless the caller
    /// picked an output mode.
    pub async fn proxies_get(&self, params: Params) -> Result<Vec<Proxy>> {
        self.call_with_error_parse("proxy.get", params.with_output_extend())
            .await
    }

    /// Fetches the proxy with the given id, failing with
    /// [`Error::ExpectedOneResult`] unless exactly one matches.
    pub async fn proxy_get_by_id(&self, id: &str) -> Result<Proxy> {
        let proxies = self.proxies_get(params! { "proxyids": id }).await?;
        expect_one(proxies)
    }

    /// Calls `proxy.create` and writes the returned ids back into
    /// `proxies`, in order.
    pub async fn proxies_create(&self, proxies: &mut [Proxy]) -> Result<()> {
        let params = RequestParams::from_serialize(&*proxies)?;
        let created: ProxyIds = self.call_with_error_parse("proxy.create", params).await?;
        if created.ids.len() != proxies.len() {
            return Err(Error::CountMismatch {
                expected: proxies.len(),
                got: created.ids.len(),
            });
        }
        for (proxy, id) in proxies.iter_mut().zip(created.ids) {
            proxy.proxy_id = id;
        }
        Ok(())
    }

    /// Calls `proxy.update`.
    pub async fn proxies_update(&self, proxies: &[Proxy]) -> Result<()> {
        let params = RequestParams::from_serialize(proxies)?;
        self.call_with_error("proxy.update", params).await?;
        Ok(())
    }

    /// Calls `proxy.delete` with the ids of `proxies` and clears each id
    /// on success.
    pub async fn proxies_delete(&self, proxies: &mut [Proxy]) -> Result<()> {
        let ids: Vec<String> = proxies.iter().map(|proxy| proxy.proxy_id.clone()).collect();
        self.proxies_delete_by_ids(&ids).await?;
        for proxy in proxies.iter_mut() {
            proxy.proxy_id.clear();
        }
        Ok(())
    }

    /// Calls `proxy.delete`, failing with [`Error::CountMismatch`] when
    /// the server confirms fewer deletions than ids were sent.
    pub async fn proxies_delete_by_ids(&self, ids: &[String]) -> Result<()> {
        let params = RequestParams::from_serialize(ids)?;
        let deleted: ProxyIds = self.call_with_error_parse("proxy.delete", params).await?;
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

    use super::Proxy;

    #[test]
    fn status_travels_as_a_string() {
        let proxy = Proxy {
            host: "proxy-dmz".to_string(),
            status: 5,
            tls_connect: Some(2),
            ..Proxy::default()
        };
        assert_eq!(
            serde_json::to_value(&proxy).unwrap(),
            json!({"host": "proxy-dmz", "status": "5", "tls_connect": "2"})
        );
    }

    #[test]
    fn decodes_stringly_and_bare_numbers() {
        let proxy: Proxy = serde_json::from_value(json!({
            "proxyid": "10418",
            "host": "proxy-dmz",
            "status": "6",
            "tls_accept": 1,
        }))
        .unwrap();
        assert_eq!(proxy.proxy_id, "10418");
        assert_eq!(proxy.status, 6);
        assert_eq!(proxy.tls_accept, Some(1));
        assert_eq!(proxy.tls_connect, None);
    }
}
