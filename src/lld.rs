//! The `discoveryrule.*` family of methods, covering low-level
//! discovery rules.
//!
//! <https://www.zabbix.com/documentation/current/en/manual/api/reference/discoveryrule>

use std::collections::BTreeMap;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::client::{RequestParams, ZabbixClient, expect_one};
use crate::error::Error;
use crate::params::Params;
use crate::{Result, params};

/// The collector behind an item or discovery rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemType {
    #[default]
    ZabbixAgent,
    SnmpV1Agent,
    ZabbixTrapper,
    SimpleCheck,
    SnmpV2Agent,
    ZabbixInternal,
    SnmpV3Agent,
    ZabbixAgentActive,
    ZabbixAggregate,
    WebItem,
    ExternalCheck,
    DatabaseMonitor,
    IpmiAgent,
    SshAgent,
    TelnetAgent,
    Calculated,
    JmxAgent,
    SnmpTrap,
    DependentItem,
    HttpAgent,
    SnmpAgent,
    Script,
}

impl ItemType {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ZabbixAgent => 0,
            Self::SnmpV1Agent => 1,
            Self::ZabbixTrapper => 2,
            Self::SimpleCheck => 3,
            Self::SnmpV2Agent => 4,
            Self::ZabbixInternal => 5,
            Self::SnmpV3Agent => 6,
            Self::ZabbixAgentActive => 7,
            Self::ZabbixAggregate => 8,
            Self::WebItem => 9,
            Self::ExternalCheck => 10,
            Self::DatabaseMonitor => 11,
            Self::IpmiAgent => 12,
            Self::SshAgent => 13,
            Self::TelnetAgent => 14,
            Self::Calculated => 15,
            Self::JmxAgent => 16,
            Self::SnmpTrap => 17,
            Self::DependentItem => 18,
            Self::HttpAgent => 19,
            Self::SnmpAgent => 20,
            Self::Script => 21,
        }
    }

    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::ZabbixAgent,
            1 => Self::SnmpV1Agent,
            2 => Self::ZabbixTrapper,
            3 => Self::SimpleCheck,
            4 => Self::SnmpV2Agent,
            5 => Self::ZabbixInternal,
            6 => Self::SnmpV3Agent,
            7 => Self::ZabbixAgentActive,
            8 => Self::ZabbixAggregate,
            9 => Self::WebItem,
            10 => Self::ExternalCheck,
            11 => Self::DatabaseMonitor,
            12 => Self::IpmiAgent,
            13 => Self::SshAgent,
            14 => Self::TelnetAgent,
            15 => Self::Calculated,
            16 => Self::JmxAgent,
            17 => Self::SnmpTrap,
            18 => Self::DependentItem,
            19 => Self::HttpAgent,
            20 => Self::SnmpAgent,
            21 => Self::Script,
            _ => return None,
        })
    }
}

impl Serialize for ItemType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.code())
    }
}

impl<'de> Deserialize<'de> for ItemType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }
        let code = match Raw::deserialize(deserializer)? {
            Raw::Int(n) => i32::try_from(n).map_err(D::Error::custom)?,
            Raw::Str(s) => s.trim().parse().map_err(D::Error::custom)?,
        };
        Self::from_code(code).ok_or_else(|| D::Error::custom(format!("unknown item type {code}")))
    }
}

/// How filter conditions combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LldEvalType {
    #[default]
    #[serde(rename = "0")]
    AndOr,
    #[serde(rename = "1")]
    And,
    #[serde(rename = "2")]
    Or,
    #[serde(rename = "3")]
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LldOperator {
    #[serde(rename = "8")]
    Match,
    #[serde(rename = "9")]
    NotMatch,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LldRuleFilterCondition {
    #[serde(rename = "macro")]
    pub macro_name: String,
    pub value: String,
    #[serde(rename = "formulaid", skip_serializing_if = "String::is_empty")]
    pub formula_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<LldOperator>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LldRuleFilter {
    pub conditions: Vec<LldRuleFilterCondition>,
    #[serde(rename = "evaltype")]
    pub eval_type: LldEvalType,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub eval_formula: String,
    pub formula: String,
}

/// Maps a discovery macro onto a JSONPath into the discovered document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LldMacroPath {
    pub lld_macro: String,
    pub path: String,
}

/// One value preprocessing step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preprocessor {
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub params: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_handler: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_handler_params: String,
}

/// A low-level discovery rule.
///
/// The server shares most of this shape with items, including the
/// `key_` spelling and the stringly numeric fields. `headers` arrives
/// as `[]` when empty; decoding accepts both that and a proper object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LldRule {
    #[serde(rename = "itemid", skip_serializing_if = "String::is_empty")]
    pub item_id: String,
    pub delay: String,
    #[serde(rename = "hostid")]
    pub host_id: String,
    #[serde(rename = "interfaceid", skip_serializing_if = "String::is_empty")]
    pub interface_id: String,
    #[serde(rename = "key_")]
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(rename = "authtype", skip_serializing_if = "String::is_empty")]
    pub auth_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub delay_flex: String,
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ipmi_sensor: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub lifetime: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub params: String,
    #[serde(rename = "privatekey", skip_serializing_if = "String::is_empty")]
    pub private_key: String,
    #[serde(rename = "publickey", skip_serializing_if = "String::is_empty")]
    pub public_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trapper_hosts: String,
    #[serde(rename = "master_itemid", skip_serializing_if = "String::is_empty")]
    pub master_item_id: String,

    // ssh / telnet
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub port: String,

    // HTTP agent
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_method: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub allow_traps: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub post_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub retrieve_mode: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub posts: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status_codes: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timeout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub verify_host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub verify_peer: String,
    #[serde(
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "crate::wire::object_or_empty_list"
    )]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub http_proxy: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub follow_redirects: String,

    // SNMP
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snmp_oid: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snmp_community: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snmpv3_authpassphrase: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snmpv3_authprotocol: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snmpv3_contextname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snmpv3_privpassphrase: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snmpv3_privprotocol: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snmpv3_securitylevel: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snmpv3_securityname: String,

    #[serde(rename = "preprocessing", skip_serializing_if = "Vec::is_empty")]
    pub preprocessors: Vec<Preprocessor>,
    pub filter: LldRuleFilter,
    #[serde(rename = "lld_macro_paths", skip_serializing_if = "Vec::is_empty")]
    pub macro_paths: Vec<LldMacroPath>,
}

#[derive(Deserialize)]
struct CreatedRuleIds {
    #[serde(rename = "itemids")]
    ids: Vec<String>,
}

#[derive(Deserialize)]
struct DeletedRuleIds {
    #[serde(rename = "ruleids")]
    ids: RuleIdsShape,
}

/// `discoveryrule.delete` answers with a list on current servers and a
/// map keyed by index on some older ones.
#[derive(Deserialize)]
#[serde(untagged)]
enum RuleIdsShape {
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl RuleIdsShape {
    fn into_ids(self) -> Vec<String> {
        match self {
            Self::List(ids) => ids,
            Self::Map(map) => map.into_values().collect(),
        }
    }
}

impl ZabbixClient {
    /// Calls `discoveryrule.get`, filling `output: "extend"` unless the
    /// caller picked an output mode.
    pub async fn lld_rules_get(&self, params: Params) -> Result<Vec<LldRule>> {
        self.call_with_error_parse("discoveryrule.get", params.with_output_extend())
            .await
    }

    /// Fetches the rule with the given item id, failing with
    /// [`Error::ExpectedOneResult`] unless exactly one matches.
    pub async fn lld_rule_get_by_id(&self, id: &str) -> Result<LldRule> {
        let rules = self.lld_rules_get(params! { "itemids": id }).await?;
        expect_one(rules)
    }

    /// Calls `discoveryrule.create` and writes the returned ids back
    /// into `rules`, in order.
    pub async fn lld_rules_create(&self, rules: &mut [LldRule]) -> Result<()> {
        let params = RequestParams::from_serialize(&*rules)?;
        let created: CreatedRuleIds = self
            .call_with_error_parse("discoveryrule.create", params)
            .await?;
        if created.ids.len() != rules.len() {
            return Err(Error::CountMismatch {
                expected: rules.len(),
                got: created.ids.len(),
            });
        }
        for (rule, id) in rules.iter_mut().zip(created.ids) {
            rule.item_id = id;
        }
        Ok(())
    }

    /// Calls `discoveryrule.update`.
    pub async fn lld_rules_update(&self, rules: &[LldRule]) -> Result<()> {
        let params = RequestParams::from_serialize(rules)?;
        self.call_with_error("discoveryrule.update", params).await?;
        Ok(())
    }

    /// Calls `discoveryrule.delete` with the ids of `rules` and clears
    /// each id on success.
    pub async fn lld_rules_delete(&self, rules: &mut [LldRule]) -> Result<()> {
        let ids: Vec<String> = rules.iter().map(|rule| rule.item_id.clone()).collect();
        self.lld_rules_delete_by_ids(&ids).await?;
        for rule in rules.iter_mut() {
            rule.item_id.clear();
        }
        Ok(())
    }

    /// Calls `discoveryrule.delete`, failing with
    /// [`Error::CountMismatch`] when the server confirms fewer deletions
    /// than ids were sent.
    pub async fn lld_rules_delete_by_ids(&self, ids: &[String]) -> Result<()> {
        let deleted = self.lld_rules_delete_ids(ids).await?;
        if deleted.len() != ids.len() {
            return Err(Error::CountMismatch {
                expected: ids.len(),
                got: deleted.len(),
            });
        }
        Ok(())
    }

    /// Calls `discoveryrule.delete` and returns the ids the server
    /// confirmed, whichever shape it answered with.
    pub async fn lld_rules_delete_ids(&self, ids: &[String]) -> Result<Vec<String>> {
        let params = RequestParams::from_serialize(ids)?;
        let deleted: DeletedRuleIds = self
            .call_with_error_parse("discoveryrule.delete", params)
            .await?;
        Ok(deleted.ids.into_ids())
    }
}
