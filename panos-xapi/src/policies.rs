//! Security rulebase objects.

use log::info;

use crate::error::ApiError;
use crate::firewall::Firewall;
use crate::tree::XmlNode;

/// Device name used in config xpaths on a standalone firewall.
pub const DEVICE_NAME: &str = "localhost.localdomain";
/// Virtual system that holds the rulebase on single-vsys devices.
pub const DEFAULT_VSYS: &str = "vsys1";

/// A security policy rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRule {
    pub name: String,
    pub from_zones: Vec<String>,
    pub to_zones: Vec<String>,
    pub sources: Vec<String>,
    pub destinations: Vec<String>,
    pub source_users: Vec<String>,
    pub categories: Vec<String>,
    pub applications: Vec<String>,
    pub services: Vec<String>,
    pub action: String,
}

impl SecurityRule {
    /// A rule matching everything on any application's default ports.
    pub fn new(name: impl Into<String>) -> Self {
        let any = || vec!["any".to_string()];
        Self {
            name: name.into(),
            from_zones: any(),
            to_zones: any(),
            sources: any(),
            destinations: any(),
            source_users: any(),
            categories: any(),
            applications: any(),
            services: vec!["application-default".to_string()],
            action: "allow".to_string(),
        }
    }

    /// The `<entry name="...">` element the config API stores.
    pub fn to_element(&self) -> XmlNode {
        XmlNode::new("entry")
            .with_attribute("name", self.name.as_str())
            .with_members("from", &self.from_zones)
            .with_members("to", &self.to_zones)
            .with_members("source", &self.sources)
            .with_members("destination", &self.destinations)
            .with_members("source-user", &self.source_users)
            .with_members("category", &self.categories)
            .with_members("application", &self.applications)
            .with_members("service", &self.services)
            .with_child(XmlNode::new("action").with_text(self.action.as_str()))
    }
}

/// Security rulebase client scoped to one firewall session and vsys.
pub struct Rulebase<'fw> {
    firewall: &'fw Firewall,
    vsys: String,
}

impl<'fw> Rulebase<'fw> {
    pub fn for_vsys(firewall: &'fw Firewall, vsys: impl Into<String>) -> Self {
        Self {
            firewall,
            vsys: vsys.into(),
        }
    }

    /// Config xpath of the rule called `name`.
    pub fn rule_xpath(&self, name: &str) -> String {
        format!(
            "/config/devices/entry[@name='{DEVICE_NAME}']/vsys/entry[@name='{}']/rulebase/security/rules/entry[@name='{name}']",
            self.vsys
        )
    }

    /// Create the rule, or replace an existing rule with the same name.
    pub fn apply(&self, rule: &SecurityRule) -> Result<(), ApiError> {
        info!("applying security rule '{}' in {}", rule.name, self.vsys);
        self.firewall
            .edit_config(&self.rule_xpath(&rule.name), &rule.to_element())?;
        Ok(())
    }
}
