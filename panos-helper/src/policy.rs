use std::io::{BufRead, Write};

use log::warn;
use panos_xapi::policies::{Rulebase, SecurityRule};
use panos_xapi::Firewall;

use crate::config::Settings;
use crate::console::{Console, ConsoleError};
use crate::report::{failure, success};

/// Fields collected from the operator for one new rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDraft {
    pub name: String,
    pub from_zone: String,
    pub to_zone: String,
    pub source: String,
    pub destination: String,
    pub application: String,
    pub service: String,
    pub action: String,
}

fn or_default(input: String, default: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

impl RuleDraft {
    /// Prompt for all eight fields. Addresses and application default to
    /// `any`, service to `application-default`; the rest are taken as typed.
    pub fn collect<R: BufRead, W: Write>(
        console: &mut Console<R, W>,
    ) -> Result<Self, ConsoleError> {
        let name = console.prompt("Enter rule name: ")?.trim().to_string();
        let from_zone = console.prompt("Enter source zone: ")?.trim().to_string();
        let to_zone = console.prompt("Enter destination zone: ")?.trim().to_string();
        let source = or_default(console.prompt("Enter source IP (or 'any'): ")?, "any");
        let destination = or_default(
            console.prompt("Enter destination IP (or 'any'): ")?,
            "any",
        );
        let application = or_default(console.prompt("Enter application (or 'any'): ")?, "any");
        let service = or_default(
            console.prompt("Enter service (or 'application-default' or 'any'): ")?,
            "application-default",
        );
        let action = console
            .prompt("Enter action (allow/deny/drop): ")?
            .trim()
            .to_lowercase();

        Ok(Self {
            name,
            from_zone,
            to_zone,
            source,
            destination,
            application,
            service,
            action,
        })
    }

    pub fn into_rule(self) -> SecurityRule {
        SecurityRule {
            from_zones: vec![self.from_zone],
            to_zones: vec![self.to_zone],
            sources: vec![self.source],
            destinations: vec![self.destination],
            applications: vec![self.application],
            services: vec![self.service],
            action: self.action,
            ..SecurityRule::new(self.name)
        }
    }
}

/// The "Security policy" menu operation. Returns whether the device accepted
/// the rule.
pub fn create_security_policy<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    firewall: &Firewall,
    settings: &Settings,
) -> Result<bool, ConsoleError> {
    let draft = RuleDraft::collect(console)?;
    let rule = draft.into_rule();

    match Rulebase::for_vsys(firewall, settings.vsys.as_str()).apply(&rule) {
        Ok(()) => {
            console.line(success(format!("Rule '{}' created successfully.", rule.name)))?;
            Ok(true)
        }
        Err(err) => {
            warn!("rule '{}' rejected: {err}", rule.name);
            console.line(failure(format!("Failed to create rule: {err}")))?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use panos_xapi::testing::{error, success, ScriptedTransport};
    use panos_xapi::ApiRequest;
    use pretty_assertions::assert_eq;

    use super::{create_security_policy, RuleDraft};
    use crate::config::Settings;
    use crate::console::Console;

    #[test]
    fn blank_fields_take_defaults() {
        let mut console = Console::new(
            Cursor::new("web-out\ntrust\nuntrust\n\n  \n\n\nALLOW\n"),
            Vec::new(),
        );
        let draft = RuleDraft::collect(&mut console).expect("draft");

        assert_eq!(
            draft,
            RuleDraft {
                name: "web-out".to_string(),
                from_zone: "trust".to_string(),
                to_zone: "untrust".to_string(),
                source: "any".to_string(),
                destination: "any".to_string(),
                application: "any".to_string(),
                service: "application-default".to_string(),
                action: "allow".to_string(),
            }
        );
    }

    #[test]
    fn zones_and_name_have_no_default() {
        let mut console = Console::new(Cursor::new("\n\n\n10.0.0.0/24\n\nssl\nservice-https\ndeny\n"), Vec::new());
        let rule = RuleDraft::collect(&mut console).expect("draft").into_rule();

        assert_eq!(rule.name, "");
        assert_eq!(rule.from_zones, vec![""]);
        assert_eq!(rule.sources, vec!["10.0.0.0/24"]);
        assert_eq!(rule.destinations, vec!["any"]);
        assert_eq!(rule.applications, vec!["ssl"]);
        assert_eq!(rule.services, vec!["service-https"]);
        assert_eq!(rule.action, "deny");
    }

    #[test]
    fn submits_rule_to_configured_vsys() {
        let (fw, log) = ScriptedTransport::firewall("0070", |_| Ok(success("")));
        let settings = Settings {
            vsys: "vsys2".to_string(),
            ..Settings::default()
        };
        let mut console = Console::new(Cursor::new("dns\ntrust\nuntrust\n\n\ndns\n\nallow\n"), Vec::new());

        assert!(create_security_policy(&mut console, &fw, &settings).expect("console"));
        let log = log.borrow();
        let [ApiRequest::EditConfig { xpath, element }] = log.as_slice() else {
            panic!("unexpected requests {:?}", log);
        };
        assert!(xpath.contains("entry[@name='vsys2']"));
        assert!(xpath.ends_with("rules/entry[@name='dns']"));
        assert!(element.contains("<from><member>trust</member></from>"));
        assert!(element.contains("<service><member>application-default</member></service>"));

        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(out.contains("Rule 'dns' created successfully."));
    }

    #[test]
    fn rejection_is_reported() {
        let (fw, _) = ScriptedTransport::firewall("0070", |_| Ok(error("zone 'dmz' is not a valid reference")));
        let mut console = Console::new(Cursor::new("r\ndmz\nuntrust\n\n\n\n\nallow\n"), Vec::new());

        assert!(!create_security_policy(&mut console, &fw, &Settings::default()).expect("console"));
        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(out.contains("Failed to create rule: device error: zone 'dmz' is not a valid reference"));
    }
}
