use std::collections::BTreeSet;

use pod_rdf::vocab::{acl, foaf};
use pod_rdf::Graph;
use pod_types::{ResourceIdentifier, Term, Triple};

use crate::credentials::Credentials;
use crate::modes::{AccessMode, PermissionSet};

/// Who a rule grants access to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AgentClass {
    /// `acl:agentClass foaf:Agent`: everyone.
    Public,
    /// `acl:agentClass acl:AuthenticatedAgent`: anyone with a WebID.
    Authenticated,
    /// `acl:agent <webid>`.
    Agent(String),
}

impl AgentClass {
    pub fn matches(&self, credentials: &Credentials) -> bool {
        match self {
            AgentClass::Public => true,
            AgentClass::Authenticated => credentials.is_authenticated(),
            AgentClass::Agent(web_id) => credentials.web_id.as_deref() == Some(web_id.as_str()),
        }
    }
}

/// One authorization from an ACL document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AclRule {
    /// The node describing the authorization.
    pub node: Term,
    pub agents: Vec<AgentClass>,
    pub modes: PermissionSet,
    /// Resources the rule governs directly.
    pub access_to: Vec<ResourceIdentifier>,
    /// Containers whose descendants inherit the rule.
    pub default: Vec<ResourceIdentifier>,
}

impl AclRule {
    /// Whether the rule is in scope for `target`. Direct lookups honour both
    /// `acl:accessTo` and `acl:default`, inherited lookups only
    /// `acl:default`.
    pub fn applies_to(&self, target: &ResourceIdentifier, direct: bool) -> bool {
        self.default.contains(target) || (direct && self.access_to.contains(target))
    }

    pub fn matches_agent(&self, credentials: &Credentials) -> bool {
        self.agents.iter().any(|agent| agent.matches(credentials))
    }

    /// Extract every authorization from the triples of an ACL document.
    ///
    /// A node is an authorization when it names a target via `acl:accessTo`
    /// or `acl:default`. Unknown modes and agent classes are ignored.
    pub fn from_triples(triples: Vec<Triple>) -> Vec<AclRule> {
        let graph: Graph = triples.into_iter().collect();
        let nodes: BTreeSet<&Term> = graph
            .iter()
            .filter(|t| matches!(t.predicate.as_iri(), Some(acl::ACCESS_TO | acl::DEFAULT)))
            .map(|t| &t.subject)
            .collect();

        nodes
            .into_iter()
            .map(|node| {
                let targets = |predicate: &str| -> Vec<ResourceIdentifier> {
                    graph
                        .objects(node, predicate)
                        .filter_map(Term::as_iri)
                        .map(ResourceIdentifier::new)
                        .collect()
                };
                let mut agents: Vec<AgentClass> = graph
                    .objects(node, acl::AGENT_CLASS)
                    .filter_map(|class| match class.as_iri() {
                        Some(foaf::AGENT) => Some(AgentClass::Public),
                        Some(acl::AUTHENTICATED_AGENT) => Some(AgentClass::Authenticated),
                        _ => None,
                    })
                    .collect();
                agents.extend(
                    graph
                        .objects(node, acl::AGENT)
                        .filter_map(Term::as_iri)
                        .map(|web_id| AgentClass::Agent(web_id.to_owned())),
                );
                AclRule {
                    node: node.clone(),
                    agents,
                    modes: graph
                        .objects(node, acl::MODE)
                        .filter_map(Term::as_iri)
                        .filter_map(AccessMode::from_iri)
                        .collect(),
                    access_to: targets(acl::ACCESS_TO),
                    default: targets(acl::DEFAULT),
                }
            })
            .collect()
    }
}

/// Maps resources to the ACL resources describing them.
pub trait AclManager: Send + Sync {
    /// The ACL resource governing `id`.
    fn acl_identifier(&self, id: &ResourceIdentifier) -> ResourceIdentifier;

    fn is_acl(&self, id: &ResourceIdentifier) -> bool;

    /// The resource an ACL resource governs. `None` if `id` is not an ACL.
    fn resource_identifier(&self, id: &ResourceIdentifier) -> Option<ResourceIdentifier>;
}

/// ACL resources live at `<resource><suffix>`, e.g. `/doc.acl` or
/// `/container/.acl`.
#[derive(Clone, Debug)]
pub struct UrlBasedAclManager {
    suffix: String,
}

impl UrlBasedAclManager {
    pub const DEFAULT_SUFFIX: &'static str = ".acl";

    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl Default for UrlBasedAclManager {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SUFFIX)
    }
}

impl AclManager for UrlBasedAclManager {
    fn acl_identifier(&self, id: &ResourceIdentifier) -> ResourceIdentifier {
        id.with_suffix(&self.suffix)
    }

    fn is_acl(&self, id: &ResourceIdentifier) -> bool {
        !id.is_container() && id.as_str().ends_with(&self.suffix)
    }

    fn resource_identifier(&self, id: &ResourceIdentifier) -> Option<ResourceIdentifier> {
        if self.is_acl(id) {
            id.strip_suffix(&self.suffix)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_rdf::parse_turtle;

    const ACL: &str = r#"
        @prefix acl: <http://www.w3.org/ns/auth/acl#>.
        @prefix foaf: <http://xmlns.com/foaf/0.1/>.

        <#public>
            a acl:Authorization;
            acl:agentClass foaf:Agent;
            acl:mode acl:Read;
            acl:accessTo <./>;
            acl:default <./>.

        <#owner>
            a acl:Authorization;
            acl:agent <https://alice.example/#me>;
            acl:agentClass acl:AuthenticatedAgent;
            acl:mode acl:Write, acl:Control, <http://example.org/Unknown>;
            acl:accessTo <./>.
    "#;

    fn rules() -> Vec<AclRule> {
        let triples = parse_turtle(ACL, Some("http://test.com/.acl")).unwrap();
        AclRule::from_triples(triples)
    }

    fn rule(name: &str) -> AclRule {
        rules()
            .into_iter()
            .find(|r| r.node == Term::named(format!("http://test.com/.acl#{name}")))
            .unwrap()
    }

    // -----------------------------------------------------------------------
    // Rule extraction
    // -----------------------------------------------------------------------

    #[test]
    fn extracts_all_authorizations() {
        assert_eq!(rules().len(), 2);

        let public = rule("public");
        assert_eq!(public.agents, vec![AgentClass::Public]);
        assert_eq!(public.modes, PermissionSet::from(AccessMode::Read));
        assert_eq!(public.access_to, vec![ResourceIdentifier::new("http://test.com/")]);
        assert_eq!(public.default, vec![ResourceIdentifier::new("http://test.com/")]);

        let owner = rule("owner");
        assert!(owner.agents.contains(&AgentClass::Authenticated));
        assert!(owner
            .agents
            .contains(&AgentClass::Agent("https://alice.example/#me".into())));
        assert_eq!(
            owner.modes,
            PermissionSet::of(&[AccessMode::Write, AccessMode::Control])
        );
        assert!(owner.default.is_empty());
    }

    #[test]
    fn scope_depends_on_directness() {
        let root = ResourceIdentifier::new("http://test.com/");
        let owner = rule("owner");
        assert!(owner.applies_to(&root, true));
        assert!(!owner.applies_to(&root, false));

        let public = rule("public");
        assert!(public.applies_to(&root, false));
        assert!(!public.applies_to(&ResourceIdentifier::new("http://test.com/a/"), true));
    }

    #[test]
    fn agent_matching() {
        let anonymous = Credentials::anonymous();
        let alice = Credentials::agent("https://alice.example/#me");
        let bob = Credentials::agent("https://bob.example/#me");

        assert!(rule("public").matches_agent(&anonymous));
        assert!(!rule("owner").matches_agent(&anonymous));
        assert!(rule("owner").matches_agent(&alice));
        assert!(rule("owner").matches_agent(&bob));
        assert!(!AgentClass::Agent("https://alice.example/#me".into()).matches(&bob));
    }

    // -----------------------------------------------------------------------
    // ACL naming
    // -----------------------------------------------------------------------

    #[test]
    fn url_based_acl_names() {
        let manager = UrlBasedAclManager::default();
        let doc = ResourceIdentifier::new("http://test.com/doc");
        let container = ResourceIdentifier::new("http://test.com/a/");

        assert_eq!(manager.acl_identifier(&doc).as_str(), "http://test.com/doc.acl");
        assert_eq!(manager.acl_identifier(&container).as_str(), "http://test.com/a/.acl");

        let acl = manager.acl_identifier(&container);
        assert!(manager.is_acl(&acl));
        assert!(!manager.is_acl(&container));
        assert_eq!(manager.resource_identifier(&acl), Some(container));
        assert_eq!(manager.resource_identifier(&doc), None);
    }
}
