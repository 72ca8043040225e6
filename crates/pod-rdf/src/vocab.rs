//! Vocabulary IRIs.

pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

pub mod xsd {
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
}

pub mod acl {
    pub const NAMESPACE: &str = "http://www.w3.org/ns/auth/acl#";
    pub const AUTHORIZATION: &str = "http://www.w3.org/ns/auth/acl#Authorization";
    pub const ACCESS_TO: &str = "http://www.w3.org/ns/auth/acl#accessTo";
    pub const DEFAULT: &str = "http://www.w3.org/ns/auth/acl#default";
    pub const AGENT: &str = "http://www.w3.org/ns/auth/acl#agent";
    pub const AGENT_CLASS: &str = "http://www.w3.org/ns/auth/acl#agentClass";
    pub const AUTHENTICATED_AGENT: &str = "http://www.w3.org/ns/auth/acl#AuthenticatedAgent";
    pub const MODE: &str = "http://www.w3.org/ns/auth/acl#mode";
    pub const READ: &str = "http://www.w3.org/ns/auth/acl#Read";
    pub const APPEND: &str = "http://www.w3.org/ns/auth/acl#Append";
    pub const WRITE: &str = "http://www.w3.org/ns/auth/acl#Write";
    pub const CONTROL: &str = "http://www.w3.org/ns/auth/acl#Control";
}

pub mod foaf {
    pub const AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";
}

pub mod ldp {
    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
    pub const CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
    pub const RESOURCE: &str = "http://www.w3.org/ns/ldp#Resource";
}
