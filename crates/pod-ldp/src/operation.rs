use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use pod_auth::{AccessMode, PermissionSet};
use pod_rdf::SparqlUpdate;
use pod_store::sanitize_slug;
use pod_types::content_types::APPLICATION_SPARQL_UPDATE;
use pod_types::representation::keys;
use pod_types::{Representation, RepresentationData, RepresentationPreferences, ResourceIdentifier};

use crate::error::LdpError;

/// LDP request methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

impl FromStr for Method {
    type Err = LdpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(LdpError::BadRequest(format!("unsupported method {other}"))),
        }
    }
}

/// A request against the pod, independent of transport.
#[derive(Debug)]
pub struct Operation {
    pub method: Method,
    pub target: ResourceIdentifier,
    pub preferences: RepresentationPreferences,
    pub body: Option<Representation>,
}

impl Operation {
    pub fn new(method: Method, target: ResourceIdentifier) -> Self {
        Self {
            method,
            target,
            preferences: RepresentationPreferences::any(),
            body: None,
        }
    }

    pub fn get(target: ResourceIdentifier) -> Self { Self::new(Method::Get, target) }
    pub fn head(target: ResourceIdentifier) -> Self { Self::new(Method::Head, target) }
    pub fn delete(target: ResourceIdentifier) -> Self { Self::new(Method::Delete, target) }

    pub fn post(container: ResourceIdentifier, body: Representation) -> Self {
        Self::new(Method::Post, container).with_body(body)
    }

    pub fn put(target: ResourceIdentifier, body: Representation) -> Self {
        Self::new(Method::Put, target).with_body(body)
    }

    /// PATCH with a SPARQL Update body.
    pub fn patch(target: ResourceIdentifier, update: impl Into<String>) -> Self {
        let body = Representation::binary(APPLICATION_SPARQL_UPDATE, update.into());
        Self::new(Method::Patch, target).with_body(body)
    }

    pub fn with_body(mut self, body: Representation) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_preferences(mut self, preferences: RepresentationPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Access modes the operation needs on its target.
    ///
    /// A PATCH that only inserts needs `append`; one that may delete, or
    /// that cannot be parsed, needs `write` (and fails later if malformed).
    pub fn required_modes(&self) -> PermissionSet {
        match self.method {
            Method::Get | Method::Head => AccessMode::Read.into(),
            Method::Post => AccessMode::Append.into(),
            Method::Put | Method::Delete => AccessMode::Write.into(),
            Method::Patch => match self.parsed_update() {
                Some(update) if !update.has_deletions() => AccessMode::Append.into(),
                _ => AccessMode::Write.into(),
            },
        }
    }

    /// The child a POST asks to create through its slug, if any.
    ///
    /// The store may still pick another name when this one is taken.
    pub fn requested_child(&self) -> Option<ResourceIdentifier> {
        if self.method != Method::Post {
            return None;
        }
        let metadata = &self.body.as_ref()?.metadata;
        let name = sanitize_slug(metadata.get(keys::SLUG)?);
        if name.is_empty() {
            return None;
        }
        let suffix = if metadata.wants_container() { "/" } else { "" };
        Some(self.target.join(&format!("{name}{suffix}")))
    }

    fn parsed_update(&self) -> Option<SparqlUpdate> {
        let body = self.body.as_ref()?;
        if !body
            .content_type()
            .eq_ignore_ascii_case(APPLICATION_SPARQL_UPDATE)
        {
            return None;
        }
        match &body.data {
            RepresentationData::Binary(bytes) => {
                SparqlUpdate::parse_bytes(bytes, Some(self.target.as_str())).ok()
            }
            RepresentationData::Quads(_) => None,
        }
    }
}

/// Transport-independent description of a response.
#[derive(Debug)]
pub struct ResponseDescription {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Representation>,
}

impl ResponseDescription {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// 200 with the representation as body.
    pub fn ok(body: Representation) -> Self {
        let mut response = Self::new(200);
        response.set_header("Content-Type", body.content_type().to_owned());
        response.body = Some(body);
        response
    }

    /// 200 carrying only the headers of `representation`.
    pub fn ok_head(representation: &Representation) -> Self {
        let mut response = Self::new(200);
        response.set_header("Content-Type", representation.content_type().to_owned());
        response
    }

    /// 201 pointing at the new resource.
    pub fn created(location: &ResourceIdentifier) -> Self {
        let mut response = Self::new(201);
        response.set_header("Location", location.to_string());
        response
    }

    /// 205: the target changed, clients should refetch.
    pub fn reset() -> Self {
        Self::new(205)
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Header lookup, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_types::content_types::TEXT_TURTLE;
    use pod_types::representation::CONTAINER_MODEL;

    fn id() -> ResourceIdentifier {
        ResourceIdentifier::new("http://test.com/doc")
    }

    #[test]
    fn modes_per_method() {
        let body = || Representation::binary(TEXT_TURTLE, "<s> <p> <o>.");
        assert_eq!(
            Operation::get(id()).required_modes(),
            PermissionSet::from(AccessMode::Read)
        );
        assert_eq!(
            Operation::head(id()).required_modes(),
            PermissionSet::from(AccessMode::Read)
        );
        assert_eq!(
            Operation::post(ResourceIdentifier::new("http://test.com/"), body()).required_modes(),
            PermissionSet::from(AccessMode::Append)
        );
        assert_eq!(
            Operation::put(id(), body()).required_modes(),
            PermissionSet::from(AccessMode::Write)
        );
        assert_eq!(
            Operation::delete(id()).required_modes(),
            PermissionSet::from(AccessMode::Write)
        );
    }

    #[test]
    fn patch_modes_depend_on_deletions() {
        let insert = Operation::patch(id(), "INSERT DATA { <s> <p> <o> }");
        assert_eq!(insert.required_modes(), PermissionSet::from(AccessMode::Append));

        let delete = Operation::patch(id(), "DELETE DATA { <s> <p> <o> }");
        assert_eq!(delete.required_modes(), PermissionSet::from(AccessMode::Write));

        let modify = Operation::patch(
            id(),
            "DELETE { ?s <p> ?o } INSERT { ?s <q> ?o } WHERE { ?s <p> ?o }",
        );
        assert_eq!(modify.required_modes(), PermissionSet::from(AccessMode::Write));

        let broken = Operation::patch(id(), "INSERT DATA {");
        assert_eq!(broken.required_modes(), PermissionSet::from(AccessMode::Write));

        let other_type = Operation::new(Method::Patch, id())
            .with_body(Representation::binary("text/n3", "@prefix : <#>."));
        assert_eq!(other_type.required_modes(), PermissionSet::from(AccessMode::Write));
    }

    #[test]
    fn requested_child_follows_slug() {
        let inbox = ResourceIdentifier::new("http://test.com/inbox/");
        let mut body = Representation::binary(TEXT_TURTLE, "");
        body.metadata.set(keys::SLUG, "my note.acl");
        let post = Operation::post(inbox.clone(), body);
        assert_eq!(
            post.requested_child().unwrap().as_str(),
            "http://test.com/inbox/mynote.acl"
        );

        let mut body = Representation::binary(TEXT_TURTLE, "");
        body.metadata.set(keys::SLUG, "photos");
        body.metadata.set(keys::INTERACTION_MODEL, CONTAINER_MODEL);
        let post = Operation::post(inbox.clone(), body);
        assert_eq!(
            post.requested_child().unwrap().as_str(),
            "http://test.com/inbox/photos/"
        );

        let unnamed = Operation::post(inbox.clone(), Representation::binary(TEXT_TURTLE, ""));
        assert!(unnamed.requested_child().is_none());
        let mut body = Representation::binary(TEXT_TURTLE, "");
        body.metadata.set(keys::SLUG, "/");
        assert!(Operation::post(inbox, body).requested_child().is_none());
        assert!(Operation::get(id()).requested_child().is_none());
    }

    #[test]
    fn method_names() {
        assert_eq!("patch".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert!(matches!("TRACE".parse::<Method>(), Err(LdpError::BadRequest(_))));
    }

    #[test]
    fn response_headers_are_case_insensitive() {
        let mut response = ResponseDescription::created(&id());
        assert_eq!(response.status, 201);
        assert_eq!(response.header("location"), Some("http://test.com/doc"));
        response.set_header("WAC-Allow", "user=\"read\",public=\"\"");
        assert_eq!(response.header("wac-allow"), Some("user=\"read\",public=\"\""));
        assert!(response.is_success());
        assert!(!ResponseDescription::new(404).is_success());
    }
}
