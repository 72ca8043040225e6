use serde::{Deserialize, Serialize};

/// What the requester proved about itself.
///
/// Authentication happens upstream; an agent either presents a WebID or
/// nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub web_id: Option<String>,
}

impl Credentials {
    pub fn anonymous() -> Self { Self { web_id: None } }
    pub fn agent(web_id: impl Into<String>) -> Self { Self { web_id: Some(web_id.into()) } }

    pub fn is_authenticated(&self) -> bool {
        self.web_id.is_some()
    }
}
