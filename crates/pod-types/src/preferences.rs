//! Ranked content-type preferences (the `Accept` model).

use crate::content_types::is_internal;
use crate::error::TypeError;

/// One acceptable media range with its quality.
#[derive(Clone, Debug, PartialEq)]
pub struct Preference {
    pub value: String,
    pub weight: f32,
}

impl Preference {
    pub fn new(value: impl Into<String>, weight: f32) -> Self {
        Self {
            value: value.into(),
            weight,
        }
    }
}

/// The content-types a requester is willing to receive, in the order given.
///
/// An empty preference list accepts every type with weight `1.0`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RepresentationPreferences {
    pub types: Vec<Preference>,
}

impl RepresentationPreferences {
    /// Accept anything.
    pub fn any() -> Self {
        Self::default()
    }

    /// Accept exactly one type.
    pub fn single(content_type: &str) -> Self {
        Self {
            types: vec![Preference::new(content_type, 1.0)],
        }
    }

    pub fn from_types(types: &[(&str, f32)]) -> Self {
        Self {
            types: types
                .iter()
                .map(|(value, weight)| Preference::new(*value, *weight))
                .collect(),
        }
    }

    /// Parse an `Accept`-style header value such as
    /// `text/turtle;q=0.9, */*;q=0.1`.
    pub fn parse_accept(header: &str) -> Result<Self, TypeError> {
        let mut types = Vec::new();
        for part in header.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let mut params = part.split(';').map(str::trim);
            let range = params.next().unwrap_or_default().to_ascii_lowercase();
            let valid = range
                .split_once('/')
                .map(|(main, sub)| !main.is_empty() && !sub.is_empty())
                .unwrap_or(false);
            if !valid {
                return Err(TypeError::InvalidMediaRange(part.into()));
            }
            let mut weight = 1.0;
            for param in params {
                if let Some(q) = param.strip_prefix("q=") {
                    weight = q
                        .parse::<f32>()
                        .ok()
                        .filter(|w| (0.0..=1.0).contains(w))
                        .ok_or_else(|| TypeError::InvalidQuality(part.into()))?;
                }
            }
            types.push(Preference::new(range, weight));
        }
        Ok(Self { types })
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Quality of `content_type` under these preferences.
    ///
    /// The most specific matching range decides (`a/b` beats `a/*` beats
    /// `*/*`). Returns `0.0` when nothing matches.
    pub fn weight_for(&self, content_type: &str) -> f32 {
        if self.types.is_empty() {
            return 1.0;
        }
        self.types
            .iter()
            .filter(|pref| matches_media_type(&pref.value, content_type))
            .max_by_key(|pref| specificity(&pref.value))
            .map(|pref| pref.weight)
            .unwrap_or(0.0)
    }

    /// Returns `true` if `content_type` has a non-zero quality.
    pub fn accepts(&self, content_type: &str) -> bool {
        self.weight_for(content_type) > 0.0
    }
}

fn specificity(range: &str) -> u8 {
    match range.split_once('/') {
        Some(("*", "*")) => 0,
        Some((_, "*")) => 1,
        _ => 2,
    }
}

/// Returns `true` if the media `range` covers `content_type`.
///
/// Wildcard ranges never cover `internal/*` types unless the range itself
/// is internal.
pub fn matches_media_type(range: &str, content_type: &str) -> bool {
    let range = range.to_ascii_lowercase();
    let content_type = content_type.to_ascii_lowercase();
    let (range_main, range_sub) = match range.split_once('/') {
        Some(parts) => parts,
        None => return false,
    };
    let (main, sub) = match content_type.split_once('/') {
        Some(parts) => parts,
        None => return false,
    };
    if is_internal(&content_type) && range_main != "internal" {
        return false;
    }
    (range_main == "*" || range_main == main) && (range_sub == "*" || range_sub == sub)
}
