//! Reverse URL resolution: route name + captured params -> path.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReverseError {
    #[error("no route named {0:?}")]
    UnknownName(String),
    #[error("route {name:?} needs param {param:?}")]
    MissingParam { name: String, param: String },
}

/// Immutable name -> pattern table built once per site. Disabled
/// actions never enter it, so reversing them fails.
#[derive(Debug, Default)]
pub struct Reverser {
    patterns: HashMap<String, String>,
}

impl Reverser {
    pub(crate) fn new(patterns: HashMap<String, String>) -> Self {
        Reverser { patterns }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    pub fn pattern(&self, name: &str) -> Option<&str> {
        self.patterns.get(name).map(String::as_str)
    }

    /// Substitute `:param` segments of the named pattern.
    pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Result<String, ReverseError> {
        let pattern = self
            .patterns
            .get(name)
            .ok_or_else(|| ReverseError::UnknownName(name.to_string()))?;
        let mut out = String::with_capacity(pattern.len());
        for (i, segment) in pattern.split('/').enumerate() {
            if i > 0 {
                out.push('/');
            }
            if let Some(param) = segment.strip_prefix(':') {
                let value = params
                    .iter()
                    .find(|(k, _)| *k == param)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| ReverseError::MissingParam {
                        name: name.to_string(),
                        param: param.to_string(),
                    })?;
                out.push_str(value);
            } else {
                out.push_str(segment);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reverser() -> Reverser {
        let mut patterns = HashMap::new();
        patterns.insert("page-index".to_string(), "/page/".to_string());
        patterns.insert("page-edit".to_string(), "/page/:pk/edit/".to_string());
        Reverser::new(patterns)
    }

    #[test]
    fn substitutes_params() {
        let r = reverser();
        assert_eq!(r.reverse("page-index", &[]).unwrap(), "/page/");
        assert_eq!(r.reverse("page-edit", &[("pk", "5")]).unwrap(), "/page/5/edit/");
    }

    #[test]
    fn missing_param_and_unknown_name_fail() {
        let r = reverser();
        assert!(matches!(
            r.reverse("page-edit", &[]),
            Err(ReverseError::MissingParam { .. })
        ));
        assert!(matches!(
            r.reverse("page-remove", &[]),
            Err(ReverseError::UnknownName(_))
        ));
    }
}
