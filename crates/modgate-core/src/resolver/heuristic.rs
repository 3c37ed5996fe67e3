//! Filename-based identity fallback

/// Last-resort derivation of a module identity from its path
pub trait FallbackStrategy: Send + Sync {
    fn identity_for(&self, token: &str) -> Option<String>;
}

/// Takes the directory holding the module archive and strips the install
/// suffix after the first hyphen:
/// `/data/app/com.example.mod-1/base.apk` -> `com.example.mod`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSegmentHeuristic;

impl FallbackStrategy for PathSegmentHeuristic {
    fn identity_for(&self, token: &str) -> Option<String> {
        let mut segments: Vec<&str> = token.split('/').collect();
        while segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }
        if segments.len() < 2 {
            return None;
        }

        let parent = segments[segments.len() - 2];
        let name = parent.split('-').next().unwrap_or_default();
        (!name.is_empty()).then(|| name.to_string())
    }
}
