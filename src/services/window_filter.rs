use crate::platform::{WindowError, WindowInspector};

/// Case-insensitive "focused window title contains" predicate.
///
/// An absent or empty filter places no restriction.
#[derive(Debug, Clone, Default)]
pub struct WindowFilter {
    needle: Option<String>,
}

impl WindowFilter {
    pub fn new(filter: Option<&str>) -> Self {
        Self {
            needle: filter.filter(|f| !f.is_empty()).map(str::to_lowercase),
        }
    }

    pub fn is_active(&self) -> bool {
        self.needle.is_some()
    }

    /// True iff no filter is set, or a title exists and contains the filter.
    pub fn matches(&self, title: Option<&str>) -> bool {
        match (&self.needle, title) {
            (None, _) => true,
            (Some(needle), Some(title)) => title.to_lowercase().contains(needle.as_str()),
            (Some(_), None) => false,
        }
    }

    /// Query the inspector only when a filter is configured.
    pub fn allows(&self, inspector: &mut dyn WindowInspector) -> Result<bool, WindowError> {
        if !self.is_active() {
            return Ok(true);
        }
        let title = inspector.active_title()?;
        Ok(self.matches(title.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockWindowInspector;

    #[test]
    fn test_substring_match_ignores_case() {
        let filter = WindowFilter::new(Some("Visual Studio Code"));
        assert!(filter.matches(Some("main.py - Visual Studio Code")));
        assert!(filter.matches(Some("MAIN.PY - VISUAL STUDIO CODE")));
        assert!(!filter.matches(Some("Terminal")));
        assert!(!filter.matches(None));
    }

    #[test]
    fn test_no_filter_allows_everything() {
        for filter in [WindowFilter::new(None), WindowFilter::new(Some(""))] {
            assert!(!filter.is_active());
            assert!(filter.matches(None));
            assert!(filter.matches(Some("anything")));
        }
    }

    #[test]
    fn test_allows_skips_query_without_filter() {
        let mut inspector = MockWindowInspector::new();
        inspector.expect_active_title().times(0);

        assert!(WindowFilter::new(None).allows(&mut inspector).unwrap());
    }

    #[test]
    fn test_allows_queries_title() {
        let mut inspector = MockWindowInspector::new();
        inspector
            .expect_active_title()
            .times(1)
            .returning(|| Ok(Some("Terminal".to_string())));

        let filter = WindowFilter::new(Some("code"));
        assert!(!filter.allows(&mut inspector).unwrap());
    }

    #[test]
    fn test_allows_propagates_errors() {
        let mut inspector = MockWindowInspector::new();
        inspector
            .expect_active_title()
            .returning(|| Err(WindowError::Backend("no session".into())));

        assert!(WindowFilter::new(Some("code")).allows(&mut inspector).is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_title_containing_filter_matches(
            prefix in "[a-zA-Z0-9 .-]{0,12}",
            needle in "[a-zA-Z]{1,12}",
            suffix in "[a-zA-Z0-9 .-]{0,12}"
        ) {
            let filter = WindowFilter::new(Some(&needle));
            let title = format!("{}{}{}", prefix, needle.to_uppercase(), suffix);
            proptest::prop_assert!(filter.matches(Some(&title)));
        }
    }
}
