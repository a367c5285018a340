use regex::Regex;

/// Ordered allow-list of class path patterns. An entity's class is admitted
/// when any pattern matches.
#[derive(Debug, Default)]
pub struct ClassFilter {
    patterns: Vec<Regex>,
}

impl ClassFilter {
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| Regex::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn admits(&self, class_path: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.is_match(class_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_match_admits() {
        let filter =
            ClassFilter::from_patterns(["^/Game/NWX/", "BP_Door"]).expect("patterns");
        assert!(filter.admits("/Game/NWX/Props/BP_Crate.BP_Crate_C"));
        assert!(filter.admits("/Game/Legacy/BP_Door.BP_Door_C"));
        assert!(!filter.admits("/Game/Legacy/BP_Window.BP_Window_C"));
    }

    #[test]
    fn empty_filter_admits_nothing() {
        let filter = ClassFilter::default();
        assert!(!filter.admits("/Game/NWX/Props/BP_Crate.BP_Crate_C"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(ClassFilter::from_patterns(["("]).is_err());
    }
}
