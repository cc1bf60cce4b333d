use std::collections::HashSet;

/// Usernames that endpoints may target. Fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    ordered: Vec<String>,
    members: HashSet<String>,
}

impl AllowList {
    pub fn new(targets: Vec<String>) -> Self {
        let members = targets.iter().cloned().collect();
        Self {
            ordered: targets,
            members,
        }
    }

    /// Parse a comma-separated list such as `alice,bob`.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(crate::config::parse_targets(raw))
    }

    pub fn contains(&self, username: &str) -> bool {
        self.members.contains(username)
    }

    /// True only if every requested username is listed.
    pub fn contains_all<S: AsRef<str>>(&self, usernames: &[S]) -> bool {
        usernames.iter().all(|u| self.contains(u.as_ref()))
    }

    /// Entries in configuration order.
    pub fn usernames(&self) -> &[String] {
        &self.ordered
    }
}
