//! Robots.txt parser implementation
//!
//! Matching is delegated to the robotstxt crate; crawl-delay, which that
//! crate does not expose, is read directly from the file.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty means allow all)
    content: String,
}

impl ParsedRobots {
    /// Wraps raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// A permissive policy, used when robots.txt is missing or unreadable
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Checks if a URL is allowed for the given agent token
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the page
    /// * `agent` - Product token such as `docprint`
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, agent, url)
    }

    /// Gets the crawl delay for an agent, in seconds
    ///
    /// A group naming the agent wins over the `*` group.
    pub fn crawl_delay(&self, agent: &str) -> Option<f64> {
        let agent = agent.to_lowercase();
        let mut group: Vec<String> = Vec::new();
        let mut group_open = false;
        let mut wildcard_delay = None;
        let mut agent_delay = None;

        for line in self.content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                // A user-agent line after rules starts a new group
                if !group_open {
                    group.clear();
                }
                group.push(value.to_lowercase());
                group_open = true;
                continue;
            }

            group_open = false;

            if key == "crawl-delay" {
                let Ok(delay) = value.parse::<f64>() else {
                    continue;
                };
                if group
                    .iter()
                    .any(|ua| ua != "*" && !ua.is_empty() && agent.contains(ua.as_str()))
                {
                    agent_delay = Some(delay);
                } else if group.iter().any(|ua| ua == "*") {
                    wildcard_delay = Some(delay);
                }
            }
        }

        agent_delay.or(wildcard_delay)
    }
}
