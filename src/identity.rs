//! Host and process identity used for record and lock provenance.

/// Who is acting: the host name and process id of the current process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Host name, or `unknown` if it cannot be determined.
    pub host: String,
    /// Operating-system process id.
    pub pid: u32,
}

impl Identity {
    /// Identity of the running process.
    pub fn current() -> Self {
        Self {
            host: host_name(),
            pid: std::process::id(),
        }
    }

    /// `user@host` string used as lock owner and event actor.
    pub fn owner_string(&self) -> String {
        format!("{}@{}", user_name(), self.host)
    }
}

/// Get the host name for provenance fields.
pub(crate) fn host_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

fn user_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_identity_matches_process() {
        let id = Identity::current();
        assert_eq!(id.pid, std::process::id());
        assert!(!id.host.is_empty());
    }

    #[test]
    fn owner_string_ends_with_host() {
        let id = Identity {
            host: "node7".to_string(),
            pid: 1,
        };
        let owner = id.owner_string();
        assert!(owner.ends_with("@node7"));
        assert!(!owner.starts_with('@'));
    }
}
