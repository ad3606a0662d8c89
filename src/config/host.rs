// ABOUTME: Host argument parsing.
// ABOUTME: Accepts "host", "user@host", "host:port" and "user@host:port".

/// A remote host as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub host: String,
    pub port: Option<u16>,
    pub user: Option<String>,
}

impl HostSpec {
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("host cannot be empty".to_string());
        }

        // Parse format: [user@]host[:port]
        let (user, rest) = match s.rsplit_once('@') {
            Some((user, rest)) if !user.is_empty() => (Some(user.to_string()), rest),
            Some(_) => return Err("user before '@' cannot be empty".to_string()),
            None => (None, s),
        };

        let (host, port) = match split_port(rest) {
            Some((host, port_str)) => {
                let port = port_str
                    .parse::<u16>()
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or_else(|| format!("invalid port: {}", port_str))?;
                (host, Some(port))
            }
            None => (rest.trim_start_matches('[').trim_end_matches(']'), None),
        };

        if host.is_empty() {
            return Err("hostname cannot be empty".to_string());
        }

        Ok(HostSpec {
            host: host.to_string(),
            port,
            user,
        })
    }
}

/// Split off a trailing `:port`, leaving bare IPv6 addresses intact.
fn split_port(s: &str) -> Option<(&str, &str)> {
    if let Some(inner) = s.strip_prefix('[') {
        // [addr]:port
        let (addr, tail) = inner.split_once(']')?;
        return tail.strip_prefix(':').map(|port| (addr, port));
    }
    match s.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => Some((host, port)),
        _ => None,
    }
}
