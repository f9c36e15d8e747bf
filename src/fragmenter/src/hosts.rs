//! Replica assignment.
//!
//! JDBC data is remote, so replicas are advisory. The fragmenter cannot see the other PXF
//! hosts and reports only its own address.
use common::{Fragment, FragmenterError};
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

/// Resolves the address reported as the replica of every fragment.
pub trait HostResolver: Send + Sync {
    fn local_address(&self) -> Result<String, FragmenterError>;
}

/// Address of this host.
///
/// Looks up the machine's hostname first. When the name does not resolve, falls back to the
/// source address of a UDP route to `probe_addr`; connecting only selects a route, no packet
/// is sent.
pub struct LocalHost {
    /// Name to look up, the OS hostname when unset.
    hostname: Option<String>,
    /// Any routable address; used only for route selection.
    probe_addr: String,
}

impl LocalHost {
    pub fn new() -> Self {
        Self {
            hostname: None,
            probe_addr: String::from("192.0.2.1:9"),
        }
    }

    fn lookup_hostname(&self) -> io::Result<String> {
        let hostname = match &self.hostname {
            Some(name) => name.clone(),
            None => gethostname::gethostname().into_string().map_err(|name| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("hostname {:?} is not UTF-8", name),
                )
            })?,
        };
        let addrs: Vec<SocketAddr> = (hostname.as_str(), 0).to_socket_addrs()?.collect();
        addrs
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addrs.first())
            .map(|a| a.ip().to_string())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("hostname '{}' has no address", hostname),
                )
            })
    }

    fn probe_route(&self) -> io::Result<String> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(&self.probe_addr)?;
        Ok(socket.local_addr()?.ip().to_string())
    }
}

impl Default for LocalHost {
    fn default() -> Self {
        LocalHost::new()
    }
}

impl HostResolver for LocalHost {
    fn local_address(&self) -> Result<String, FragmenterError> {
        let lookup_err = match self.lookup_hostname() {
            Ok(address) => return Ok(address),
            Err(e) => e,
        };
        debug!("Hostname lookup failed ({}), probing a route", lookup_err);
        self.probe_route().map_err(|e| {
            FragmenterError::HostResolutionError(format!(
                "cannot resolve the local host address: {}; {}",
                lookup_err, e
            ))
        })
    }
}

/// Always reports the same address.
pub struct FixedHost {
    address: String,
}

impl FixedHost {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
        }
    }
}

impl HostResolver for FixedHost {
    fn local_address(&self) -> Result<String, FragmenterError> {
        Ok(self.address.clone())
    }
}

/// Sets the local host as the only replica of every fragment.
///
/// The address is resolved once; a resolution failure fails the whole request.
///
/// # Arguments
///
/// * `fragments` - Fragments to assign.
/// * `resolver` - Source of the local address.
pub fn prepare_hosts(
    fragments: &mut [Fragment],
    resolver: &dyn HostResolver,
) -> Result<(), FragmenterError> {
    let host = resolver.local_address()?;
    debug!("Assigning replica {} to {} fragments", host, fragments.len());
    for fragment in fragments.iter_mut() {
        fragment.set_replicas(vec![host.clone()]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    struct Unresolvable;

    impl HostResolver for Unresolvable {
        fn local_address(&self) -> Result<String, FragmenterError> {
            Err(FragmenterError::HostResolutionError(String::from(
                "no address",
            )))
        }
    }

    #[test]
    fn test_prepare_hosts() {
        let mut fragments = vec![
            Fragment::new("sales", vec![1]),
            Fragment::new("sales", vec![2]),
        ];
        prepare_hosts(&mut fragments, &FixedHost::new("10.1.2.3")).unwrap();
        for fragment in &fragments {
            assert_eq!(vec![String::from("10.1.2.3")], fragment.replicas);
        }
    }

    #[test]
    fn test_prepare_hosts_failure() {
        let mut fragments = vec![Fragment::new("sales", Vec::new())];
        let err = prepare_hosts(&mut fragments, &Unresolvable).unwrap_err();
        assert_eq!(500, err.http_status());
        assert!(fragments[0].replicas.is_empty());
    }

    #[test]
    fn test_local_host_by_name() {
        let resolver = LocalHost {
            hostname: Some(String::from("localhost")),
            probe_addr: String::from("not an address"),
        };
        let address: IpAddr = resolver.local_address().unwrap().parse().unwrap();
        assert!(address.is_loopback());
    }

    #[test]
    fn test_local_host_falls_back_to_route() {
        let resolver = LocalHost {
            hostname: Some(String::from("no\0such-host")),
            probe_addr: String::from("127.0.0.1:9"),
        };
        assert_eq!("127.0.0.1", resolver.local_address().unwrap());
    }

    #[test]
    fn test_local_host_unresolvable() {
        let resolver = LocalHost {
            hostname: Some(String::from("no\0such-host")),
            probe_addr: String::from("not an address"),
        };
        assert!(matches!(
            resolver.local_address(),
            Err(FragmenterError::HostResolutionError(_))
        ));
    }
}
