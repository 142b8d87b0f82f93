// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Parsing and manipulating `opc.tcp://` endpoint URLs.

use log::error;
use url::Url;

use opcua_types::StatusCode;

/// Scheme used by the OPC UA binary TCP transport.
pub const OPC_TCP_SCHEME: &str = "opc.tcp";

fn opc_url_from_str(s: &str) -> Result<Url, url::ParseError> {
    Url::parse(s).map(|mut url| {
        if url.port().is_none() {
            let _ = url.set_port(Some(opcua_types::constants::DEFAULT_OPC_UA_SERVER_PORT));
        }
        url
    })
}

/// Replaces the hostname in `url`, keeping scheme, port, and path.
pub fn url_with_replaced_hostname(url: &str, hostname: &str) -> Result<String, url::ParseError> {
    let mut url = opc_url_from_str(url)?;
    let _ = url.set_host(Some(hostname));
    Ok(url.into())
}

/// Returns `true` if `url1` and `url2` agree on everything but the
/// hostname, useful when a server's advertised endpoint doesn't exactly
/// match the address the client dialed (e.g. `localhost` vs `127.0.0.1`).
pub fn url_matches_except_host(url1: &str, url2: &str) -> bool {
    let (Ok(mut url1), Ok(mut url2)) = (opc_url_from_str(url1), opc_url_from_str(url2)) else {
        error!("cannot parse one of \"{}\", \"{}\"", url1, url2);
        return false;
    };
    if url1.set_host(Some("xxxx")).is_ok() && url2.set_host(Some("xxxx")).is_ok() {
        url1.as_str().trim_end_matches('/') == url2.as_str().trim_end_matches('/')
    } else {
        false
    }
}

/// Strips the path and query from an endpoint URL, leaving just
/// `scheme://host[:port]`.
pub fn server_url_from_endpoint_url(endpoint_url: &str) -> Result<String, url::ParseError> {
    opc_url_from_str(endpoint_url).map(|mut url| {
        url.set_query(None);
        if let Some(port) = url.port() {
            if port == opcua_types::constants::DEFAULT_OPC_UA_SERVER_PORT {
                let _ = url.set_port(None);
            }
        }
        url.into()
    })
}

/// `true` if `url` parses as an `opc.tcp://` URL.
pub fn is_opc_ua_binary_url(url: &str) -> bool {
    opc_url_from_str(url)
        .map(|u| u.scheme() == OPC_TCP_SCHEME)
        .unwrap_or(false)
}

/// Splits an endpoint URL into `(host, port)`, defaulting the port if the
/// URL doesn't specify one.
pub fn hostname_port_from_url(url: &str, default_port: u16) -> Result<(String, u16), StatusCode> {
    let url = Url::parse(url).map_err(|_| StatusCode::BadTcpEndpointUrlInvalid)?;
    if url.scheme() != OPC_TCP_SCHEME || !url.has_host() {
        return Err(StatusCode::BadTcpEndpointUrlInvalid);
    }
    let host = url.host_str().unwrap().to_string();
    let port = url.port().unwrap_or(default_port);
    Ok((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_scheme() {
        assert!(is_opc_ua_binary_url("opc.tcp://foo/xyz"));
        assert!(!is_opc_ua_binary_url("http://foo/xyz"));
    }

    #[test]
    fn url_matches_ignoring_host() {
        assert!(url_matches_except_host(
            "opc.tcp://localhost/xyz",
            "opc.tcp://127.0.0.1/xyz"
        ));
        assert!(!url_matches_except_host(
            "opc.tcp://localhost/xyz",
            "opc.tcp://127.0.0.1/abc"
        ));
    }

    #[test]
    fn server_url_strips_path_and_default_port() {
        assert_eq!(
            "opc.tcp://localhost",
            server_url_from_endpoint_url("opc.tcp://localhost:4840/xyz?1").unwrap()
        );
        assert_eq!(
            "opc.tcp://localhost:4841",
            server_url_from_endpoint_url("opc.tcp://localhost:4841/xyz").unwrap()
        );
    }

    #[test]
    fn hostname_port_defaults() {
        assert_eq!(
            hostname_port_from_url("opc.tcp://localhost/xyz", 4840).unwrap(),
            ("localhost".to_string(), 4840)
        );
        assert_eq!(
            hostname_port_from_url("opc.tcp://localhost:12345/xyz", 4840).unwrap(),
            ("localhost".to_string(), 12345)
        );
    }
}
