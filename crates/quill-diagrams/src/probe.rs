//! Rendering-service reachability checks with parallel HTTP requests.
//!
//! The build phase never contacts the service; the page fetches diagram URLs
//! itself. Probing lets an author confirm ahead of publishing that every
//! embedded URL actually renders:
//! - Issues one `GET` per diagram URL
//! - Uses the rayon thread pool for parallel requests
//! - Treats transport errors and non-2xx statuses as failures

use std::time::Duration;

use rayon::prelude::*;
use ureq::Agent;

use crate::block::DiagramBlock;
use crate::html::ServiceUrl;
use crate::language::RenderStrategy;

/// One URL to probe.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// Placeholder element id the URL belongs to.
    pub dom_id: String,
    pub url: String,
}

impl ProbeRequest {
    /// Build probe requests for every remotely rendered block.
    #[must_use]
    pub fn for_blocks(service: &ServiceUrl, blocks: &[DiagramBlock]) -> Vec<Self> {
        blocks
            .iter()
            .filter(|block| block.dialect().strategy() == RenderStrategy::Remote)
            .map(|block| Self {
                dom_id: block.dom_id(),
                url: service.diagram_url(block),
            })
            .collect()
    }
}

/// Successful probe.
#[derive(Debug)]
pub struct ProbeSuccess {
    pub dom_id: String,
    /// Size of the returned payload in bytes.
    pub bytes: usize,
}

/// Single probe failure.
#[derive(Debug, thiserror::Error)]
#[error("diagram {dom_id}: {kind}")]
pub struct ProbeError {
    pub dom_id: String,
    pub kind: ProbeErrorKind,
}

/// Kind of probe failure.
#[derive(Debug, thiserror::Error)]
pub enum ProbeErrorKind {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("I/O error: {0}")]
    Io(String),
}

/// Create an HTTP agent with the specified timeout.
///
/// Reuse the agent across probes for connection pooling.
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Fetch a single diagram URL.
fn probe_one(agent: &Agent, request: &ProbeRequest) -> Result<ProbeSuccess, ProbeError> {
    let fail = |kind| ProbeError {
        dom_id: request.dom_id.clone(),
        kind,
    };

    let response = agent
        .get(&request.url)
        .call()
        .map_err(|e| fail(ProbeErrorKind::Http(e.to_string())))?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if !(200..300).contains(&status) {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(fail(ProbeErrorKind::Status {
            status,
            body: error_body,
        }));
    }

    let bytes = body
        .read_to_vec()
        .map_err(|e| fail(ProbeErrorKind::Io(e.to_string())))?;

    Ok(ProbeSuccess {
        dom_id: request.dom_id.clone(),
        bytes: bytes.len(),
    })
}

/// Probe all requests in parallel.
///
/// Results are returned in request order. Every request is attempted; one
/// failure never prevents the others from running.
pub fn probe_all(agent: &Agent, requests: &[ProbeRequest]) -> Vec<Result<ProbeSuccess, ProbeError>> {
    let results: Vec<_> = requests
        .par_iter()
        .map(|request| probe_one(agent, request))
        .collect();

    let failures = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(
        total = requests.len(),
        failures,
        "Probed diagram URLs"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Dialect;

    #[test]
    fn test_requests_skip_local_blocks() {
        let blocks = vec![
            DiagramBlock::new(Dialect::PlantUml, "A -> B"),
            DiagramBlock::new(Dialect::Mermaid, "graph TD; A-->B"),
            DiagramBlock::new(Dialect::GraphViz, "digraph { a }"),
        ];
        let requests = ProbeRequest::for_blocks(&ServiceUrl::default(), &blocks);

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].dom_id, blocks[0].dom_id());
        assert!(requests[0].url.starts_with("https://kroki.io/plantuml/svg/"));
        assert!(requests[1].url.starts_with("https://kroki.io/graphviz/svg/"));
    }

    #[test]
    fn test_probe_unreachable_host_reports_http_error() {
        let agent = create_agent(Duration::from_millis(500));
        let requests = vec![ProbeRequest {
            dom_id: "kroki-plantuml-deadbeef".to_owned(),
            url: "http://127.0.0.1:1/plantuml/svg/abc".to_owned(),
        }];

        let results = probe_all(&agent, &requests);

        assert_eq!(results.len(), 1);
        let err = results[0].as_ref().unwrap_err();
        assert_eq!(err.dom_id, "kroki-plantuml-deadbeef");
        assert!(matches!(err.kind, ProbeErrorKind::Http(_)));
        assert!(err.to_string().starts_with("diagram kroki-plantuml-deadbeef: HTTP error"));
    }

    #[test]
    fn test_probe_all_empty() {
        let agent = create_agent(Duration::from_secs(1));
        assert!(probe_all(&agent, &[]).is_empty());
    }
}
