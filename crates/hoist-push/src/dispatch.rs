//! Pushing one plan to every endpoint of a remote.

use serde::Serialize;

use hoist_transport::{Connection, PushFlags, PushOutcome, RejectReasons, Transport, TransportError};

use crate::advice::select_advice;
use crate::command::PushPlan;
use crate::error::DispatchError;
use crate::report::Reporter;

/// What happened at one endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct EndpointReport {
    pub url: String,
    /// Per-ref outcome, when the push itself went through.
    pub outcome: Option<PushOutcome>,
    /// Connect, push or close error.
    pub error: Option<String>,
    pub failed: bool,
}

/// The aggregate result of a dispatch.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DispatchReport {
    pub remote: String,
    pub endpoints: Vec<EndpointReport>,
    /// Number of endpoints that failed.
    pub failures: usize,
    /// Union of the reject reasons of every endpoint.
    pub reasons: RejectReasons,
    pub advice: Option<String>,
}

impl DispatchReport {
    pub fn is_success(&self) -> bool {
        self.failures == 0
    }
}

enum Endpoint {
    Ready(Box<dyn Connection>),
    Unreachable(TransportError),
}

/// Push `plan` to each push endpoint of its remote, one after another.
///
/// Every connection is set up before anything is pushed. When a lease was
/// requested and any endpoint cannot honour it, nothing is pushed at all.
/// Failing endpoints are counted, never retried, and do not stop the rest.
pub async fn dispatch(
    transport: &dyn Transport,
    plan: &PushPlan,
    reporter: &mut dyn Reporter,
) -> Result<DispatchReport, DispatchError> {
    let urls = plan.remote.push_endpoints();
    let mut endpoints = Vec::with_capacity(urls.len());
    for url in urls {
        let endpoint = match transport.connect(&plan.remote, &url, &plan.connect) {
            Ok(conn) => Endpoint::Ready(conn),
            Err(err) => {
                tracing::debug!(url = %url, error = %err, "connection setup failed");
                Endpoint::Unreachable(err)
            }
        };
        endpoints.push((url, endpoint));
    }

    if !plan.connect.lease.is_empty() {
        for (url, endpoint) in &endpoints {
            if let Endpoint::Ready(conn) = endpoint {
                if !conn.supports_conditional_update() {
                    return Err(DispatchError::ConditionalUpdateUnsupported { url: url.clone() });
                }
            }
        }
    }

    let porcelain = plan.flags.contains(PushFlags::PORCELAIN);
    let mut report = DispatchReport {
        remote: plan.remote.name.clone(),
        ..Default::default()
    };

    for (url, endpoint) in endpoints {
        let mut conn = match endpoint {
            Endpoint::Ready(conn) => conn,
            Endpoint::Unreachable(err) => {
                reporter.transport_error(&url, &err);
                reporter.push_failed(&url);
                report.failures += 1;
                report.endpoints.push(EndpointReport {
                    url,
                    outcome: None,
                    error: Some(err.to_string()),
                    failed: true,
                });
                continue;
            }
        };

        if plan.connect.verbosity > 0 {
            reporter.pushing_to(&url);
        }
        tracing::debug!(url = %conn.url(), refspecs = plan.refspecs.len(), flags = %plan.flags, "pushing");

        let mut error = None;
        let outcome = match conn.push_refs(&plan.refspecs, plan.flags).await {
            Ok(outcome) => {
                reporter.ref_outcomes(&url, &outcome, porcelain);
                report.reasons |= outcome.reasons;
                Some(outcome)
            }
            Err(err) => {
                reporter.transport_error(&url, &err);
                error = Some(err.to_string());
                None
            }
        };
        let mut failed = error.is_some() || outcome.as_ref().is_some_and(PushOutcome::has_rejections);

        if let Err(err) = conn.close().await {
            reporter.transport_error(&url, &err);
            error.get_or_insert_with(|| err.to_string());
            failed = true;
        }

        if failed {
            tracing::debug!(url = %conn.url(), "endpoint failed");
            reporter.push_failed(&url);
            report.failures += 1;
        }
        report.endpoints.push(EndpointReport {
            url,
            outcome,
            error,
            failed,
        });
    }

    if report.failures > 0 {
        if let Some(message) = select_advice(report.reasons, &plan.advice) {
            reporter.advice(message);
            report.advice = Some(message.to_string());
        }
    }
    Ok(report)
}
