#![forbid(unsafe_code)]

use std::sync::mpsc;
use std::thread;

use sentinel_contracts::alert::{AlertId, AlertRequest, SubmitError};
use sentinel_os::transport::AlertTransport;

/// Result of one background submission, handed back to the tick loop
/// so it can resolve the kernel's fire latch.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub request: AlertRequest,
    pub result: Result<AlertId, SubmitError>,
}

/// Runs alert submissions on a worker thread so the tick loop never
/// waits on the network. `enqueue` hands a fired request over and
/// returns immediately; the loop polls `try_outcome` each tick and
/// feeds the result into `resolve_submission`. Dropping the worker
/// closes the job channel and ends the thread after the in-flight
/// request.
pub struct SubmitWorker {
    jobs: mpsc::Sender<AlertRequest>,
    outcomes: mpsc::Receiver<SubmitOutcome>,
}

impl SubmitWorker {
    pub fn spawn(mut transport: impl AlertTransport + Send + 'static) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<AlertRequest>();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        thread::spawn(move || {
            for request in job_rx {
                let result = transport.submit_alert(&request);
                if outcome_tx.send(SubmitOutcome { request, result }).is_err() {
                    return;
                }
            }
        });
        Self {
            jobs: job_tx,
            outcomes: outcome_rx,
        }
    }

    /// Non-blocking hand-off. False only if the worker thread is gone,
    /// in which case the caller must treat the submission as failed so
    /// the fire latch is released.
    pub fn enqueue(&self, request: AlertRequest) -> bool {
        self.jobs.send(request).is_ok()
    }

    /// Non-blocking poll for the next finished submission.
    pub fn try_outcome(&self) -> Option<SubmitOutcome> {
        self.outcomes.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_contracts::alert::{FactorBreakdown, TriggerKind};
    use sentinel_contracts::zone::RiskZone;
    use std::time::{Duration, Instant};

    /// Transport that holds every submission until the test releases
    /// it, then answers from a scripted queue.
    struct GatedTransport {
        gate: mpsc::Receiver<()>,
        replies: Vec<Result<AlertId, SubmitError>>,
    }

    impl AlertTransport for GatedTransport {
        fn submit_alert(&mut self, _request: &AlertRequest) -> Result<AlertId, SubmitError> {
            self.gate
                .recv()
                .map_err(|_| SubmitError::network("gate closed"))?;
            self.replies
                .pop()
                .unwrap_or_else(|| Err(SubmitError::network("no scripted reply")))
        }

        fn fetch_zones(&mut self) -> Result<Vec<RiskZone>, SubmitError> {
            Ok(Vec::new())
        }
    }

    fn request(score: f64) -> AlertRequest {
        AlertRequest::v1(
            score,
            FactorBreakdown {
                audio: 20.0,
                motion: 15.0,
                time: 20.0,
                location: 20.0,
            },
            None,
            TriggerKind::Auto,
        )
        .unwrap()
    }

    fn wait_outcome(worker: &SubmitWorker) -> SubmitOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = worker.try_outcome() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "no outcome within deadline");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn at_submit_01_enqueue_returns_while_submission_is_in_flight() {
        let (release, gate) = mpsc::channel();
        let worker = SubmitWorker::spawn(GatedTransport {
            gate,
            replies: vec![Ok(AlertId::new("sos-1").unwrap())],
        });

        // The transport is still blocked; the caller is not.
        assert!(worker.enqueue(request(75.0)));
        assert!(worker.try_outcome().is_none());

        release.send(()).unwrap();
        let outcome = wait_outcome(&worker);
        assert_eq!(outcome.result.unwrap().as_str(), "sos-1");
        assert!((outcome.request.risk_score - 75.0).abs() < 1e-9);
    }

    #[test]
    fn at_submit_02_failure_outcome_carries_the_error() {
        let (release, gate) = mpsc::channel();
        let worker = SubmitWorker::spawn(GatedTransport {
            gate,
            replies: vec![Err(SubmitError::network("connection refused"))],
        });
        worker.enqueue(request(60.0));
        release.send(()).unwrap();

        let outcome = wait_outcome(&worker);
        let err = outcome.result.unwrap_err();
        assert_eq!(err.detail, "connection refused");
    }

    #[test]
    fn at_submit_03_outcomes_are_delivered_in_order() {
        let (release, gate) = mpsc::channel();
        let worker = SubmitWorker::spawn(GatedTransport {
            gate,
            // Popped back-to-front.
            replies: vec![
                Ok(AlertId::new("second").unwrap()),
                Ok(AlertId::new("first").unwrap()),
            ],
        });
        worker.enqueue(request(55.0));
        worker.enqueue(request(65.0));
        release.send(()).unwrap();
        release.send(()).unwrap();

        assert_eq!(wait_outcome(&worker).result.unwrap().as_str(), "first");
        assert_eq!(wait_outcome(&worker).result.unwrap().as_str(), "second");
    }
}
