use super::{cases, Case, Endpoint, Fixture};
use crate::client::AdsClient;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: &'static str,
    pub title: &'static str,
    pub endpoint: Endpoint,
    #[serde(flatten)]
    pub status: CaseStatus,
    pub elapsed_ms: u64,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    pub base_url: String,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| !c.passed())
    }
}

/// Runs the registered cases against one service.
pub struct SuiteRunner {
    client: AdsClient,
    filter: Option<String>,
    jobs: usize,
}

impl SuiteRunner {
    pub fn new(client: AdsClient) -> Self {
        Self {
            client,
            filter: None,
            jobs: 1,
        }
    }

    /// Only run cases whose id or title contains `filter`.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Number of cases allowed in flight at once (at least 1).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn selected(&self) -> Vec<Case> {
        cases()
            .into_iter()
            .filter(|c| self.filter.as_deref().map_or(true, |f| c.matches(f)))
            .collect()
    }

    pub async fn run(&self) -> SuiteReport {
        let selected = self.selected();
        tracing::info!(
            "running {} cases against {} ({} at a time)",
            selected.len(),
            self.client.config().base_url,
            self.jobs
        );

        let cases = if self.jobs == 1 {
            let mut reports = Vec::with_capacity(selected.len());
            for case in selected {
                reports.push(run_case(case, Fixture::new(self.client.clone())).await);
            }
            reports
        } else {
            self.run_concurrent(selected).await
        };

        SuiteReport {
            base_url: self.client.config().base_url.clone(),
            cases,
        }
    }

    async fn run_concurrent(&self, selected: Vec<Case>) -> Vec<CaseReport> {
        let permits = Arc::new(Semaphore::new(self.jobs));
        let mut set = JoinSet::new();

        for (index, case) in selected.iter().copied().enumerate() {
            let permits = Arc::clone(&permits);
            let fixture = Fixture::new(self.client.clone());
            set.spawn(async move {
                let _permit = permits.acquire_owned().await;
                (index, run_case(case, fixture).await)
            });
        }

        let mut slots: Vec<Option<CaseReport>> = vec![None; selected.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, report)) => slots[index] = Some(report),
                Err(e) => tracing::error!("case task failed to complete: {}", e),
            }
        }

        // A panicked task leaves its slot empty; report it rather than drop it.
        slots
            .into_iter()
            .zip(selected)
            .map(|(slot, case)| {
                slot.unwrap_or_else(|| CaseReport {
                    id: case.id,
                    title: case.title,
                    endpoint: case.endpoint,
                    status: CaseStatus::Failed {
                        reason: "case task panicked".to_string(),
                    },
                    elapsed_ms: 0,
                })
            })
            .collect()
    }
}

async fn run_case(case: Case, fixture: Fixture) -> CaseReport {
    let start = Instant::now();
    let status = match case.run(fixture).await {
        Ok(()) => {
            tracing::info!("[{}] passed: {}", case.id, case.title);
            CaseStatus::Passed
        }
        Err(e) => {
            tracing::warn!("[{}] failed: {}: {}", case.id, case.title, e);
            CaseStatus::Failed {
                reason: e.to_string(),
            }
        }
    };

    CaseReport {
        id: case.id,
        title: case.title,
        endpoint: case.endpoint,
        status,
        elapsed_ms: start.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeConfig;

    fn report(id: &'static str, status: CaseStatus) -> CaseReport {
        CaseReport {
            id,
            title: "t",
            endpoint: Endpoint::Transport,
            status,
            elapsed_ms: 1,
        }
    }

    #[test]
    fn test_summary_counts() {
        let report = SuiteReport {
            base_url: "http://localhost".to_string(),
            cases: vec![
                report("TC-001", CaseStatus::Passed),
                report(
                    "TC-002",
                    CaseStatus::Failed {
                        reason: "expected status 400, got 200".to_string(),
                    },
                ),
            ],
        };

        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert_eq!(report.failures().next().unwrap().id, "TC-002");
    }

    #[test]
    fn test_report_json_shape() {
        let value = serde_json::to_value(report(
            "TC-028",
            CaseStatus::Failed {
                reason: "boom".to_string(),
            },
        ))
        .unwrap();

        assert_eq!(value["id"], "TC-028");
        assert_eq!(value["endpoint"], "transport");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["reason"], "boom");
    }

    #[test]
    fn test_filter_and_jobs() {
        let client = AdsClient::new(ProbeConfig::default()).unwrap();
        let runner = SuiteRunner::new(client).with_filter("TC-02").with_jobs(0);

        assert_eq!(runner.jobs, 1);
        let ids: Vec<_> = runner.selected().iter().map(|c| c.id).collect();
        assert_eq!(ids.first(), Some(&"TC-020"));
        assert_eq!(ids.len(), 9);
    }
}
