//! Mean time to acknowledge.
//!
//! Incidents are listed, each incident's associated alert ids are looked up,
//! and every referenced alert is then fetched in one OR-filtered listing. An
//! incident starts at its earliest-created associated alert. The provider
//! exposes no first-notification time yet, so every sample carries
//! [`TimeToAck::Unavailable`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::Result;
use crate::genie_client::{Alert, GenieClient, Incident};
use crate::paging::Pager;
use crate::types::{ListQuery, SortOrder};

use super::{Datapoint, Series};

const INCIDENT_SORT: &str = "insertedAt";
const ALERT_SORT: &str = "createdAt";

/// An incident paired with the alert ids the provider links to it.
#[derive(Debug, Clone)]
pub struct CorrelatedIncident {
    pub incident: Incident,
    pub alert_ids: Vec<String>,
}

/// Alerts keyed by id.
#[derive(Debug, Default)]
pub struct AlertIndex {
    by_id: HashMap<String, Alert>,
}

impl AlertIndex {
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.by_id.get(id)
    }

    /// Earliest-created alert among `ids`. Ids missing from the index are ignored.
    pub fn earliest<'a>(&'a self, ids: &[String]) -> Option<&'a Alert> {
        let mut matched: Vec<&Alert> = ids.iter().filter_map(|id| self.get(id)).collect();
        matched.sort_by_key(|alert| alert.created_at);
        matched.first().copied()
    }

    /// Ids referenced by `incidents` that have no alert in the index.
    pub fn missing<'a>(&self, incidents: &'a [CorrelatedIncident]) -> Vec<&'a str> {
        incidents
            .iter()
            .flat_map(|c| c.alert_ids.iter())
            .filter(|id| !self.by_id.contains_key(id.as_str()))
            .map(String::as_str)
            .collect()
    }
}

impl FromIterator<Alert> for AlertIndex {
    fn from_iter<I: IntoIterator<Item = Alert>>(iter: I) -> Self {
        Self {
            by_id: iter
                .into_iter()
                .map(|alert| (alert.id.clone(), alert))
                .collect(),
        }
    }
}

/// Time from an incident's first alert to its first client notification.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimeToAck {
    /// No notification timestamp is available from the provider.
    Unavailable,
}

impl TimeToAck {
    pub const fn as_millis(self) -> Option<f64> {
        match self {
            Self::Unavailable => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MttaSample {
    pub incident_id: String,
    pub started_at: Option<DateTime<Utc>>,
    pub time_to_ack: TimeToAck,
}

#[derive(Clone, Debug, Default)]
pub struct MttaReport {
    pub samples: Vec<MttaSample>,
    /// Remote calls that failed; their data is missing from `samples`.
    pub failures: usize,
}

impl MttaReport {
    pub const fn is_complete(&self) -> bool {
        self.failures == 0
    }

    /// One datapoint per incident with a known start, ordered by start time.
    pub fn into_series(self, target: &str) -> Series {
        let mut datapoints: Vec<Datapoint> = self
            .samples
            .into_iter()
            .filter_map(|sample| {
                sample
                    .started_at
                    .map(|start| {
                        Datapoint(sample.time_to_ack.as_millis(), start.timestamp_millis())
                    })
            })
            .collect();
        datapoints.sort_by_key(|point| point.1);
        Series {
            target: target.to_string(),
            datapoints,
        }
    }
}

/// `id:<a> OR id:<b> ...` over the distinct ids, in first-seen order.
pub fn alert_id_filter(incidents: &[CorrelatedIncident]) -> Option<String> {
    let mut seen = HashSet::new();
    let terms: Vec<String> = incidents
        .iter()
        .flat_map(|c| c.alert_ids.iter())
        .filter(|id| seen.insert(id.as_str()))
        .map(|id| format!("id:{id}"))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

pub fn samples(incidents: &[CorrelatedIncident], index: &AlertIndex) -> Vec<MttaSample> {
    incidents
        .iter()
        .map(|correlated| {
            let first = index.earliest(&correlated.alert_ids);
            debug!(
                incident_id = %correlated.incident.id,
                alerts = correlated.alert_ids.len(),
                first_alert = first.map_or("-", |a| a.id.as_str()),
                "incident start resolved"
            );
            MttaSample {
                incident_id: correlated.incident.id.clone(),
                started_at: first.map(|alert| alert.created_at),
                time_to_ack: TimeToAck::Unavailable,
            }
        })
        .collect()
}

pub struct Correlator {
    client: GenieClient,
    pager: Pager,
    concurrency: usize,
}

impl Correlator {
    pub fn new(client: GenieClient, pager: Pager, concurrency: usize) -> Self {
        Self {
            client,
            pager,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run(&self) -> MttaReport {
        let mut failures = 0;

        let incidents = self
            .client
            .all_incidents(
                self.pager,
                &ListQuery::sorted(INCIDENT_SORT, SortOrder::Desc),
            )
            .await;
        if !incidents.is_complete() {
            failures += 1;
        }

        let (correlated, lookup_failures) = self.attach_alert_ids(incidents.items).await;
        failures += lookup_failures;

        let index = match alert_id_filter(&correlated) {
            Some(filter) => {
                let alerts = self
                    .client
                    .all_alerts(
                        self.pager,
                        &ListQuery::sorted(ALERT_SORT, SortOrder::Desc).with_query(filter),
                    )
                    .await;
                if !alerts.is_complete() {
                    failures += 1;
                }
                alerts.items.into_iter().collect::<AlertIndex>()
            }
            None => AlertIndex::default(),
        };

        let missing = index.missing(&correlated);
        if !missing.is_empty() {
            warn!(count = missing.len(), "associated alerts absent from alert listing");
        }

        let report = MttaReport {
            samples: samples(&correlated, &index),
            failures,
        };
        info!(
            incidents = correlated.len(),
            alerts = index.len(),
            failures = report.failures,
            "mtta correlation finished"
        );
        report
    }

    /// Look up every incident's alert ids concurrently and wait for all of them.
    async fn attach_alert_ids(
        &self,
        incidents: Vec<Incident>,
    ) -> (Vec<CorrelatedIncident>, usize) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<(usize, Result<Vec<String>>)> = JoinSet::new();

        for (idx, incident) in incidents.iter().enumerate() {
            let client = self.client.clone();
            let semaphore = Arc::clone(&semaphore);
            let incident_id = incident.id.clone();
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (idx, Ok(Vec::new()));
                };
                (idx, client.associated_alert_ids(&incident_id).await)
            });
        }

        let mut alert_ids: Vec<Vec<String>> = vec![Vec::new(); incidents.len()];
        let mut failures = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, Ok(ids))) => alert_ids[idx] = ids,
                Ok((idx, Err(err))) => {
                    failures += 1;
                    warn!(
                        incident_id = %incidents[idx].id,
                        error = %err,
                        "associated alert lookup failed"
                    );
                }
                Err(join_err) => {
                    failures += 1;
                    warn!(error = %join_err, "associated alert lookup task failed");
                }
            }
        }

        let correlated = incidents
            .into_iter()
            .zip(alert_ids)
            .map(|(incident, alert_ids)| CorrelatedIncident {
                incident,
                alert_ids,
            })
            .collect();
        (correlated, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AlertIndex, CorrelatedIncident, MttaReport, MttaSample, TimeToAck, alert_id_filter, samples,
    };
    use crate::genie_client::{Alert, Incident};
    use chrono::{TimeZone, Utc};

    fn alert(id: &str, secs: i64) -> Alert {
        let created_at = match Utc.timestamp_opt(secs, 0).single() {
            Some(ts) => ts,
            None => panic!("bad timestamp {secs}"),
        };
        Alert {
            id: id.to_string(),
            tiny_id: None,
            message: None,
            status: None,
            acknowledged: false,
            created_at,
            fields: serde_json::Map::new(),
        }
    }

    fn correlated(id: &str, alert_ids: &[&str]) -> CorrelatedIncident {
        CorrelatedIncident {
            incident: Incident {
                id: id.to_string(),
                tiny_id: None,
                message: None,
                status: None,
                inserted_at: None,
                fields: serde_json::Map::new(),
            },
            alert_ids: alert_ids.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn earliest_associated_alert_starts_the_incident() {
        let index: AlertIndex = vec![alert("a1", 200), alert("a2", 100), alert("a3", 300)]
            .into_iter()
            .collect();
        let ids = vec!["a1".to_string(), "a2".to_string(), "a3".to_string()];
        assert_eq!(index.earliest(&ids).map(|a| a.id.as_str()), Some("a2"));
    }

    #[test]
    fn index_has_one_entry_per_alert_id() {
        let index: AlertIndex = vec![alert("a1", 1), alert("a2", 2), alert("a1", 1)]
            .into_iter()
            .collect();
        assert_eq!(index.len(), 2);
        assert!(index.get("a1").is_some());
        assert!(index.get("a3").is_none());
    }

    #[test]
    fn filter_joins_distinct_ids_with_or() {
        let incidents = vec![correlated("i1", &["a1", "a2"]), correlated("i2", &["a2", "a3"])];
        assert_eq!(
            alert_id_filter(&incidents).as_deref(),
            Some("id:a1 OR id:a2 OR id:a3")
        );
        assert!(alert_id_filter(&[correlated("i3", &[])]).is_none());
    }

    #[test]
    fn samples_report_unavailable_acknowledgement() {
        let index: AlertIndex = vec![alert("a1", 50)].into_iter().collect();
        let incidents = vec![correlated("i1", &["a1"]), correlated("i2", &["gone"])];
        let computed = samples(&incidents, &index);
        assert_eq!(computed.len(), 2);
        assert_eq!(computed[0].started_at.map(|t| t.timestamp()), Some(50));
        assert!(computed[1].started_at.is_none());
        assert!(computed.iter().all(|s| s.time_to_ack == TimeToAck::Unavailable));
        assert_eq!(index.missing(&incidents), vec!["gone"]);
    }

    #[test]
    fn series_has_null_values_ordered_by_start() {
        let at = |secs| Utc.timestamp_opt(secs, 0).single();
        let report = MttaReport {
            samples: vec![
                MttaSample {
                    incident_id: "late".into(),
                    started_at: at(20),
                    time_to_ack: TimeToAck::Unavailable,
                },
                MttaSample {
                    incident_id: "unknown".into(),
                    started_at: None,
                    time_to_ack: TimeToAck::Unavailable,
                },
                MttaSample {
                    incident_id: "early".into(),
                    started_at: at(10),
                    time_to_ack: TimeToAck::Unavailable,
                },
            ],
            failures: 0,
        };
        let series = report.into_series("MTTA");
        let body = match serde_json::to_value(&series) {
            Ok(body) => body,
            Err(err) => panic!("serialize: {err}"),
        };
        assert_eq!(
            body,
            serde_json::json!({"target": "MTTA", "datapoints": [[null, 10_000], [null, 20_000]]})
        );
    }
}
