use crate::Result;
use crate::paging::{PageRequest, Paged, Pager};
use crate::types::ListQuery;

use super::GenieClient;
use super::models::{Alert, AlertRef, Incident};

impl GenieClient {
    /// One page of `GET /v1/incidents`.
    pub async fn list_incidents(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Vec<Incident>> {
        let mut params = query.pairs();
        params.extend(page.pairs());
        self.get(&["v1", "incidents"], &params).await
    }

    /// One page of `GET /v2/alerts`.
    pub async fn list_alerts(&self, query: &ListQuery, page: PageRequest) -> Result<Vec<Alert>> {
        let mut params = query.pairs();
        params.extend(page.pairs());
        self.get(&["v2", "alerts"], &params).await
    }

    /// Ids of the alerts the provider has linked to `incident_id`.
    pub async fn associated_alert_ids(&self, incident_id: &str) -> Result<Vec<String>> {
        let refs: Vec<AlertRef> = self
            .get(
                &["v1", "incidents", incident_id, "associated-alert-ids"],
                &[("identifierType", "id".to_string())],
            )
            .await?;
        Ok(refs.into_iter().map(String::from).collect())
    }

    pub async fn all_incidents(&self, pager: Pager, query: &ListQuery) -> Paged<Incident> {
        pager
            .fetch_all("incidents", |page| self.list_incidents(query, page))
            .await
    }

    pub async fn all_alerts(&self, pager: Pager, query: &ListQuery) -> Paged<Alert> {
        pager
            .fetch_all("alerts", |page| self.list_alerts(query, page))
            .await
    }
}
