use std::fmt::{self, Display};

use serde::Serialize;
use tracing::{debug, info};

use crate::genie_client::GenieClient;
use crate::paging::Pager;
use crate::request::Window;

pub mod mtta;

use mtta::Correlator;

/// `[value, epoch_millis]`; a `null` value means the metric is unavailable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Datapoint(pub Option<f64>, pub i64);

/// One time series in a `/query` response.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub target: String,
    pub datapoints: Vec<Datapoint>,
}

/// What a metric computation needs from the outside world.
#[derive(Clone)]
pub struct MetricContext {
    pub client: GenieClient,
    pub pager: Pager,
    pub concurrency: usize,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Metric {
    Mtta,
}

impl Metric {
    pub const ALL: [Self; 1] = [Self::Mtta];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mtta => "MTTA",
        }
    }

    /// Exact, case-sensitive lookup of a target name.
    pub fn resolve(name: &str) -> Option<Self> {
        let metric = Self::ALL.into_iter().find(|m| m.as_str() == name);
        if metric.is_none() {
            debug!(target_name = name, "unsupported metric skipped");
        }
        metric
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.into_iter().map(Self::as_str).collect()
    }

    pub async fn compute(self, ctx: &MetricContext, window: &Window) -> Series {
        info!(
            metric = %self,
            from = %window.from,
            to = %window.to,
            "computing metric"
        );
        match self {
            Self::Mtta => {
                let correlator = Correlator::new(ctx.client.clone(), ctx.pager, ctx.concurrency);
                correlator.run().await.into_series(self.as_str())
            }
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
