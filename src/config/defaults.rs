use std::time::Duration;

pub(super) fn default_base_url() -> String {
    "https://api.opsgenie.com".to_string()
}

pub(super) const fn default_page_size() -> usize {
    crate::paging::DEFAULT_PAGE_SIZE
}

pub(super) const fn default_concurrency() -> usize {
    8
}

pub(super) fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

pub(super) const fn default_http_timeout() -> Duration {
    Duration::from_secs(10)
}

pub(super) const fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}
