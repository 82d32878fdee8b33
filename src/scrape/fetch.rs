// src/scrape/fetch.rs
use std::{
    sync::{atomic::{AtomicUsize, Ordering}, mpsc},
    thread,
};

use indexmap::IndexMap;

use super::extract::{rule_for, PriceRule, SpanClassRule};
use crate::{
    config::{consts::{MAX_WORKERS, USER_AGENT}, options::FetchOptions},
    core::net::{HttpSource, PageSource},
    error::{ConfigError, FetchError},
    progress::Progress,
};

/// Why a URL has no price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Absence {
    /// Transport failure, unreadable body, or (by default) a non-2xx status.
    Fetch(FetchError),
    /// Page fetched but no price marker element in it.
    NoMarker,
}

/// Outcome for one URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PriceLookup {
    /// Trimmed marker text; may legitimately be empty.
    Found(String),
    Absent(Absence),
}

impl PriceLookup {
    pub fn price(&self) -> Option<&str> {
        match self {
            PriceLookup::Found(p) => Some(p),
            PriceLookup::Absent(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PriceLookup::Found(_))
    }

    /// Short machine-readable status: ok | fetch_failed | http_<code> | no_marker
    pub fn status_label(&self) -> String {
        match self {
            PriceLookup::Found(_) => s!("ok"),
            PriceLookup::Absent(Absence::Fetch(FetchError::Status(code))) => format!("http_{code}"),
            PriceLookup::Absent(Absence::Fetch(_)) => s!("fetch_failed"),
            PriceLookup::Absent(Absence::NoMarker) => s!("no_marker"),
        }
    }
}

/// URL -> lookup, in input order. A repeated URL keeps its first position
/// and the outcome of its last fetch.
pub type PriceMap = IndexMap<String, PriceLookup>;

pub struct Fetcher {
    source: Box<dyn PageSource>,
    rule: Box<dyn PriceRule>,
    workers: usize,
    parse_error_pages: bool,
}

impl Fetcher {
    /// Sequential fetcher; non-2xx responses count as failures.
    pub fn new(source: Box<dyn PageSource>, rule: Box<dyn PriceRule>) -> Self {
        Self { source, rule, workers: 1, parse_error_pages: false }
    }

    /// HTTP fetcher configured from options. Fails only on bad configuration.
    pub fn from_options(opts: &FetchOptions) -> Result<Self, ConfigError> {
        opts.validate()?;
        let rule = rule_for(&opts.selector)?;
        let source = HttpSource::new(&opts.user_agent)?;
        Ok(Self::new(Box::new(source), rule)
            .workers(opts.workers)
            .parse_error_pages(opts.parse_error_pages))
    }

    /// Pool size, clamped to `1..=MAX_WORKERS`.
    pub fn workers(mut self, n: usize) -> Self {
        if n > MAX_WORKERS {
            logw!("{n} workers requested, capping at {MAX_WORKERS}");
        }
        self.workers = n.clamp(1, MAX_WORKERS);
        self
    }

    pub fn parse_error_pages(mut self, yes: bool) -> Self {
        self.parse_error_pages = yes;
        self
    }

    pub fn rule(&self) -> &dyn PriceRule {
        self.rule.as_ref()
    }

    /// One GET + one extraction. Never fails; failures become `Absent`.
    pub fn lookup(&self, url: &str) -> PriceLookup {
        let page = match self.source.get(url) {
            Ok(p) => p,
            Err(e) => {
                logw!("{url}: {e}");
                return PriceLookup::Absent(Absence::Fetch(e));
            }
        };
        if !self.parse_error_pages && !page.is_success() {
            logw!("{url}: HTTP status {}", page.status);
            return PriceLookup::Absent(Absence::Fetch(FetchError::Status(page.status)));
        }
        match self.rule.extract(&page.body) {
            Some(price) => PriceLookup::Found(price),
            None => {
                logf!("{url}: no `{}` element", self.rule.describe());
                PriceLookup::Absent(Absence::NoMarker)
            }
        }
    }

    /// Look up every URL. Each occurrence is fetched, duplicates included.
    pub fn fetch_prices(&self, urls: &[String], mut progress: Option<&mut dyn Progress>) -> PriceMap {
        if let Some(p) = progress.as_deref_mut() {
            p.begin(urls.len());
        }

        let workers = self.workers.min(urls.len()).max(1);
        let results = if workers == 1 {
            self.run_sequential(urls, &mut progress)
        } else {
            self.run_pool(urls, workers, &mut progress)
        };

        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }

        let mut map = PriceMap::with_capacity(urls.len());
        for (url, res) in urls.iter().zip(results) {
            map.insert(url.clone(), res);
        }
        map
    }

    fn run_sequential(&self, urls: &[String], progress: &mut Option<&mut dyn Progress>) -> Vec<PriceLookup> {
        urls.iter()
            .enumerate()
            .map(|(i, url)| {
                let res = self.lookup(url);
                report(progress, i, url, &res);
                res
            })
            .collect()
    }

    /// Fixed pool pulling indices off a shared counter. Results travel back
    /// tagged with their index so input order is restored regardless of
    /// completion order.
    fn run_pool(
        &self,
        urls: &[String],
        workers: usize,
        progress: &mut Option<&mut dyn Progress>,
    ) -> Vec<PriceLookup> {
        let counter = AtomicUsize::new(0);
        let (res_tx, res_rx) = mpsc::channel::<(usize, PriceLookup)>();
        let mut slots: Vec<Option<PriceLookup>> = vec![None; urls.len()];

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = res_tx.clone();
                let counter = &counter;
                scope.spawn(move || loop {
                    let i = counter.fetch_add(1, Ordering::Relaxed);
                    if i >= urls.len() {
                        break;
                    }
                    if tx.send((i, self.lookup(&urls[i]))).is_err() {
                        break;
                    }
                });
            }
            drop(res_tx); // main thread is sole receiver now

            for (i, res) in res_rx.iter() {
                report(progress, i, &urls[i], &res);
                slots[i] = Some(res);
            }
        });

        slots
            .into_iter()
            .map(|s| {
                // every index is sent exactly once
                s.unwrap_or_else(|| {
                    PriceLookup::Absent(Absence::Fetch(FetchError::Request(s!("worker exited early"))))
                })
            })
            .collect()
    }
}

fn report(progress: &mut Option<&mut dyn Progress>, i: usize, url: &str, res: &PriceLookup) {
    if let Some(p) = progress.as_deref_mut() {
        match res {
            PriceLookup::Found(_) => p.item_done(i, url),
            PriceLookup::Absent(_) => p.item_failed(i, url, &res.status_label()),
        }
    }
}

/// Fetch each URL sequentially over HTTP and read the first `span.price`.
pub fn fetch_prices(urls: &[String]) -> PriceMap {
    match HttpSource::new(USER_AGENT) {
        Ok(source) => Fetcher::new(Box::new(source), Box::new(SpanClassRule::default())).fetch_prices(urls, None),
        Err(e) => {
            loge!("cannot build HTTP client: {e}");
            urls.iter()
                .map(|u| (u.clone(), PriceLookup::Absent(Absence::Fetch(FetchError::Request(e.to_string())))))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::core::net::Page;

    /// Canned pages; unknown URLs fail like a DNS error.
    struct FakeSource {
        pages: HashMap<String, Page>,
        hits: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(pages: &[(&str, u16, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(u, st, b)| (s!(*u), Page { status: *st, body: s!(*b) }))
                    .collect(),
                hits: Mutex::new(Vec::new()),
            }
        }
    }

    impl PageSource for FakeSource {
        fn get(&self, url: &str) -> Result<Page, FetchError> {
            self.hits.lock().unwrap().push(s!(url));
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Request(format!("dns error: {url}")))
        }
    }

    impl PageSource for std::sync::Arc<FakeSource> {
        fn get(&self, url: &str) -> Result<Page, FetchError> {
            self.as_ref().get(url)
        }
    }

    fn fetcher(pages: &[(&str, u16, &str)]) -> Fetcher {
        Fetcher::new(Box::new(FakeSource::new(pages)), Box::new(SpanClassRule::default()))
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| s!(*u)).collect()
    }

    #[derive(Default)]
    struct Recorder {
        total: usize,
        done: Vec<usize>,
        failed: Vec<(usize, String)>,
        finished: bool,
    }

    impl Progress for Recorder {
        fn begin(&mut self, total: usize) { self.total = total; }
        fn item_done(&mut self, i: usize, _url: &str) { self.done.push(i); }
        fn item_failed(&mut self, i: usize, _url: &str, reason: &str) { self.failed.push((i, s!(reason))); }
        fn finish(&mut self) { self.finished = true; }
    }

    #[test]
    fn every_url_covered_in_order() {
        let f = fetcher(&[("B", 200, r#"<span class="price">$3</span>"#)]);
        let map = f.fetch_prices(&urls(&["A", "B", "C"]), None);
        let keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["A", "B", "C"]);
        assert_eq!(map["B"], PriceLookup::Found(s!("$3")));
        assert!(!map["A"].is_found());
        assert!(!map["C"].is_found());
    }

    #[test]
    fn failure_does_not_touch_neighbours() {
        let f = fetcher(&[("B", 200, r#"<span class="price">4.50</span>"#)]);
        let map = f.fetch_prices(&urls(&["A", "B"]), None);
        assert!(matches!(map["A"], PriceLookup::Absent(Absence::Fetch(FetchError::Request(_)))));
        assert_eq!(map["B"].price(), Some("4.50"));
    }

    #[test]
    fn missing_marker_is_absent_not_empty() {
        let f = fetcher(&[
            ("none", 200, "<p>sold out</p>"),
            ("empty", 200, r#"<span class="price"></span>"#),
        ]);
        let map = f.fetch_prices(&urls(&["none", "empty"]), None);
        assert_eq!(map["none"], PriceLookup::Absent(Absence::NoMarker));
        assert_eq!(map["empty"], PriceLookup::Found(s!()));
    }

    #[test]
    fn error_status_is_failure_by_default() {
        let body = r#"<span class="price">0.00</span>"#;
        let f = fetcher(&[("gone", 404, body)]);
        let map = f.fetch_prices(&urls(&["gone"]), None);
        assert_eq!(map["gone"], PriceLookup::Absent(Absence::Fetch(FetchError::Status(404))));
        assert_eq!(map["gone"].status_label(), "http_404");

        let lax = fetcher(&[("gone", 404, body)]).parse_error_pages(true);
        assert_eq!(lax.lookup("gone").price(), Some("0.00"));
    }

    #[test]
    fn duplicates_fetched_each_time_but_keyed_once() {
        let src = std::sync::Arc::new(FakeSource::new(&[("A", 200, r#"<span class="price">1</span>"#)]));
        let f = Fetcher::new(Box::new(src.clone()), Box::new(SpanClassRule::default()));
        let map = f.fetch_prices(&urls(&["A", "B", "A"]), None);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_index(0).map(|(k, _)| k.as_str()), Some("A"));
        assert_eq!(src.hits.lock().unwrap().len(), 3);
    }

    #[test]
    fn pool_matches_sequential() {
        let pages: Vec<(String, u16, String)> = (0..20)
            .map(|i| (format!("u{i}"), if i % 5 == 0 { 500 } else { 200 }, format!(r#"<span class="price">{i}</span>"#)))
            .collect();
        let pages: Vec<(&str, u16, &str)> = pages.iter().map(|(u, s, b)| (u.as_str(), *s, b.as_str())).collect();
        let mut list: Vec<String> = (0..25).map(|i| format!("u{i}")).collect();
        list.push(s!("u3"));

        let seq = fetcher(&pages).fetch_prices(&list, None);
        let par = fetcher(&pages).workers(4).fetch_prices(&list, None);
        assert_eq!(seq, par);
        assert!(seq.keys().eq(par.keys()));
        assert_eq!(par["u7"].price(), Some("7"));
        assert_eq!(par["u22"].status_label(), "fetch_failed");
    }

    #[test]
    fn progress_sees_every_item() {
        let f = fetcher(&[("ok", 200, r#"<span class="price">1</span>"#)]).workers(3);
        let mut rec = Recorder::default();
        f.fetch_prices(&urls(&["ok", "bad", "ok2"]), Some(&mut rec));
        assert_eq!(rec.total, 3);
        assert!(rec.finished);
        assert_eq!(rec.done, vec![0]);
        let mut failed = rec.failed.clone();
        failed.sort();
        assert_eq!(failed, vec![(1, s!("fetch_failed")), (2, s!("fetch_failed"))]);
    }

    /// Tracks how many `get` calls overlap.
    #[derive(Default)]
    struct SlowSource {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl PageSource for std::sync::Arc<SlowSource> {
        fn get(&self, _url: &str) -> Result<Page, FetchError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(5));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(Page { status: 200, body: s!(r#"<span class="price">1</span>"#) })
        }
    }

    #[test]
    fn worker_count_is_capped() {
        let src = std::sync::Arc::new(SlowSource::default());
        let f = Fetcher::new(Box::new(src.clone()), Box::new(SpanClassRule::default())).workers(200);
        let list: Vec<String> = (0..200).map(|i| format!("u{i}")).collect();

        let map = f.fetch_prices(&list, None);
        assert_eq!(map.len(), 200);
        assert!(map.values().all(PriceLookup::is_found));
        let peak = src.peak.load(Ordering::SeqCst);
        assert!(peak <= MAX_WORKERS, "peak concurrency {peak}");
        assert!(peak >= 1);
    }

    #[test]
    fn zero_workers_means_sequential() {
        let src = std::sync::Arc::new(SlowSource::default());
        let f = Fetcher::new(Box::new(src.clone()), Box::new(SpanClassRule::default())).workers(0);
        f.fetch_prices(&urls(&["a", "b", "c"]), None);
        assert_eq!(src.peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_batch_is_empty_map() {
        let f = fetcher(&[]).workers(8);
        assert!(f.fetch_prices(&[], None).is_empty());
    }

    #[test]
    fn options_validated_before_any_fetch() {
        let mut opts = FetchOptions::default();
        opts.selector = s!("span[");
        assert!(matches!(Fetcher::from_options(&opts), Err(ConfigError::Selector { .. })));

        let mut opts = FetchOptions::default();
        opts.workers = 0;
        assert!(matches!(Fetcher::from_options(&opts), Err(ConfigError::Workers)));
    }
}
