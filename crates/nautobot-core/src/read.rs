// ── Read pipeline ──
//
// One read walks `Idle → Fetching → Decoding → Lifting → Published | Failed`.
// Paginated lists loop back from Lifting to Fetching while upstream hands
// out `next` links. Failure at any step ends the read with diagnostics and
// no state; nothing partial is ever published.

use std::collections::HashSet;
use std::future::Future;
use std::num::NonZeroU32;

use indexmap::IndexMap;
use nautobot_api::{HttpResponse, NautobotClient};
use serde::de::DeserializeOwned;
use strum::Display;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::attr::AttributeValue;
use crate::client::ApiClient;
use crate::diag::{Diagnostic, Diagnostics};
use crate::error::CoreError;
use crate::lift::Lift;
use crate::path::AttributePath;
use crate::schema::{Attribute, Schema};

// ── Phases ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReadPhase {
    Idle,
    Fetching,
    Decoding,
    Lifting,
    Published,
    Failed,
}

impl ReadPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Published | Self::Failed)
    }

    /// Whether the machine may move from `self` to `next`.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Fetching)
                | (Self::Fetching, Self::Decoding)
                | (Self::Decoding, Self::Lifting)
                | (Self::Lifting, Self::Fetching | Self::Published)
                | (
                    Self::Idle | Self::Fetching | Self::Decoding | Self::Lifting,
                    Self::Failed
                )
        )
    }
}

// ── Request / response ───────────────────────────────────────────────

/// Per-read context handed in by the host.
#[derive(Debug, Clone, Default)]
pub struct ReadRequest {
    /// Cancelled by the host to abort the read.
    pub cancel: CancellationToken,
}

impl ReadRequest {
    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

#[derive(Debug, Clone)]
pub struct ReadResponse {
    /// Published state; `None` whenever the read failed.
    pub state: Option<AttributeValue>,
    pub diagnostics: Diagnostics,
    /// Terminal phase the read ended in.
    pub phase: ReadPhase,
}

impl ReadResponse {
    /// A read that failed before it started (e.g. unconfigured source).
    pub fn failed(diagnostics: impl Into<Diagnostics>) -> Self {
        Self {
            state: None,
            diagnostics: diagnostics.into(),
            phase: ReadPhase::Failed,
        }
    }

    pub fn is_published(&self) -> bool {
        self.phase == ReadPhase::Published
    }
}

// ── Listing ──────────────────────────────────────────────────────────

/// A paginated upstream collection that reads into one list attribute.
pub trait Listing {
    type Record: DeserializeOwned + Lift + Send;

    /// Top-level list attribute the lifted records are bound to.
    const ATTRIBUTE: &'static str;
    /// Plural noun used in diagnostics.
    const NOUN: &'static str;

    /// Request the first page, leaving the body undecoded.
    fn first_page(
        client: &NautobotClient,
        limit: Option<u32>,
    ) -> impl Future<Output = Result<HttpResponse, nautobot_api::Error>> + Send;
}

// ── Machine ──────────────────────────────────────────────────────────

struct ReadMachine {
    source: &'static str,
    phase: ReadPhase,
    diagnostics: Diagnostics,
}

impl ReadMachine {
    fn new(source: &'static str) -> Self {
        Self {
            source,
            phase: ReadPhase::Idle,
            diagnostics: Diagnostics::new(),
        }
    }

    fn advance(&mut self, next: ReadPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal read transition {} -> {next}",
            self.phase
        );
        debug!(source = self.source, from = %self.phase, to = %next, "read transition");
        self.phase = next;
    }

    fn fail(mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) -> ReadResponse {
        self.advance(ReadPhase::Failed);
        self.diagnostics.extend(diagnostics);
        ReadResponse {
            state: None,
            diagnostics: self.diagnostics,
            phase: self.phase,
        }
    }

    fn publish(mut self, state: AttributeValue) -> ReadResponse {
        self.advance(ReadPhase::Published);
        ReadResponse {
            state: Some(state),
            diagnostics: self.diagnostics,
            phase: self.phase,
        }
    }
}

/// Read every page of `L` and publish it under `L::ATTRIBUTE`.
///
/// Records keep upstream order. The page cap from the client's
/// [`PagingConfig`](crate::PagingConfig) truncates with a warning, never
/// silently.
pub async fn read_list<L: Listing>(
    api: &ApiClient,
    schema: &Schema,
    request: &ReadRequest,
) -> ReadResponse {
    let mut machine = ReadMachine::new(L::NOUN);

    let Some(element) = schema.attribute(L::ATTRIBUTE).and_then(Attribute::nested_object) else {
        return machine.fail([Diagnostic::error(
            "Invalid data source schema",
            format!("{:?} is not declared as a list of objects", L::ATTRIBUTE),
        )]);
    };

    let paging = api.paging();
    let limit = paging.page_size.map(NonZeroU32::get);
    let list_path = AttributePath::root(L::ATTRIBUTE);

    let mut items: Vec<AttributeValue> = Vec::new();
    let mut next: Option<Url> = None;
    let mut visited: HashSet<Url> = HashSet::new();
    let mut pages = 0usize;
    let mut total = 0u64;

    loop {
        // ── Fetch ──
        machine.advance(ReadPhase::Fetching);
        let fetch = async {
            match &next {
                None => L::first_page(api.nautobot(), limit).await,
                Some(link) => api.nautobot().follow_raw(link).await,
            }
        };
        let fetched = tokio::select! {
            biased;
            () = request.cancel.cancelled() => {
                debug!(source = L::NOUN, pages, "read cancelled by host");
                return machine.fail([Diagnostic::error(
                    CoreError::Cancelled.to_string(),
                    format!("the host cancelled the read after {pages} page(s); nothing was published"),
                )]);
            }
            result = fetch => result,
        };
        let response = match fetched {
            Ok(response) => response,
            Err(e) => {
                return machine.fail([Diagnostic::error(
                    format!("failed to get {} list", L::NOUN),
                    CoreError::from(e).to_string(),
                )]);
            }
        };

        // ── Decode ──
        machine.advance(ReadPhase::Decoding);
        let page = match response.decode_page::<L::Record>() {
            Ok(page) => page,
            Err(e) => {
                return machine.fail([Diagnostic::error(
                    "Failed to serialize",
                    CoreError::from(e).to_string(),
                )]);
            }
        };
        pages += 1;
        if pages == 1 {
            total = page.count;
        }

        // ── Lift ──
        machine.advance(ReadPhase::Lifting);
        let mut lift_errors = Diagnostics::new();
        for record in &page.results {
            let path = list_path.index(items.len() + lift_errors.len());
            match record.lift(element, &path) {
                Ok(value) => items.push(value),
                Err(e) => lift_errors.push(e.into()),
            }
        }
        if !lift_errors.is_empty() {
            return machine.fail(lift_errors);
        }

        match page.next {
            None => break,
            Some(_) if paging.max_pages.is_some_and(|max| pages >= max.get()) => {
                warn!(
                    source = L::NOUN,
                    pages,
                    retrieved = items.len(),
                    total,
                    "page cap reached, list truncated"
                );
                machine.diagnostics.push(Diagnostic::warning(
                    format!("{} list truncated", L::NOUN),
                    format!(
                        "stopped after {pages} page(s) with {} of {total} {}; \
                         raise or unset NAUTOBOT_MAX_PAGES to read the full list",
                        items.len(),
                        L::NOUN,
                    ),
                ));
                break;
            }
            Some(link) => {
                // A repeated link or more records than announced means upstream
                // will never run out of pages.
                let looped = !visited.insert(link.clone());
                let overrun = u64::try_from(items.len()).is_ok_and(|n| n > total);
                if looped || overrun {
                    let message = if looped {
                        format!("next link {link} was already followed")
                    } else {
                        format!("retrieved {} records but upstream announced {total}", items.len())
                    };
                    warn!(source = L::NOUN, pages, %link, "pagination does not terminate");
                    return machine.fail([Diagnostic::error(
                        format!("failed to get {} list", L::NOUN),
                        CoreError::Pagination { message }.to_string(),
                    )]);
                }
                next = Some(link);
            }
        }
    }

    let mut root = IndexMap::with_capacity(1);
    root.insert(L::ATTRIBUTE.to_owned(), AttributeValue::list(items));
    let state = AttributeValue::object(root);

    let violations = schema.validate(&state);
    if violations.has_error() {
        return machine.fail(violations);
    }
    machine.publish(state)
}
